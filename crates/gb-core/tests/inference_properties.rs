//! Property-based tests for inference invariants.

use gb_common::{Coord, Evidence, SeasonLevel, Value, Variable};
use gb_config::SeasonPrior;
use gb_core::{BayesNetwork, InferenceEngine};
use gb_math::{normalize_rounded, Precision};
use proptest::prelude::*;

const SQUARE: [(Coord, Coord); 4] = [
    (Coord::new(0, 0), Coord::new(0, 1)),
    (Coord::new(0, 0), Coord::new(1, 0)),
    (Coord::new(0, 1), Coord::new(1, 1)),
    (Coord::new(1, 0), Coord::new(1, 1)),
];

fn network_strategy() -> impl Strategy<Value = BayesNetwork> {
    (
        (0.05f64..1.0, 0.05f64..1.0, 0.05f64..1.0),
        0.0f64..0.2,
        prop::array::uniform4(0.0f64..0.5),
        prop::array::uniform4(0.0f64..=1.0),
    )
        .prop_map(|((low, medium, high), leakage, risks, blocks)| {
            let sum = low + medium + high;
            let prior = SeasonPrior {
                low: low / sum,
                medium: medium / sum,
                high: high / sum,
            };
            let mut builder = BayesNetwork::builder(prior, leakage);
            let coords = [
                Coord::new(0, 0),
                Coord::new(0, 1),
                Coord::new(1, 0),
                Coord::new(1, 1),
            ];
            for (c, p) in coords.iter().zip(risks) {
                builder = builder.vertex(*c, p);
            }
            for ((u, v), b) in SQUARE.iter().zip(blocks) {
                builder = builder.edge(*u, *v, b);
            }
            builder.build().expect("generated parameters are valid")
        })
}

/// 3x3 vertices joined by every horizontal side plus the two vertical sides
/// of the first column. Later vertices read season long after it was
/// assigned, so the memo key carries several values.
fn lattice_strategy() -> impl Strategy<Value = BayesNetwork> {
    (
        0.0f64..0.2,
        prop::collection::vec(0.0f64..0.5, 9),
        prop::collection::vec(0.0f64..=1.0, 8),
    )
        .prop_map(|(leakage, risks, blocks)| {
            let prior = SeasonPrior {
                low: 0.5,
                medium: 0.3,
                high: 0.2,
            };
            let mut builder = BayesNetwork::builder(prior, leakage);
            for (i, p) in risks.iter().enumerate() {
                builder = builder.vertex(Coord::new(i as u32 / 3, i as u32 % 3), *p);
            }
            let mut sides = Vec::new();
            for y in 0..3u32 {
                sides.push((Coord::new(0, y), Coord::new(1, y)));
                sides.push((Coord::new(1, y), Coord::new(2, y)));
            }
            sides.push((Coord::new(0, 0), Coord::new(0, 1)));
            sides.push((Coord::new(0, 1), Coord::new(0, 2)));
            for ((u, v), b) in sides.into_iter().zip(blocks) {
                builder = builder.edge(u, v, b);
            }
            builder.build().expect("generated parameters are valid")
        })
}

/// Direct transcription of the recursive sum-product, without memoization.
fn recursive_all(net: &BayesNetwork, order: &[Variable], e: &Evidence) -> f64 {
    let Some((head, tail)) = order.split_first() else {
        return 1.0;
    };
    let cpt = net.cpt();
    match e.get(head) {
        Some(v) => cpt.probability(head, e, v).unwrap() * recursive_all(net, tail, e),
        None => head
            .domain()
            .iter()
            .map(|&v| cpt.probability(head, e, v).unwrap() * recursive_all(net, tail, &e.with(*head, v).unwrap()))
            .sum(),
    }
}

/// Up to three observations drawn from the network's variables.
fn evidence_strategy() -> impl Strategy<Value = Vec<(usize, usize)>> {
    prop::collection::vec((0usize..9, 0usize..3), 0..=3)
}

fn evidence_from(net: &BayesNetwork, picks: &[(usize, usize)]) -> Evidence {
    let order = net.topological_order();
    let mut e = Evidence::new();
    for &(var, val) in picks {
        let v = order[var % order.len()];
        let domain = v.domain();
        e.set(v, domain[val % domain.len()]).unwrap();
    }
    e
}

/// Posterior computed on the full, unpruned network.
fn unpruned_posterior(net: &BayesNetwork, query: &Variable, e: &Evidence) -> Vec<f64> {
    let engine = InferenceEngine::new(net);
    let order = net.topological_order();
    let weights: Vec<f64> = query
        .domain()
        .iter()
        .map(|&v| engine.enumeration_all(&order, &e.with(*query, v).unwrap()).unwrap())
        .collect();
    normalize_rounded(&weights, Precision::default())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn posteriors_are_normalized_or_impossible(
        net in network_strategy(),
        picks in evidence_strategy(),
        q in 0usize..9,
    ) {
        let e = evidence_from(&net, &picks);
        let query = net.topological_order()[q];
        let d = InferenceEngine::new(&net).ask(&query, &e).unwrap();
        prop_assert_eq!(d.entries().len(), query.domain().len());
        for (_, p) in d.entries() {
            prop_assert!((0.0..=1.0).contains(p));
        }
        prop_assert!(d.is_impossible() || (d.total() - 1.0).abs() < 1e-4, "total {}", d.total());
    }

    #[test]
    fn pruning_does_not_change_answers(
        net in network_strategy(),
        picks in evidence_strategy(),
        q in 0usize..9,
    ) {
        let e = evidence_from(&net, &picks);
        let query = net.topological_order()[q];
        prop_assume!(!e.contains(&query));
        // pruned observed roots must carry nonzero probability
        let order = net.topological_order();
        prop_assume!(InferenceEngine::new(&net).enumeration_all(&order, &e).unwrap() > 0.0);
        let pruned = InferenceEngine::new(&net).ask(&query, &e).unwrap();
        let full = unpruned_posterior(&net, &query, &e);
        for ((_, a), b) in pruned.entries().iter().zip(&full) {
            prop_assert!((a - b).abs() < 2e-5, "pruned {} vs full {}", a, b);
        }
    }

    #[test]
    fn observed_variables_are_point_masses(
        net in network_strategy(),
        picks in evidence_strategy(),
    ) {
        let e = evidence_from(&net, &picks);
        let engine = InferenceEngine::new(&net);
        for (var, value) in e.iter() {
            let d = engine.ask(var, &e).unwrap();
            prop_assert_eq!(d.get(*value), 1.0);
            prop_assert_eq!(d.total(), 1.0);
        }
    }

    #[test]
    fn chain_rule_matches_joint_enumeration(
        net in network_strategy(),
        picks in evidence_strategy(),
        a in 1usize..9,
        b in 1usize..9,
    ) {
        let e = evidence_from(&net, &picks);
        let order = net.topological_order();
        let (va, vb) = (order[a], order[b]);
        prop_assume!(va != vb && !e.contains(&va) && !e.contains(&vb));

        let engine = InferenceEngine::new(&net);
        let evidence_weight = engine.enumeration_all(&order, &e).unwrap();
        prop_assume!(evidence_weight > 1e-6);

        let both_false = e.with(va, Value::FALSE).unwrap().with(vb, Value::FALSE).unwrap();
        let exact = engine.enumeration_all(&order, &both_false).unwrap() / evidence_weight;
        let chained = engine.enumeration_ask_set(&[va, vb], &e).unwrap();
        prop_assert!((exact - chained).abs() < 1e-4, "exact {} vs chained {}", exact, chained);
    }

    #[test]
    fn worklist_matches_recursion_on_square(
        net in network_strategy(),
        picks in evidence_strategy(),
    ) {
        let e = evidence_from(&net, &picks);
        let order = net.topological_order();
        let memoized = InferenceEngine::new(&net).enumeration_all(&order, &e).unwrap();
        let plain = recursive_all(&net, &order, &e);
        prop_assert!((memoized - plain).abs() < 1e-12, "worklist {} vs recursion {}", memoized, plain);
    }

    #[test]
    fn parallel_ask_all_matches_sequential(
        net in network_strategy(),
        picks in evidence_strategy(),
    ) {
        let e = evidence_from(&net, &picks);
        let seq = InferenceEngine::new(&net).ask_all(&e).unwrap();
        let par = InferenceEngine::new(&net).with_parallel(true).ask_all(&e).unwrap();
        prop_assert_eq!(seq, par);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn worklist_matches_recursion_on_lattice(
        net in lattice_strategy(),
        picks in prop::collection::vec((0usize..18, 0usize..3), 0..=4),
    ) {
        let e = evidence_from(&net, &picks);
        let order = net.topological_order();
        let memoized = InferenceEngine::new(&net).enumeration_all(&order, &e).unwrap();
        let plain = recursive_all(&net, &order, &e);
        prop_assert!(
            (memoized - plain).abs() <= 1e-12 * plain.abs().max(1.0),
            "worklist {} vs recursion {}",
            memoized,
            plain
        );
    }
}

#[test]
fn season_level_conditioning_example() {
    let net = single_vertex_network();
    let mut e = Evidence::new();
    e.set(Variable::Season, SeasonLevel::Low).unwrap();
    let d = InferenceEngine::new(&net).ask(&Variable::node(0, 0), &e).unwrap();
    assert_eq!(d.probability_true(), 0.1);
    assert_eq!(d.probability_false(), 0.9);
}

fn single_vertex_network() -> BayesNetwork {
    BayesNetwork::builder(
        SeasonPrior {
            low: 0.5,
            medium: 0.3,
            high: 0.2,
        },
        0.05,
    )
    .vertex(Coord::new(0, 0), 0.1)
    .build()
    .unwrap()
}
