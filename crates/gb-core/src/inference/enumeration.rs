//! Exact inference by enumeration.
//!
//! `ask` computes a posterior by summing the full joint over every hidden
//! variable of a pruned network. The sum-product is evaluated with an
//! explicit worklist instead of call-stack recursion, and each call memoizes
//! partial sums keyed by depth plus the values of the already-assigned
//! variables that remaining CPTs still read. Results are identical to the
//! plain recursive definition:
//!
//! ```text
//! all([])       = 1
//! all(y :: ys)  = P(y = e[y] | e) * all(ys)                 if y observed
//!               = Σ_v P(y = v | e) * all(ys, e ∪ {y: v})    otherwise
//! ```

use std::collections::{BTreeMap, HashMap};

use gb_common::{Evidence, Value, Variable};
use gb_math::{normalize_rounded, Precision};
use rayon::prelude::*;
use tracing::{debug, trace};

use super::distribution::Distribution;
use super::prune::prune_barren;
use crate::model::{BayesNetwork, CptError};

/// Errors raised during inference.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InferenceError {
    /// A CPT lookup failed; with a topological order this never happens.
    #[error(transparent)]
    Cpt(#[from] CptError),

    #[error("{0} is not a boolean variable")]
    NotBoolean(Variable),
}

/// Exact inference over one network.
#[derive(Debug, Clone, Copy)]
pub struct InferenceEngine<'n> {
    network: &'n BayesNetwork,
    precision: Precision,
    parallel: bool,
}

impl<'n> InferenceEngine<'n> {
    pub fn new(network: &'n BayesNetwork) -> Self {
        InferenceEngine {
            network,
            precision: Precision::default(),
            parallel: false,
        }
    }

    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    /// Evaluate independent queries of [`ask_all`](Self::ask_all) on the rayon pool.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn network(&self) -> &'n BayesNetwork {
        self.network
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Posterior of `query` given `evidence`.
    ///
    /// - not a network variable: `{true: 0, false: 1}`
    /// - observed: point mass on the observed value
    /// - contradictory evidence: all-zero distribution
    pub fn ask(&self, query: &Variable, evidence: &Evidence) -> Result<Distribution, InferenceError> {
        if !self.network.contains(query) {
            trace!(target: "inference.ask", %query, "not a network variable");
            return Ok(Distribution::absent());
        }
        if let Some(observed) = evidence.get(query) {
            return Ok(Distribution::point_mass(query, observed));
        }

        let domain = query.domain();
        let mut weights = Vec::with_capacity(domain.len());
        for &value in domain {
            let extended = extend(evidence, *query, value)?;
            let pruned = prune_barren(self.network, std::slice::from_ref(query), &extended);
            let order = pruned.topological_order();
            weights.push(self.enumeration_all(&order, &extended)?);
        }

        let distribution = Distribution::from_parts(domain, normalize_rounded(&weights, self.precision));
        if distribution.is_impossible() {
            debug!(target: "inference.ask", %query, "evidence has zero probability");
        }
        trace!(target: "inference.ask", %query, ?weights, %distribution, "posterior");
        Ok(distribution)
    }

    /// Unnormalized probability of `evidence`, summing out every unobserved
    /// variable of `order`.
    ///
    /// `order` must list every variable after its parents unless the parent
    /// is observed.
    pub fn enumeration_all(&self, order: &[Variable], evidence: &Evidence) -> Result<f64, InferenceError> {
        let frontier = Frontier::new(order);
        let mut memo: HashMap<MemoKey, f64> = HashMap::new();
        let mut stack: Vec<Frame> = Vec::with_capacity(order.len());

        match self.expand(order, &frontier, 0, evidence.clone(), &memo)? {
            Step::Done(value) => return Ok(value),
            Step::Expand(frame) => stack.push(frame),
        }

        let mut returned: Option<f64> = None;
        while let Some(frame) = stack.last_mut() {
            if let Some(value) = returned.take() {
                frame.acc += frame.branches[frame.next].1 * value;
                frame.next += 1;
            }

            if frame.next < frame.branches.len() {
                let head = order[frame.depth];
                let (value, _) = frame.branches[frame.next];
                let child = if frame.evidence.contains(&head) {
                    frame.evidence.clone()
                } else {
                    extend(&frame.evidence, head, value)?
                };
                let depth = frame.depth + 1;
                match self.expand(order, &frontier, depth, child, &memo)? {
                    Step::Done(value) => returned = Some(value),
                    Step::Expand(next) => stack.push(next),
                }
            } else {
                let key = std::mem::take(&mut frame.key);
                let acc = frame.acc;
                stack.pop();
                memo.insert(key, acc);
                returned = Some(acc);
            }
        }

        trace!(target: "inference.enumerate", variables = order.len(), memo = memo.len(), "enumerated");
        Ok(returned.unwrap_or(1.0))
    }

    /// Posterior of every network variable, in topological order.
    pub fn ask_all(&self, evidence: &Evidence) -> Result<BTreeMap<Variable, Distribution>, InferenceError> {
        let order = self.network.topological_order();
        if self.parallel {
            order
                .par_iter()
                .map(|v| self.ask(v, evidence).map(|d| (*v, d)))
                .collect()
        } else {
            order
                .iter()
                .map(|v| self.ask(v, evidence).map(|d| (*v, d)))
                .collect()
        }
    }

    fn expand(
        &self,
        order: &[Variable],
        frontier: &Frontier,
        depth: usize,
        evidence: Evidence,
        memo: &HashMap<MemoKey, f64>,
    ) -> Result<Step, InferenceError> {
        if depth == order.len() {
            return Ok(Step::Done(1.0));
        }
        let key = (depth, frontier.snapshot(depth, &evidence));
        if let Some(&cached) = memo.get(&key) {
            return Ok(Step::Done(cached));
        }

        let head = &order[depth];
        let cpt = self.network.cpt();
        let mut branches = Vec::with_capacity(head.domain().len());
        match evidence.get(head) {
            Some(observed) => branches.push((observed, cpt.probability(head, &evidence, observed)?)),
            None => {
                for &v in head.domain() {
                    branches.push((v, cpt.probability(head, &evidence, v)?));
                }
            }
        }
        // zero-weight branches contribute nothing
        branches.retain(|(_, p)| *p != 0.0);
        if branches.is_empty() {
            return Ok(Step::Done(0.0));
        }

        Ok(Step::Expand(Frame {
            depth,
            key,
            evidence,
            branches,
            next: 0,
            acc: 0.0,
        }))
    }
}

/// `evidence` plus `variable := value`, with domain errors as CPT errors.
pub(crate) fn extend(evidence: &Evidence, variable: Variable, value: Value) -> Result<Evidence, InferenceError> {
    evidence
        .with(variable, value)
        .map_err(|_| InferenceError::Cpt(CptError::DomainMismatch { variable, value }))
}

type MemoKey = (usize, Vec<Option<Value>>);

/// One pending sum over the head variable at `depth`.
struct Frame {
    depth: usize,
    key: MemoKey,
    evidence: Evidence,
    branches: Vec<(Value, f64)>,
    next: usize,
    acc: f64,
}

enum Step {
    Done(f64),
    Expand(Frame),
}

/// For each depth, the earlier variables whose values later CPTs still read.
struct Frontier {
    members: Vec<Vec<Variable>>,
}

impl Frontier {
    fn new(order: &[Variable]) -> Self {
        let position: HashMap<Variable, usize> =
            order.iter().enumerate().map(|(i, v)| (*v, i)).collect();

        let mut last_use: Vec<Option<usize>> = vec![None; order.len()];
        for (child, v) in order.iter().enumerate() {
            for parent in v.parents() {
                if let Some(&p) = position.get(&parent) {
                    if p < child {
                        last_use[p] = Some(last_use[p].map_or(child, |l| l.max(child)));
                    }
                }
            }
        }

        let mut members = vec![Vec::new(); order.len() + 1];
        for (p, last) in last_use.iter().enumerate() {
            if let Some(last) = *last {
                for slot in &mut members[p + 1..=last] {
                    slot.push(order[p]);
                }
            }
        }
        Frontier { members }
    }

    fn snapshot(&self, depth: usize, evidence: &Evidence) -> Vec<Option<Value>> {
        self.members[depth].iter().map(|v| evidence.get(v)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gb_common::{Coord, SeasonLevel};
    use gb_config::{NetworkParams, SeasonPrior};

    fn network() -> BayesNetwork {
        BayesNetwork::from_params(&NetworkParams::default()).unwrap()
    }

    fn single_edge(block: f64, leakage: f64) -> BayesNetwork {
        BayesNetwork::builder(
            SeasonPrior {
                low: 0.5,
                medium: 0.3,
                high: 0.2,
            },
            leakage,
        )
        .vertex(Coord::new(0, 0), 0.1)
        .vertex(Coord::new(0, 1), 0.2)
        .edge(Coord::new(0, 0), Coord::new(0, 1), block)
        .build()
        .unwrap()
    }

    /// Straight transcription of the recursive definition.
    fn naive_all(net: &BayesNetwork, order: &[Variable], e: &Evidence) -> f64 {
        let Some((head, tail)) = order.split_first() else {
            return 1.0;
        };
        if let Some(v) = e.get(head) {
            return net.cpt().probability(head, e, v).unwrap() * naive_all(net, tail, e);
        }
        head.domain()
            .iter()
            .map(|&v| net.cpt().probability(head, e, v).unwrap() * naive_all(net, tail, &e.with(*head, v).unwrap()))
            .sum()
    }

    #[test]
    fn vertex_given_low_season() {
        let net = network();
        let engine = InferenceEngine::new(&net);
        let mut e = Evidence::new();
        e.set(Variable::Season, SeasonLevel::Low).unwrap();
        let d = engine.ask(&Variable::node(0, 0), &e).unwrap();
        assert_eq!(d.probability_true(), 0.1);
        assert_eq!(d.probability_false(), 0.9);
    }

    #[test]
    fn leakage_when_both_endpoints_clear() {
        let net = single_edge(0.8, 0.05);
        let engine = InferenceEngine::new(&net);
        let mut e = Evidence::new();
        e.set(Variable::node(0, 0), false).unwrap();
        e.set(Variable::node(0, 1), false).unwrap();
        let d = engine
            .ask(&Variable::edge(Coord::new(0, 1), Coord::new(0, 0)), &e)
            .unwrap();
        assert_eq!(d.probability_true(), 0.05);
        assert_eq!(d.probability_false(), 0.95);
    }

    #[test]
    fn unknown_variable_falls_back() {
        let net = network();
        let engine = InferenceEngine::new(&net);
        let d = engine.ask(&Variable::node(7, 7), &Evidence::new()).unwrap();
        assert_eq!(d, Distribution::absent());
    }

    #[test]
    fn observed_query_is_point_mass() {
        let net = network();
        let engine = InferenceEngine::new(&net);
        let mut e = Evidence::new();
        e.set(Variable::Season, SeasonLevel::High).unwrap();
        let d = engine.ask(&Variable::Season, &e).unwrap();
        assert_eq!(d.get(Value::Season(SeasonLevel::High)), 1.0);
        assert_eq!(d.total(), 1.0);
    }

    #[test]
    fn season_prior_without_evidence() {
        let net = network();
        let d = InferenceEngine::new(&net)
            .ask(&Variable::Season, &Evidence::new())
            .unwrap();
        assert_eq!(d.get(Value::Season(SeasonLevel::Low)), 0.5);
        assert_eq!(d.get(Value::Season(SeasonLevel::Medium)), 0.3);
        assert_eq!(d.get(Value::Season(SeasonLevel::High)), 0.2);
    }

    #[test]
    fn marginal_vertex_risk() {
        // 0.5*0.1 + 0.3*0.2 + 0.2*0.3 = 0.17
        let net = network();
        let d = InferenceEngine::new(&net)
            .ask(&Variable::node(0, 0), &Evidence::new())
            .unwrap();
        assert!((d.probability_true() - 0.17).abs() < 1e-9);
    }

    #[test]
    fn contradictory_evidence_is_all_zero() {
        // base risk 0 -> vertex can never be at risk
        let net = network();
        let mut e = Evidence::new();
        e.set(Variable::node(1, 1), true).unwrap();
        let d = InferenceEngine::new(&net).ask(&Variable::Season, &e).unwrap();
        assert!(d.is_impossible());
    }

    #[test]
    fn worklist_matches_recursive_definition() {
        let net = network();
        let engine = InferenceEngine::new(&net);
        let order = net.topological_order();
        let mut e = Evidence::new();
        e.set(Variable::edge(Coord::new(0, 0), Coord::new(0, 1)), true).unwrap();
        e.set(Variable::node(1, 0), false).unwrap();
        let fast = engine.enumeration_all(&order, &e).unwrap();
        let slow = naive_all(&net, &order, &e);
        assert!((fast - slow).abs() < 1e-12, "{} vs {}", fast, slow);

        let empty = Evidence::new();
        let total = engine.enumeration_all(&order, &empty).unwrap();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn empty_order_is_one() {
        let net = network();
        let engine = InferenceEngine::new(&net);
        assert_eq!(engine.enumeration_all(&[], &Evidence::new()).unwrap(), 1.0);
    }

    #[test]
    fn out_of_order_is_conditioning_error() {
        let net = network();
        let engine = InferenceEngine::new(&net);
        let order = [Variable::node(0, 0), Variable::Season];
        let err = engine.enumeration_all(&order, &Evidence::new()).unwrap_err();
        assert!(matches!(
            err,
            InferenceError::Cpt(CptError::MissingParent { .. })
        ));
    }

    #[test]
    fn ask_all_parallel_matches_sequential() {
        let net = network();
        let mut e = Evidence::new();
        e.set(Variable::node(0, 1), true).unwrap();
        let seq = InferenceEngine::new(&net).ask_all(&e).unwrap();
        let par = InferenceEngine::new(&net).with_parallel(true).ask_all(&e).unwrap();
        assert_eq!(seq, par);
        assert_eq!(seq.len(), net.len());
        assert_eq!(seq[&Variable::node(0, 1)].probability_true(), 1.0);
    }
}
