//! Barren-node elimination.
//!
//! Produces a reduced copy of a network that answers one query exactly as the
//! full network would. Two passes over the canonical topological order:
//!
//! 1. Roots to leaves: drop observed, unqueried variables that have no
//!    remaining parents. Their factor is a constant that cancels in
//!    normalization, and children still read their value from evidence.
//! 2. Leaves to roots: drop unobserved, unqueried variables that have no
//!    remaining children. Such a variable marginalizes to 1.

use gb_common::{Evidence, Variable};
use tracing::trace;

use crate::model::BayesNetwork;

/// Copy of `network` with barren variables removed for `query` under `evidence`.
///
/// The source network is not modified.
pub fn prune_barren(network: &BayesNetwork, query: &[Variable], evidence: &Evidence) -> BayesNetwork {
    let mut pruned = network.clone();
    let order = network.topological_order();
    let keep = |v: &Variable| query.contains(v);

    let mut observed_roots = 0usize;
    for v in &order {
        if pruned.contains(v) && pruned.in_degree(v) == 0 && evidence.contains(v) && !keep(v) {
            pruned.remove(v);
            observed_roots += 1;
        }
    }

    let mut barren_leaves = 0usize;
    for v in order.iter().rev() {
        if !pruned.contains(v) {
            continue;
        }
        if pruned.out_degree(v) == 0 && !evidence.contains(v) && !keep(v) {
            pruned.remove(v);
            barren_leaves += 1;
        }
    }

    trace!(
        target: "inference.prune",
        before = order.len(),
        after = pruned.len(),
        observed_roots,
        barren_leaves,
        "pruned network"
    );
    pruned
}
