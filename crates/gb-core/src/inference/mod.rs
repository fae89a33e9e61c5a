//! Exact inference: pruning, enumeration, and chain-rule joints.

mod distribution;
mod enumeration;
mod joint;
mod prune;

pub use distribution::Distribution;
pub use enumeration::{InferenceEngine, InferenceError};
pub use prune::prune_barren;
