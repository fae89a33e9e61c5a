//! Grid Bayes inference core.
//!
//! This crate provides:
//! - The season → vertex → fragmentation-edge network and its CPTs
//! - Barren-node pruning and exact inference by enumeration
//! - Chain-rule joint queries over sets of boolean variables
//! - Most-reliable simple path search over the grid
//! - A stateful session facade and logging bootstrap

pub mod inference;
pub mod logging;
pub mod model;
pub mod path;
pub mod session;

pub use inference::{prune_barren, Distribution, InferenceEngine, InferenceError};
pub use model::{BayesNetwork, BuildError, CptError, CptModel, GridTopology, NetworkBuilder};
pub use path::{GridPath, PathError, PathSearch, ScoredPath, Step};
pub use session::InferenceSession;
