//! Network model: CPT tables, the DAG, and grid topology.

pub mod cpt;
pub mod grid;
pub mod network;

pub use cpt::{CptError, CptModel, CptRow, EdgeCpt, NodeCpt, SeasonCpt};
pub use grid::GridTopology;
pub use network::{BayesNetwork, BuildError, NetworkBuilder};
