//! Grid Bayes configuration loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for network parameters and engine settings
//! - JSON loading with embedded defaults
//! - Schema and semantic validation
//! - JSON schema export for the network parameter format

pub mod params;
pub mod settings;
pub mod validate;

pub use params::{
    network_params_schema, EdgeParams, GridDims, NetworkParams, SeasonPrior, VertexParams,
};
pub use settings::{EngineSettings, InferenceSettings, LoggingSettings, PathSettings};
pub use validate::{ValidationError, ValidationResult};
