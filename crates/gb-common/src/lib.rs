//! Grid Bayes common types, evidence, and errors.
//!
//! This crate provides foundational types shared across gb-core modules:
//! - Variable identity (season, grid vertices, fragmentation edges)
//! - The evidence register
//! - Common error types
//! - Schema versioning for configuration files

pub mod error;
pub mod evidence;
pub mod id;
pub mod schema;

pub use error::{Error, Result};
pub use evidence::Evidence;
pub use id::{Coord, EdgeKey, SeasonLevel, Value, Variable};
pub use schema::SCHEMA_VERSION;
