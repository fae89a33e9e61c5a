//! Grid Bayes math utilities.

pub mod math;

pub use math::posterior::*;
pub use math::rounding::*;
