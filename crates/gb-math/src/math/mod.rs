//! Core math modules.

pub mod posterior;
pub mod rounding;
