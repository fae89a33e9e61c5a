//! Posterior normalization at fixed precision.
//!
//! Inference produces one unnormalized weight per domain value. These helpers
//! turn the weights into a rounded probability vector and leave an all-zero
//! vector (contradictory evidence) untouched instead of dividing by zero.

use super::rounding::Precision;

/// Normalize `weights` to sum to 1 and round each entry.
///
/// If the weights sum to exactly zero the input is returned unchanged.
/// Any NaN input yields an all-NaN output.
pub fn normalize_rounded(weights: &[f64], precision: Precision) -> Vec<f64> {
    if weights.is_empty() {
        return Vec::new();
    }
    if weights.iter().any(|w| w.is_nan()) {
        return vec![f64::NAN; weights.len()];
    }
    let total: f64 = weights.iter().sum();
    if total == 0.0 {
        return weights.to_vec();
    }
    weights.iter().map(|w| precision.round(w / total)).collect()
}

/// Check that `probs` sums to 1 within `tolerance`.
pub fn sums_to_one(probs: &[f64], tolerance: f64) -> bool {
    let total: f64 = probs.iter().sum();
    (total - 1.0).abs() <= tolerance
}
