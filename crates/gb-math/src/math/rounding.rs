//! Fixed decimal precision for reported probabilities.

use serde::{Deserialize, Serialize};

/// Default number of decimal digits kept in reported probabilities.
pub const DEFAULT_DIGITS: u32 = 5;

/// Largest digit count that still rounds meaningfully in an `f64`.
pub const MAX_DIGITS: u32 = 15;

/// Decimal rounding precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Precision {
    digits: u32,
}

impl Precision {
    /// Digit counts above [`MAX_DIGITS`] are clamped.
    pub const fn new(digits: u32) -> Self {
        let digits = if digits > MAX_DIGITS { MAX_DIGITS } else { digits };
        Precision { digits }
    }

    pub fn digits(self) -> u32 {
        self.digits
    }

    pub fn round(self, x: f64) -> f64 {
        round_to(x, self.digits)
    }

    /// Smallest difference this precision can represent.
    pub fn tolerance(self) -> f64 {
        10f64.powi(-(self.digits as i32))
    }
}

impl Default for Precision {
    fn default() -> Self {
        Precision::new(DEFAULT_DIGITS)
    }
}

/// Round `x` to `digits` decimal places (half away from zero).
pub fn round_to(x: f64, digits: u32) -> f64 {
    if !x.is_finite() {
        return x;
    }
    let factor = 10f64.powi(digits.min(MAX_DIGITS) as i32);
    (x * factor).round() / factor
}
