//! Posterior distribution over a variable's domain.

use std::fmt;

use gb_common::{Value, Variable};
use serde::Serialize;

/// Probabilities in domain order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
    entries: Vec<(Value, f64)>,
}

impl Distribution {
    /// Answer for a variable that is not part of the network: never true.
    pub fn absent() -> Self {
        Distribution {
            entries: vec![(Value::TRUE, 0.0), (Value::FALSE, 1.0)],
        }
    }

    /// All mass on the observed value.
    pub fn point_mass(variable: &Variable, observed: Value) -> Self {
        Distribution {
            entries: variable
                .domain()
                .iter()
                .map(|&v| (v, if v == observed { 1.0 } else { 0.0 }))
                .collect(),
        }
    }

    pub(crate) fn from_parts(domain: &[Value], probs: Vec<f64>) -> Self {
        Distribution {
            entries: domain.iter().copied().zip(probs).collect(),
        }
    }

    /// Probability of `value`; 0 for values outside the domain.
    pub fn get(&self, value: Value) -> f64 {
        self.entries
            .iter()
            .find(|(v, _)| *v == value)
            .map(|(_, p)| *p)
            .unwrap_or(0.0)
    }

    pub fn probability_true(&self) -> f64 {
        self.get(Value::TRUE)
    }

    pub fn probability_false(&self) -> f64 {
        self.get(Value::FALSE)
    }

    pub fn entries(&self) -> &[(Value, f64)] {
        &self.entries
    }

    pub fn total(&self) -> f64 {
        self.entries.iter().map(|(_, p)| p).sum()
    }

    /// All-zero output: the evidence is contradictory.
    pub fn is_impossible(&self) -> bool {
        self.entries.iter().all(|(_, p)| *p == 0.0)
    }

    /// Value with the highest probability; earliest wins ties.
    pub fn most_likely(&self) -> Option<Value> {
        let mut best: Option<(Value, f64)> = None;
        for &(v, p) in &self.entries {
            if best.map_or(true, |(_, bp)| p > bp) {
                best = Some((v, p));
            }
        }
        best.map(|(v, _)| v)
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (v, p)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", v, p)?;
        }
        write!(f, "}}")
    }
}
