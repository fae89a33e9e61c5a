//! Evidence: the set of observed variable assignments for a query.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::id::{Value, Variable};

/// Observed assignments, keyed by variable.
///
/// Single writer: a new assignment for a variable replaces the old one.
/// There is no per-variable removal; evidence is cleared as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Evidence {
    values: BTreeMap<Variable, Value>,
}

impl Evidence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign `value` to `variable`, returning the previous assignment.
    pub fn set(&mut self, variable: Variable, value: impl Into<Value>) -> Result<Option<Value>> {
        let value = check_domain(variable, value.into())?;
        Ok(self.values.insert(variable, value))
    }

    /// Copy of this evidence extended with one more assignment.
    ///
    /// Same domain check as [`set`](Self::set); the source is left untouched.
    pub fn with(&self, variable: Variable, value: impl Into<Value>) -> Result<Evidence> {
        let value = check_domain(variable, value.into())?;
        let mut next = self.clone();
        next.values.insert(variable, value);
        Ok(next)
    }

    pub fn get(&self, variable: &Variable) -> Option<Value> {
        self.values.get(variable).copied()
    }

    pub fn contains(&self, variable: &Variable) -> bool {
        self.values.contains_key(variable)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Variable, &Value)> {
        self.values.iter()
    }
}

fn check_domain(variable: Variable, value: Value) -> Result<Value> {
    if variable.accepts(value) {
        Ok(value)
    } else {
        Err(Error::DomainMismatch {
            variable: variable.to_string(),
            value: value.to_string(),
        })
    }
}
