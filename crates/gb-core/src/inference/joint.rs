//! Joint probability that a set of boolean variables are all false.

use gb_common::{Evidence, Value, Variable};
use tracing::trace;

use super::enumeration::{extend, InferenceEngine, InferenceError};

impl InferenceEngine<'_> {
    /// P(v1 = false, ..., vn = false | evidence) by the chain rule.
    ///
    /// Each factor conditions on the evidence plus every earlier variable
    /// set to false. Factors are combined from the last to the first with a
    /// rounded product, so the result matches the precision of `ask`. An
    /// empty sequence yields 1.
    pub fn enumeration_ask_set(&self, variables: &[Variable], evidence: &Evidence) -> Result<f64, InferenceError> {
        if let Some(v) = variables.iter().find(|v| !v.is_boolean()) {
            return Err(InferenceError::NotBoolean(*v));
        }

        let mut running = evidence.clone();
        let mut factors = Vec::with_capacity(variables.len());
        for v in variables {
            let p_false = self.ask(v, &running)?.probability_false();
            factors.push(p_false);
            if p_false == 0.0 {
                // the product is already zero
                break;
            }
            running = extend(&running, *v, Value::FALSE)?;
        }

        let joint = factors
            .iter()
            .rev()
            .fold(1.0, |acc, p| self.precision().round(p * acc));
        trace!(target: "inference.joint", variables = variables.len(), ?factors, joint, "chain rule");
        Ok(joint)
    }
}
