//! Stateful facade for interactive callers.
//!
//! Holds a shared network, the current evidence register, and engine
//! settings. Every query reads the register; only `set_evidence` and
//! `clear_evidence` change it. Errors are mapped to [`gb_common::Error`].

use std::collections::BTreeMap;
use std::sync::Arc;

use gb_common::{Coord, Error, Evidence, Result, Value, Variable};
use gb_config::{EngineSettings, NetworkParams};
use gb_math::Precision;
use serde_json::json;
use tracing::debug;

use crate::inference::{Distribution, InferenceEngine, InferenceError};
use crate::model::{BayesNetwork, BuildError, CptError, CptModel, CptRow};
use crate::path::{GridPath, PathError, PathSearch, ScoredPath};

/// Network, evidence, and settings bundled for repeated queries.
#[derive(Debug, Clone)]
pub struct InferenceSession {
    network: Arc<BayesNetwork>,
    evidence: Evidence,
    settings: EngineSettings,
}

impl InferenceSession {
    pub fn new(network: Arc<BayesNetwork>, settings: EngineSettings) -> Result<Self> {
        settings.validate()?;
        Ok(InferenceSession {
            network,
            evidence: Evidence::new(),
            settings,
        })
    }

    /// Build the network from `params` and open a session on it.
    pub fn from_params(params: &NetworkParams, settings: EngineSettings) -> Result<Self> {
        let network = BayesNetwork::from_params(params)?;
        Self::new(Arc::new(network), settings)
    }

    /// Observe `variable`. Returns the value it replaced, if any.
    pub fn set_evidence(&mut self, variable: Variable, value: impl Into<Value>) -> Result<Option<Value>> {
        let value = value.into();
        let previous = self.evidence.set(variable, value)?;
        debug!(target: "session.evidence", %variable, %value, observed = self.evidence.len(), "evidence set");
        Ok(previous)
    }

    pub fn clear_evidence(&mut self) {
        self.evidence.clear();
        debug!(target: "session.evidence", "evidence cleared");
    }

    pub fn evidence(&self) -> &Evidence {
        &self.evidence
    }

    pub fn network(&self) -> &Arc<BayesNetwork> {
        &self.network
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn cpt(&self) -> &CptModel {
        self.network.cpt()
    }

    pub fn cpt_rows(&self, variable: &Variable) -> Option<Vec<CptRow>> {
        self.network.cpt().rows(variable)
    }

    /// Engine configured from the session settings.
    pub fn engine(&self) -> InferenceEngine<'_> {
        InferenceEngine::new(&self.network)
            .with_precision(Precision::new(self.settings.inference.round_digits))
            .with_parallel(self.settings.inference.parallel)
    }

    fn search(&self) -> PathSearch<'_> {
        PathSearch::new(self.engine(), self.settings.paths.max_grid_vertices)
    }

    pub fn ask(&self, query: &Variable) -> Result<Distribution> {
        Ok(self.engine().ask(query, &self.evidence)?)
    }

    pub fn ask_all(&self) -> Result<BTreeMap<Variable, Distribution>> {
        Ok(self.engine().ask_all(&self.evidence)?)
    }

    pub fn enumeration_ask_set(&self, variables: &[Variable]) -> Result<f64> {
        Ok(self.engine().enumeration_ask_set(variables, &self.evidence)?)
    }

    pub fn simple_paths(&self, start: Coord, end: Coord) -> Result<Vec<GridPath>> {
        Ok(self.search().simple_paths(start, end)?)
    }

    pub fn all_simple_paths_edges(&self) -> Result<Vec<GridPath>> {
        Ok(self.search().all_simple_paths_edges()?)
    }

    pub fn find_non_blocked_path(&self, start: Coord, end: Coord) -> Result<Option<ScoredPath>> {
        Ok(self.search().find_non_blocked_path(start, end, &self.evidence)?)
    }

    pub fn path_probability(&self, path: &GridPath) -> Result<f64> {
        Ok(self.search().path_probability(path, &self.evidence)?)
    }

    /// Evidence and every posterior as a JSON document.
    pub fn posterior_report(&self) -> Result<serde_json::Value> {
        let evidence: serde_json::Map<String, serde_json::Value> = self
            .evidence
            .iter()
            .map(|(var, value)| (var.to_string(), json!(value.to_string())))
            .collect();

        let posteriors: Vec<serde_json::Value> = self
            .ask_all()?
            .into_iter()
            .map(|(var, dist)| {
                let entries: serde_json::Map<String, serde_json::Value> = dist
                    .entries()
                    .iter()
                    .map(|(value, p)| (value.to_string(), json!(p)))
                    .collect();
                let most_likely = if dist.is_impossible() {
                    None
                } else {
                    dist.most_likely().map(|v| v.to_string())
                };
                json!({
                    "variable": var.to_string(),
                    "distribution": entries,
                    "most_likely": most_likely,
                    "impossible": dist.is_impossible(),
                })
            })
            .collect();

        Ok(json!({
            "schema_version": gb_common::SCHEMA_VERSION,
            "evidence": evidence,
            "posteriors": posteriors,
        }))
    }
}

impl From<BuildError> for Error {
    fn from(err: BuildError) -> Self {
        match err {
            BuildError::Config(inner) => inner.into(),
            other => Error::Build(other.to_string()),
        }
    }
}

impl From<CptError> for Error {
    fn from(err: CptError) -> Self {
        match err {
            CptError::MissingParent { variable, parent } => Error::Conditioning {
                variable: variable.to_string(),
                parent: parent.to_string(),
            },
            CptError::DomainMismatch { variable, value } => Error::DomainMismatch {
                variable: variable.to_string(),
                value: value.to_string(),
            },
            other => Error::Inference(other.to_string()),
        }
    }
}

impl From<InferenceError> for Error {
    fn from(err: InferenceError) -> Self {
        match err {
            InferenceError::Cpt(cpt) => cpt.into(),
            other => Error::Inference(other.to_string()),
        }
    }
}

impl From<PathError> for Error {
    fn from(err: PathError) -> Self {
        match err {
            PathError::Inference(inner) => inner.into(),
            other => Error::PathSearch(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gb_common::SeasonLevel;

    fn session() -> InferenceSession {
        InferenceSession::from_params(&NetworkParams::default(), EngineSettings::default()).unwrap()
    }

    #[test]
    fn evidence_flows_into_queries() {
        let mut s = session();
        let prior = s.ask(&Variable::node(0, 0)).unwrap();
        s.set_evidence(Variable::Season, SeasonLevel::Low).unwrap();
        let posterior = s.ask(&Variable::node(0, 0)).unwrap();
        assert_ne!(prior, posterior);
        assert_eq!(posterior.probability_true(), 0.1);

        s.clear_evidence();
        assert!(s.evidence().is_empty());
        assert_eq!(s.ask(&Variable::node(0, 0)).unwrap(), prior);
    }

    #[test]
    fn set_evidence_returns_previous() {
        let mut s = session();
        let v = Variable::node(1, 0);
        assert_eq!(s.set_evidence(v, true).unwrap(), None);
        assert_eq!(s.set_evidence(v, false).unwrap(), Some(Value::TRUE));
    }

    #[test]
    fn domain_mismatch_is_rejected() {
        let mut s = session();
        let err = s.set_evidence(Variable::Season, true).unwrap_err();
        assert_eq!(err.code(), 21);
        assert!(s.evidence().is_empty());
    }

    #[test]
    fn not_boolean_maps_to_inference_error() {
        let s = session();
        let err = s.enumeration_ask_set(&[Variable::Season]).unwrap_err();
        assert_eq!(err.code(), 30);
    }

    #[test]
    fn path_errors_map_to_path_code() {
        let s = session();
        let err = s.find_non_blocked_path(Coord::new(0, 0), Coord::new(9, 9)).unwrap_err();
        assert_eq!(err.code(), 40);
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let mut settings = EngineSettings::default();
        settings.inference.round_digits = 0;
        let net = Arc::new(BayesNetwork::from_params(&NetworkParams::default()).unwrap());
        let err = InferenceSession::new(net, settings).unwrap_err();
        assert_eq!(err.code(), 11);
    }

    #[test]
    fn build_errors_keep_their_category() {
        let mut params = NetworkParams::default();
        params.leakage = 2.0;
        let err = InferenceSession::from_params(&params, EngineSettings::default()).unwrap_err();
        assert_eq!(err.code(), 11);
    }

    #[test]
    fn report_lists_every_variable() {
        let mut s = session();
        s.set_evidence(Variable::node(0, 1), true).unwrap();
        let report = s.posterior_report().unwrap();
        assert_eq!(report["posteriors"].as_array().unwrap().len(), 9);
        assert_eq!(report["evidence"]["(0, 1)"], "true");
        assert_eq!(report["posteriors"][0]["variable"], "season");
        let observed = &report["posteriors"][2];
        assert_eq!(observed["variable"], "(0, 1)");
        assert_eq!(observed["most_likely"], "true");
        assert_eq!(observed["impossible"], false);
    }
}
