//! Network parameter configuration.
//!
//! These are the raw inputs from which the full CPTs are derived: a season
//! prior, a base risk per grid vertex, a block parameter per fragmentation
//! edge, and one leakage probability shared by all edges.

use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::validate::{check_probability, check_schema_version, ValidationError, ValidationResult};

/// Complete network parameter set.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NetworkParams {
    pub schema_version: String,

    #[serde(default)]
    pub description: Option<String>,

    pub season: SeasonPrior,

    /// P(edge blocked) when neither endpoint is at risk.
    pub leakage: f64,

    #[serde(default)]
    pub vertices: Vec<VertexParams>,

    #[serde(default)]
    pub edges: Vec<EdgeParams>,

    /// Explicit lattice size. When absent the lattice spans every declared
    /// coordinate.
    #[serde(default)]
    pub grid: Option<GridDims>,
}

/// Prior distribution of the season variable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SeasonPrior {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl SeasonPrior {
    pub fn sum(&self) -> f64 {
        self.low + self.medium + self.high
    }
}

/// Base risk for one grid vertex.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VertexParams {
    pub x: u32,
    pub y: u32,
    /// P(vertex at risk | season = low); medium and high scale it by 2 and 3.
    pub base_risk: f64,
}

/// Block parameter for one fragmentation edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EdgeParams {
    pub from: [u32; 2],
    pub to: [u32; 2],
    /// Probability that a single at-risk endpoint blocks the edge.
    pub block: f64,
}

impl EdgeParams {
    /// Endpoints as sorted coordinate pairs.
    pub fn sorted_endpoints(&self) -> ([u32; 2], [u32; 2]) {
        if self.from <= self.to {
            (self.from, self.to)
        } else {
            (self.to, self.from)
        }
    }
}

/// Lattice size in vertices per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GridDims {
    pub width: u32,
    pub height: u32,
}

/// Tolerance for the season prior summing to one.
pub const SEASON_SUM_TOLERANCE: f64 = 1e-6;

impl NetworkParams {
    /// Load parameters from a JSON file.
    pub fn from_file(path: &std::path::Path) -> ValidationResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ValidationError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Self::parse_json(&content)
    }

    /// Parse parameters from a JSON string.
    pub fn parse_json(json: &str) -> ValidationResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| ValidationError::ParseError(format!("Invalid JSON: {}", e)))
    }

    /// Check the parameters are self-consistent.
    pub fn validate(&self) -> ValidationResult<()> {
        check_schema_version(&self.schema_version)?;

        check_probability("season.low", self.season.low)?;
        check_probability("season.medium", self.season.medium)?;
        check_probability("season.high", self.season.high)?;
        if (self.season.sum() - 1.0).abs() > SEASON_SUM_TOLERANCE {
            return Err(ValidationError::InvalidValue {
                field: "season".to_string(),
                message: format!("prior must sum to 1, got {}", self.season.sum()),
            });
        }
        check_probability("leakage", self.leakage)?;

        let mut seen = BTreeSet::new();
        for v in &self.vertices {
            check_probability(format!("vertices[({}, {})].base_risk", v.x, v.y), v.base_risk)?;
            if !seen.insert([v.x, v.y]) {
                return Err(ValidationError::Duplicate {
                    kind: "vertex",
                    key: format!("({}, {})", v.x, v.y),
                });
            }
            self.check_in_grid([v.x, v.y])?;
        }

        let mut seen_edges = BTreeSet::new();
        for e in &self.edges {
            let (a, b) = e.sorted_endpoints();
            let label = format!("(({}, {}), ({}, {}))", a[0], a[1], b[0], b[1]);
            check_probability(format!("edges[{}].block", label), e.block)?;
            if a == b {
                return Err(ValidationError::InvalidValue {
                    field: format!("edges[{}]", label),
                    message: "edge endpoints must differ".to_string(),
                });
            }
            for endpoint in [a, b] {
                if !seen.contains(&endpoint) {
                    return Err(ValidationError::UnknownVertex {
                        edge: label.clone(),
                        vertex: format!("({}, {})", endpoint[0], endpoint[1]),
                    });
                }
            }
            if !seen_edges.insert((a, b)) {
                return Err(ValidationError::Duplicate {
                    kind: "edge",
                    key: label,
                });
            }
        }
        Ok(())
    }

    fn check_in_grid(&self, coord: [u32; 2]) -> ValidationResult<()> {
        match self.grid {
            Some(dims) if coord[0] >= dims.width || coord[1] >= dims.height => {
                Err(ValidationError::InvalidValue {
                    field: "grid".to_string(),
                    message: format!(
                        "vertex ({}, {}) lies outside a {}x{} grid",
                        coord[0], coord[1], dims.width, dims.height
                    ),
                })
            }
            _ => Ok(()),
        }
    }
}

/// JSON schema describing [`NetworkParams`].
pub fn network_params_schema() -> serde_json::Value {
    schemars::schema_for!(NetworkParams).to_value()
}

/// Embedded default parameters for demos and tests.
const DEFAULT_NETWORK_JSON: &str = include_str!("schemas/network.default.json");

impl Default for NetworkParams {
    fn default() -> Self {
        // This should never fail since the JSON is embedded at compile time
        Self::parse_json(DEFAULT_NETWORK_JSON).expect("Embedded default network JSON is invalid")
    }
}
