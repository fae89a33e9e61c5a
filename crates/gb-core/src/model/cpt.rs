//! Conditional probability tables.
//!
//! One table per variable kind:
//! - season: prior over {low, medium, high}
//! - vertex: P(at risk | season), derived from a single base risk
//! - edge: P(blocked | endpoint risks) as a noisy-or with leakage

use std::collections::BTreeMap;

use gb_common::{Coord, EdgeKey, Evidence, SeasonLevel, Value, Variable};
use gb_math::Precision;
use serde::Serialize;

/// Errors raised by CPT lookups.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CptError {
    /// A parent was not assigned before its child was evaluated.
    #[error("missing parent {parent} while conditioning {variable}")]
    MissingParent { variable: Variable, parent: Variable },

    #[error("parent {parent} of {variable} holds {value}, outside its domain")]
    ParentDomain {
        variable: Variable,
        parent: Variable,
        value: Value,
    },

    #[error("no CPT for {0}")]
    UnknownVariable(Variable),

    #[error("value {value} is outside the domain of {variable}")]
    DomainMismatch { variable: Variable, value: Value },
}

/// Season prior, indexed by [`SeasonLevel::index`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeasonCpt {
    prior: [f64; 3],
}

impl SeasonCpt {
    pub fn new(low: f64, medium: f64, high: f64) -> Self {
        SeasonCpt {
            prior: [low, medium, high],
        }
    }

    pub fn prior(&self, level: SeasonLevel) -> f64 {
        self.prior[level.index()]
    }

    pub fn sum(&self) -> f64 {
        self.prior.iter().sum()
    }
}

/// P(vertex at risk | season).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NodeCpt {
    p_true: [f64; 3],
}

impl NodeCpt {
    /// Risk scales linearly with season severity, capped at 1.
    pub fn from_base_risk(p: f64, precision: Precision) -> Self {
        NodeCpt {
            p_true: [
                precision.round(p),
                precision.round((2.0 * p).min(1.0)),
                precision.round((3.0 * p).min(1.0)),
            ],
        }
    }

    pub fn p_true(&self, season: SeasonLevel) -> f64 {
        self.p_true[season.index()]
    }
}

/// P(edge blocked | endpoint a at risk, endpoint b at risk).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EdgeCpt {
    /// Indexed `[a as usize][b as usize]`, endpoints in canonical order.
    p_true: [[f64; 2]; 2],
}

impl EdgeCpt {
    /// Noisy-or over the endpoints: each at-risk endpoint independently fails
    /// to block with `qi = 1 - block`; `leakage` applies when neither is.
    pub fn from_block(block: f64, leakage: f64, precision: Precision) -> Self {
        let qi = 1.0 - block;
        let one = precision.round(1.0 - qi);
        let both = precision.round(1.0 - qi * qi);
        EdgeCpt {
            p_true: [[leakage, one], [one, both]],
        }
    }

    pub fn p_true(&self, a: bool, b: bool) -> f64 {
        self.p_true[a as usize][b as usize]
    }
}

/// One displayable CPT row: a parent assignment and P(variable = first domain value).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CptRow {
    pub condition: String,
    pub probability: f64,
}

/// All conditional probability tables of a network.
#[derive(Debug, Clone, PartialEq)]
pub struct CptModel {
    season: SeasonCpt,
    nodes: BTreeMap<Coord, NodeCpt>,
    edges: BTreeMap<EdgeKey, EdgeCpt>,
}

impl CptModel {
    pub fn new(
        season: SeasonCpt,
        nodes: BTreeMap<Coord, NodeCpt>,
        edges: BTreeMap<EdgeKey, EdgeCpt>,
    ) -> Self {
        CptModel {
            season,
            nodes,
            edges,
        }
    }

    /// P(`variable` = `value` | parents), parents read from `evidence`.
    pub fn probability(
        &self,
        variable: &Variable,
        evidence: &Evidence,
        value: Value,
    ) -> Result<f64, CptError> {
        let mismatch = || CptError::DomainMismatch {
            variable: *variable,
            value,
        };
        match variable {
            Variable::Season => {
                let level = value.as_season().ok_or_else(mismatch)?;
                Ok(self.season.prior(level))
            }
            Variable::Node(coord) => {
                let want = value.as_bool().ok_or_else(mismatch)?;
                let cpt = self
                    .nodes
                    .get(coord)
                    .ok_or(CptError::UnknownVariable(*variable))?;
                let season = parent_value(variable, &Variable::Season, evidence)?;
                let level = season.as_season().ok_or(CptError::ParentDomain {
                    variable: *variable,
                    parent: Variable::Season,
                    value: season,
                })?;
                Ok(select(cpt.p_true(level), want))
            }
            Variable::Edge(key) => {
                let want = value.as_bool().ok_or_else(mismatch)?;
                let cpt = self
                    .edges
                    .get(key)
                    .ok_or(CptError::UnknownVariable(*variable))?;
                let (a, b) = key.endpoints();
                let a = parent_bool(variable, &Variable::Node(a), evidence)?;
                let b = parent_bool(variable, &Variable::Node(b), evidence)?;
                Ok(select(cpt.p_true(a, b), want))
            }
        }
    }

    pub fn season(&self) -> &SeasonCpt {
        &self.season
    }

    pub fn node(&self, coord: &Coord) -> Option<&NodeCpt> {
        self.nodes.get(coord)
    }

    pub fn edge(&self, key: &EdgeKey) -> Option<&EdgeCpt> {
        self.edges.get(key)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&Coord, &NodeCpt)> {
        self.nodes.iter()
    }

    pub fn edges(&self) -> impl Iterator<Item = (&EdgeKey, &EdgeCpt)> {
        self.edges.iter()
    }

    /// Table rows for display, or `None` if the variable has no CPT.
    pub fn rows(&self, variable: &Variable) -> Option<Vec<CptRow>> {
        let row = |condition: String, probability: f64| CptRow {
            condition,
            probability,
        };
        match variable {
            Variable::Season => Some(
                SeasonLevel::ALL
                    .iter()
                    .map(|&s| row(s.to_string(), self.season.prior(s)))
                    .collect(),
            ),
            Variable::Node(c) => self.nodes.get(c).map(|cpt| {
                SeasonLevel::ALL
                    .iter()
                    .map(|&s| row(s.to_string(), cpt.p_true(s)))
                    .collect()
            }),
            Variable::Edge(k) => self.edges.get(k).map(|cpt| {
                [(false, false), (true, false), (false, true), (true, true)]
                    .iter()
                    .map(|&(a, b)| row(format!("({}, {})", a, b), cpt.p_true(a, b)))
                    .collect()
            }),
        }
    }
}

fn select(p_true: f64, want: bool) -> f64 {
    if want {
        p_true
    } else {
        1.0 - p_true
    }
}

fn parent_value(
    variable: &Variable,
    parent: &Variable,
    evidence: &Evidence,
) -> Result<Value, CptError> {
    evidence.get(parent).ok_or(CptError::MissingParent {
        variable: *variable,
        parent: *parent,
    })
}

fn parent_bool(variable: &Variable, parent: &Variable, evidence: &Evidence) -> Result<bool, CptError> {
    let value = parent_value(variable, parent, evidence)?;
    value.as_bool().ok_or(CptError::ParentDomain {
        variable: *variable,
        parent: *parent,
        value,
    })
}
