//! Most-reliable path search over the grid.
//!
//! A path is scored by the joint probability that none of its edges are
//! blocked. Grid edges that are not network variables are never blocked.

mod search;

use std::fmt;

use gb_common::{Coord, Variable};
use serde::Serialize;

pub use search::{PathError, PathSearch};

/// One traversal from a vertex to an adjacent vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Step {
    pub from: Coord,
    pub to: Coord,
}

impl Step {
    /// The fragmentation edge crossed by this step.
    pub fn variable(&self) -> Variable {
        Variable::edge(self.from, self.to)
    }
}

/// Vertex sequence of a simple path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridPath {
    vertices: Vec<Coord>,
}

impl GridPath {
    pub fn from_vertices(vertices: Vec<Coord>) -> Self {
        GridPath { vertices }
    }

    pub fn vertices(&self) -> &[Coord] {
        &self.vertices
    }

    /// Consecutive vertex pairs, in travel order.
    pub fn steps(&self) -> Vec<Step> {
        self.vertices
            .windows(2)
            .map(|w| Step { from: w[0], to: w[1] })
            .collect()
    }

    /// Edge variables crossed, in travel order.
    pub fn variables(&self) -> Vec<Variable> {
        self.steps().iter().map(Step::variable).collect()
    }

    pub fn start(&self) -> Option<Coord> {
        self.vertices.first().copied()
    }

    pub fn end(&self) -> Option<Coord> {
        self.vertices.last().copied()
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.vertices.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for GridPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, c) in self.vertices.iter().enumerate() {
            if i > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

/// A path with its probability of being entirely unblocked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredPath {
    pub score: f64,
    pub path: GridPath,
}
