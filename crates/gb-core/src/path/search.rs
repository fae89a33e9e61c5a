use gb_common::{Coord, Evidence};
use petgraph::algo::all_simple_paths;
use tracing::debug;

use super::{GridPath, ScoredPath};
use crate::inference::{InferenceEngine, InferenceError};

/// Errors raised by path search.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PathError {
    #[error("vertex {0} is not on the grid")]
    UnknownVertex(Coord),

    #[error("grid has {vertices} vertices, path enumeration is limited to {limit}")]
    GridTooLarge { vertices: usize, limit: usize },

    #[error("{from} and {to} are not adjacent on the grid")]
    NotAGridEdge { from: Coord, to: Coord },

    #[error(transparent)]
    Inference(#[from] InferenceError),
}

/// Simple-path enumeration and scoring over the engine's grid.
#[derive(Debug, Clone, Copy)]
pub struct PathSearch<'n> {
    engine: InferenceEngine<'n>,
    max_grid_vertices: usize,
}

impl<'n> PathSearch<'n> {
    pub fn new(engine: InferenceEngine<'n>, max_grid_vertices: usize) -> Self {
        PathSearch {
            engine,
            max_grid_vertices,
        }
    }

    /// Every simple path from `start` to `end`, in petgraph enumeration order.
    ///
    /// Empty when `start == end`.
    pub fn simple_paths(&self, start: Coord, end: Coord) -> Result<Vec<GridPath>, PathError> {
        let grid = self.engine.network().grid();
        self.check_size()?;
        for c in [start, end] {
            if !grid.contains_vertex(c) {
                return Err(PathError::UnknownVertex(c));
            }
        }
        if start == end {
            return Ok(Vec::new());
        }
        Ok(all_simple_paths::<Vec<Coord>, _>(grid.graph(), start, end, 0, None)
            .map(GridPath::from_vertices)
            .collect())
    }

    /// Simple paths between every ordered pair of distinct vertices.
    pub fn all_simple_paths_edges(&self) -> Result<Vec<GridPath>, PathError> {
        self.check_size()?;
        let vertices: Vec<Coord> = self.engine.network().grid().vertices().collect();
        let mut paths = Vec::new();
        for &start in &vertices {
            for &end in &vertices {
                if start != end {
                    paths.extend(self.simple_paths(start, end)?);
                }
            }
        }
        debug!(target: "path.enumerate", vertices = vertices.len(), paths = paths.len(), "enumerated simple paths");
        Ok(paths)
    }

    /// Probability that no edge of `path` is blocked.
    pub fn path_probability(&self, path: &GridPath, evidence: &Evidence) -> Result<f64, PathError> {
        let grid = self.engine.network().grid();
        for &c in path.vertices() {
            if !grid.contains_vertex(c) {
                return Err(PathError::UnknownVertex(c));
            }
        }
        for step in path.steps() {
            if !grid.contains_edge(step.from, step.to) {
                return Err(PathError::NotAGridEdge {
                    from: step.from,
                    to: step.to,
                });
            }
        }
        Ok(self.engine.enumeration_ask_set(&path.variables(), evidence)?)
    }

    /// Highest-scoring simple path from `start` to `end`.
    ///
    /// Ties keep the earliest path. `None` when no path exists, including
    /// `start == end`. A connected path is returned even if its score is 0.
    pub fn find_non_blocked_path(
        &self,
        start: Coord,
        end: Coord,
        evidence: &Evidence,
    ) -> Result<Option<ScoredPath>, PathError> {
        let mut best: Option<ScoredPath> = None;
        let mut scored = 0usize;
        for path in self.simple_paths(start, end)? {
            let score = self.engine.enumeration_ask_set(&path.variables(), evidence)?;
            scored += 1;
            if best.as_ref().map_or(true, |b| score > b.score) {
                best = Some(ScoredPath { score, path });
            }
        }
        debug!(
            target: "path.search",
            %start,
            %end,
            scored,
            best = best.as_ref().map(|b| b.score),
            "most reliable path"
        );
        Ok(best)
    }

    fn check_size(&self) -> Result<(), PathError> {
        let vertices = self.engine.network().grid().vertex_count();
        if vertices > self.max_grid_vertices {
            return Err(PathError::GridTooLarge {
                vertices,
                limit: self.max_grid_vertices,
            });
        }
        Ok(())
    }
}
