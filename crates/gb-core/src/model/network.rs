//! Three-layer Bayesian network: season → vertices → fragmentation edges.
//!
//! The network is built once and never mutated afterwards. Pruned copies
//! (see [`crate::inference::prune_barren`]) share the CPT tables and the grid
//! with the canonical instance and only own their DAG.

use std::collections::BTreeMap;
use std::sync::Arc;

use gb_common::{Coord, EdgeKey, Variable};
use gb_config::{NetworkParams, SeasonPrior, ValidationError};
use gb_math::Precision;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::Direction;
use tracing::{debug, warn};

use super::cpt::{CptModel, EdgeCpt, NodeCpt, SeasonCpt};
use super::grid::GridTopology;

/// Errors raised while assembling a network.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BuildError {
    #[error("{field}: probability must be in [0, 1], got {value}")]
    InvalidProbability { field: String, value: f64 },

    #[error("edge {0} has identical endpoints")]
    SelfLoop(EdgeKey),

    #[error("edge {edge} references undeclared vertex {vertex}")]
    UnknownEndpoint { edge: EdgeKey, vertex: Coord },

    #[error("duplicate declaration of {0}")]
    Duplicate(Variable),

    #[error("vertex {0} is too large for the default lattice; declare the grid explicitly")]
    GridOverflow(Coord),

    #[error(transparent)]
    Config(#[from] ValidationError),
}

/// Immutable season/vertex/edge network.
#[derive(Debug, Clone)]
pub struct BayesNetwork {
    cpt: Arc<CptModel>,
    grid: Arc<GridTopology>,
    index: Arc<BTreeMap<Variable, NodeIndex>>,
    dag: StableDiGraph<Variable, ()>,
}

impl BayesNetwork {
    pub fn builder(season: SeasonPrior, leakage: f64) -> NetworkBuilder {
        NetworkBuilder::new(season, leakage)
    }

    /// Validate `params` and build the network they describe.
    pub fn from_params(params: &NetworkParams) -> Result<Self, BuildError> {
        NetworkBuilder::from_params(params)?.build()
    }

    pub fn contains(&self, variable: &Variable) -> bool {
        self.node_index(variable).is_some()
    }

    /// Number of variables present.
    pub fn len(&self) -> usize {
        self.dag.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.dag.node_count() == 0
    }

    /// Season, then vertices by coordinate, then edges by key.
    ///
    /// Every variable appears after all of its parents.
    pub fn topological_order(&self) -> Vec<Variable> {
        self.index
            .iter()
            .filter(|(_, idx)| self.dag.contains_node(**idx))
            .map(|(v, _)| *v)
            .collect()
    }

    /// Parents still present in this network, in CPT lookup order.
    pub fn parents_of(&self, variable: &Variable) -> Vec<Variable> {
        if !self.contains(variable) {
            return Vec::new();
        }
        variable
            .parents()
            .into_iter()
            .filter(|p| self.contains(p))
            .collect()
    }

    pub fn cpt(&self) -> &CptModel {
        &self.cpt
    }

    pub fn grid(&self) -> &GridTopology {
        &self.grid
    }

    pub(crate) fn in_degree(&self, variable: &Variable) -> usize {
        self.degree(variable, Direction::Incoming)
    }

    pub(crate) fn out_degree(&self, variable: &Variable) -> usize {
        self.degree(variable, Direction::Outgoing)
    }

    /// Remove a variable and its incident arcs. Returns false if absent.
    pub(crate) fn remove(&mut self, variable: &Variable) -> bool {
        match self.node_index(variable) {
            Some(idx) => self.dag.remove_node(idx).is_some(),
            None => false,
        }
    }

    fn degree(&self, variable: &Variable, dir: Direction) -> usize {
        self.node_index(variable)
            .map(|idx| self.dag.neighbors_directed(idx, dir).count())
            .unwrap_or(0)
    }

    fn node_index(&self, variable: &Variable) -> Option<NodeIndex> {
        self.index
            .get(variable)
            .copied()
            .filter(|idx| self.dag.contains_node(*idx))
    }
}

/// Assembles a [`BayesNetwork`] from raw parameters.
#[derive(Debug, Clone)]
pub struct NetworkBuilder {
    season: SeasonPrior,
    leakage: f64,
    vertices: Vec<(Coord, f64)>,
    edges: Vec<(EdgeKey, f64)>,
    grid: Option<GridTopology>,
    precision: Precision,
}

/// Allowed drift of the season prior from 1 before a warning is logged.
const SEASON_SUM_TOLERANCE: f64 = 1e-6;

impl NetworkBuilder {
    pub fn new(season: SeasonPrior, leakage: f64) -> Self {
        NetworkBuilder {
            season,
            leakage,
            vertices: Vec::new(),
            edges: Vec::new(),
            grid: None,
            precision: Precision::default(),
        }
    }

    /// Builder populated from validated configuration.
    pub fn from_params(params: &NetworkParams) -> Result<Self, BuildError> {
        params.validate()?;
        let mut builder = NetworkBuilder::new(params.season, params.leakage);
        for v in &params.vertices {
            builder = builder.vertex(Coord::new(v.x, v.y), v.base_risk);
        }
        for e in &params.edges {
            builder = builder.edge(
                Coord::new(e.from[0], e.from[1]),
                Coord::new(e.to[0], e.to[1]),
                e.block,
            );
        }
        if let Some(dims) = params.grid {
            builder = builder.grid(GridTopology::lattice(dims.width, dims.height));
        }
        Ok(builder)
    }

    /// Declare a vertex with its base risk.
    pub fn vertex(mut self, coord: Coord, base_risk: f64) -> Self {
        self.vertices.push((coord, base_risk));
        self
    }

    /// Declare a fragmentation edge; endpoint order does not matter.
    pub fn edge(mut self, u: Coord, v: Coord, block: f64) -> Self {
        self.edges.push((EdgeKey::new(u, v), block));
        self
    }

    /// Use an explicit grid instead of the spanning lattice.
    pub fn grid(mut self, grid: GridTopology) -> Self {
        self.grid = Some(grid);
        self
    }

    /// Precision applied to derived CPT entries.
    pub fn precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    pub fn build(self) -> Result<BayesNetwork, BuildError> {
        check_probability("season.low", self.season.low)?;
        check_probability("season.medium", self.season.medium)?;
        check_probability("season.high", self.season.high)?;
        check_probability("leakage", self.leakage)?;
        let season = SeasonCpt::new(self.season.low, self.season.medium, self.season.high);
        if (season.sum() - 1.0).abs() > SEASON_SUM_TOLERANCE {
            warn!(
                target: "network.build",
                sum = season.sum(),
                "season prior does not sum to 1"
            );
        }

        let mut nodes = BTreeMap::new();
        for &(coord, base_risk) in &self.vertices {
            check_probability(&format!("vertex {}", coord), base_risk)?;
            let cpt = NodeCpt::from_base_risk(base_risk, self.precision);
            if nodes.insert(coord, cpt).is_some() {
                return Err(BuildError::Duplicate(Variable::Node(coord)));
            }
        }

        let mut edges = BTreeMap::new();
        for &(key, block) in &self.edges {
            check_probability(&format!("edge {}", key), block)?;
            if key.is_loop() {
                return Err(BuildError::SelfLoop(key));
            }
            let (a, b) = key.endpoints();
            for vertex in [a, b] {
                if !nodes.contains_key(&vertex) {
                    return Err(BuildError::UnknownEndpoint { edge: key, vertex });
                }
            }
            let cpt = EdgeCpt::from_block(block, self.leakage, self.precision);
            if edges.insert(key, cpt).is_some() {
                return Err(BuildError::Duplicate(Variable::Edge(key)));
            }
        }

        let mut dag = StableDiGraph::new();
        let mut index = BTreeMap::new();
        let season_idx = dag.add_node(Variable::Season);
        index.insert(Variable::Season, season_idx);
        for coord in nodes.keys() {
            let var = Variable::Node(*coord);
            let idx = dag.add_node(var);
            dag.add_edge(season_idx, idx, ());
            index.insert(var, idx);
        }
        for key in edges.keys() {
            let var = Variable::Edge(*key);
            let idx = dag.add_node(var);
            let (a, b) = key.endpoints();
            for parent in [Variable::Node(a), Variable::Node(b)] {
                if let Some(&p) = index.get(&parent) {
                    dag.add_edge(p, idx, ());
                }
            }
            index.insert(var, idx);
        }

        let grid = match self.grid {
            Some(grid) => grid,
            // edge endpoints are declared vertices, so the vertices bound the lattice
            None => GridTopology::spanning(nodes.keys().copied()).ok_or_else(|| {
                let far = nodes
                    .keys()
                    .copied()
                    .find(|c| c.x == u32::MAX || c.y == u32::MAX)
                    .unwrap_or(Coord::new(u32::MAX, u32::MAX));
                BuildError::GridOverflow(far)
            })?,
        };

        debug!(
            target: "network.build",
            vertices = nodes.len(),
            edges = edges.len(),
            grid_vertices = grid.vertex_count(),
            grid_edges = grid.edge_count(),
            "network built"
        );

        Ok(BayesNetwork {
            cpt: Arc::new(CptModel::new(season, nodes, edges)),
            grid: Arc::new(grid),
            index: Arc::new(index),
            dag,
        })
    }
}

fn check_probability(field: &str, value: f64) -> Result<(), BuildError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(BuildError::InvalidProbability {
            field: field.to_string(),
            value,
        })
    }
}
