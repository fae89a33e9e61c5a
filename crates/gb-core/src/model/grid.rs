//! Undirected grid topology used for path enumeration.
//!
//! Independent of the probabilistic DAG: a grid edge need not be a network
//! variable, and such edges are simply never blocked.

use gb_common::Coord;
use petgraph::graphmap::UnGraphMap;

/// Vertex connectivity of the grid.
#[derive(Debug, Clone, Default)]
pub struct GridTopology {
    graph: UnGraphMap<Coord, ()>,
}

impl GridTopology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full 4-neighbour lattice with `width * height` vertices.
    pub fn lattice(width: u32, height: u32) -> Self {
        let mut grid = GridTopology::new();
        for x in 0..width {
            for y in 0..height {
                grid.add_vertex(Coord::new(x, y));
            }
        }
        for x in 0..width {
            for y in 0..height {
                let here = Coord::new(x, y);
                if x + 1 < width {
                    grid.add_edge(here, Coord::new(x + 1, y));
                }
                if y + 1 < height {
                    grid.add_edge(here, Coord::new(x, y + 1));
                }
            }
        }
        grid
    }

    /// Lattice spanning `(0, 0)` through the largest coordinate in `coords`.
    ///
    /// `None` when that coordinate sits on `u32::MAX`, where the lattice
    /// width or height is not representable.
    pub fn spanning<I>(coords: I) -> Option<Self>
    where
        I: IntoIterator<Item = Coord>,
    {
        let max = coords
            .into_iter()
            .fold(None, |acc: Option<(u32, u32)>, c| match acc {
                None => Some((c.x, c.y)),
                Some((mx, my)) => Some((mx.max(c.x), my.max(c.y))),
            });
        match max {
            Some((mx, my)) => Some(Self::lattice(mx.checked_add(1)?, my.checked_add(1)?)),
            None => Some(Self::new()),
        }
    }

    /// Topology made of exactly the given connections.
    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (Coord, Coord)>,
    {
        let mut grid = GridTopology::new();
        for (u, v) in edges {
            grid.add_edge(u, v);
        }
        grid
    }

    pub fn add_vertex(&mut self, c: Coord) {
        self.graph.add_node(c);
    }

    /// Adds both endpoints if missing. Self-loops are ignored.
    pub fn add_edge(&mut self, u: Coord, v: Coord) {
        if u != v {
            self.graph.add_edge(u, v, ());
        }
    }

    pub fn contains_vertex(&self, c: Coord) -> bool {
        self.graph.contains_node(c)
    }

    pub fn contains_edge(&self, u: Coord, v: Coord) -> bool {
        self.graph.contains_edge(u, v)
    }

    /// Vertices in insertion order.
    pub fn vertices(&self) -> impl Iterator<Item = Coord> + '_ {
        self.graph.nodes()
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub(crate) fn graph(&self) -> &UnGraphMap<Coord, ()> {
        &self.graph
    }
}
