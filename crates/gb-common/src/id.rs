//! Network variable identity types.
//!
//! A variable is one of three kinds: the single `Season` root, a grid vertex
//! `Node`, or a fragmentation `Edge` between two vertices. Edge identity is
//! order-independent: endpoints are stored sorted.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Grid vertex coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub x: u32,
    pub y: u32,
}

impl Coord {
    pub const fn new(x: u32, y: u32) -> Self {
        Coord { x, y }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(u32, u32)> for Coord {
    fn from((x, y): (u32, u32)) -> Self {
        Coord { x, y }
    }
}

/// Unordered vertex pair in canonical (sorted) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeKey {
    a: Coord,
    b: Coord,
}

impl EdgeKey {
    /// Build a key from endpoints given in either order.
    pub fn new(u: Coord, v: Coord) -> Self {
        if u <= v {
            EdgeKey { a: u, b: v }
        } else {
            EdgeKey { a: v, b: u }
        }
    }

    /// Endpoints in canonical order.
    pub fn endpoints(&self) -> (Coord, Coord) {
        (self.a, self.b)
    }

    pub fn is_loop(&self) -> bool {
        self.a == self.b
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.a, self.b)
    }
}

/// Season level, the domain of the root variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonLevel {
    Low,
    Medium,
    High,
}

impl SeasonLevel {
    pub const ALL: [SeasonLevel; 3] = [SeasonLevel::Low, SeasonLevel::Medium, SeasonLevel::High];

    pub fn index(self) -> usize {
        match self {
            SeasonLevel::Low => 0,
            SeasonLevel::Medium => 1,
            SeasonLevel::High => 2,
        }
    }
}

impl fmt::Display for SeasonLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeasonLevel::Low => write!(f, "low"),
            SeasonLevel::Medium => write!(f, "medium"),
            SeasonLevel::High => write!(f, "high"),
        }
    }
}

/// A value some variable can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Season(SeasonLevel),
    Bool(bool),
}

impl Value {
    pub const TRUE: Value = Value::Bool(true);
    pub const FALSE: Value = Value::Bool(false);

    pub fn as_bool(self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(b),
            Value::Season(_) => None,
        }
    }

    pub fn as_season(self) -> Option<SeasonLevel> {
        match self {
            Value::Season(s) => Some(s),
            Value::Bool(_) => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<SeasonLevel> for Value {
    fn from(s: SeasonLevel) -> Self {
        Value::Season(s)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Season(s) => write!(f, "{}", s),
            Value::Bool(b) => write!(f, "{}", b),
        }
    }
}

const SEASON_DOMAIN: [Value; 3] = [
    Value::Season(SeasonLevel::Low),
    Value::Season(SeasonLevel::Medium),
    Value::Season(SeasonLevel::High),
];

const BOOL_DOMAIN: [Value; 2] = [Value::TRUE, Value::FALSE];

/// A random variable of the network.
///
/// The derived ordering (Season, then nodes, then edges) is also a valid
/// topological order of the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variable {
    Season,
    Node(Coord),
    Edge(EdgeKey),
}

impl Variable {
    pub fn node(x: u32, y: u32) -> Self {
        Variable::Node(Coord::new(x, y))
    }

    pub fn edge(u: Coord, v: Coord) -> Self {
        Variable::Edge(EdgeKey::new(u, v))
    }

    /// Values this variable can take, in canonical order.
    pub fn domain(&self) -> &'static [Value] {
        match self {
            Variable::Season => &SEASON_DOMAIN,
            Variable::Node(_) | Variable::Edge(_) => &BOOL_DOMAIN,
        }
    }

    pub fn accepts(&self, value: Value) -> bool {
        self.domain().contains(&value)
    }

    pub fn is_boolean(&self) -> bool {
        !matches!(self, Variable::Season)
    }

    /// Structural parents, in the order CPT lookups read them.
    pub fn parents(&self) -> Vec<Variable> {
        match self {
            Variable::Season => Vec::new(),
            Variable::Node(_) => vec![Variable::Season],
            Variable::Edge(key) => {
                let (a, b) = key.endpoints();
                vec![Variable::Node(a), Variable::Node(b)]
            }
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variable::Season => write!(f, "season"),
            Variable::Node(c) => write!(f, "{}", c),
            Variable::Edge(k) => write!(f, "{}", k),
        }
    }
}

impl From<Coord> for Variable {
    fn from(c: Coord) -> Self {
        Variable::Node(c)
    }
}

impl From<EdgeKey> for Variable {
    fn from(k: EdgeKey) -> Self {
        Variable::Edge(k)
    }
}
