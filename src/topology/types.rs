//! Topology type definitions.
//!
//! A topology is a tree of [`Node`]s whose leaves are hosts and switches.
//! The containment tree and the connectivity graph are independent: edges
//! live on the leaves and point at other leaves by id, anywhere in the tree.

use std::fmt;
use std::str::FromStr;

use rand::Rng;

use crate::model::Identified;

/// Link bandwidth in bits per second
pub type Bandwidth = u64;

/// Standard Ethernet rates that generated links are drawn from
pub const BANDWIDTHS: [Bandwidth; 7] = [
    10_000_000,
    100_000_000,
    1_000_000_000,
    10_000_000_000,
    25_000_000_000,
    40_000_000_000,
    100_000_000_000,
];

/// Draw a bandwidth uniformly from [`BANDWIDTHS`]
pub fn random_bandwidth<R: Rng + ?Sized>(rng: &mut R) -> Bandwidth {
    BANDWIDTHS[rng.gen_range(0..BANDWIDTHS.len())]
}

/// Kind of device a leaf represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeafKind {
    Host,
    Switch,
}

impl LeafKind {
    /// Returns the canonical type name ("Host" or "Switch")
    pub fn name(&self) -> &'static str {
        match self {
            Self::Host => "Host",
            Self::Switch => "Switch",
        }
    }
}

impl fmt::Display for LeafKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LeafKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "host" => Ok(Self::Host),
            "switch" => Ok(Self::Switch),
            _ => Err(format!("Unknown leaf type: {}", s)),
        }
    }
}

/// Directed link owned by its source leaf
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    id: String,
    source: String,
    destination: String,
    bandwidth: Bandwidth,
}

impl Edge {
    fn new(source: &str, destination: &str, bandwidth: Bandwidth) -> Self {
        Self {
            id: format!("{}_{}_{}", source, destination, bandwidth),
            source: source.to_string(),
            destination: destination.to_string(),
            bandwidth,
        }
    }

    /// Id of the leaf owning this edge
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Id of the leaf this edge points at
    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn bandwidth(&self) -> Bandwidth {
        self.bandwidth
    }
}

impl Identified for Edge {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Smallest unit of a network, e.g. a host or a switch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    id: String,
    kind: LeafKind,
    edges: Vec<Edge>,
}

impl Leaf {
    pub fn new(id: impl Into<String>, kind: LeafKind) -> Self {
        Self {
            id: id.into(),
            kind,
            edges: Vec::new(),
        }
    }

    pub fn host(id: impl Into<String>) -> Self {
        Self::new(id, LeafKind::Host)
    }

    pub fn switch(id: impl Into<String>) -> Self {
        Self::new(id, LeafKind::Switch)
    }

    pub fn kind(&self) -> LeafKind {
        self.kind
    }

    /// Outgoing edges in insertion order
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Append one directed edge towards `destination`.
    ///
    /// No reciprocal edge is created; links that should work both ways need
    /// a second call on the destination leaf.
    pub fn add_edge(&mut self, destination: &str, bandwidth: Bandwidth) {
        let edge = Edge::new(&self.id, destination, bandwidth);
        self.edges.push(edge);
    }
}

impl Identified for Leaf {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Named container of nested nodes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Topology {
    id: String,
    nodes: Vec<Node>,
}

impl Topology {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            nodes: Vec::new(),
        }
    }

    pub fn add_node(&mut self, node: impl Into<Node>) {
        self.nodes.push(node.into());
    }

    /// Direct children in insertion order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }
}

impl Identified for Topology {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Anything that can be (sub-)connected to anything
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Leaf(Leaf),
    Topology(Topology),
}

impl Node {
    pub fn id(&self) -> &str {
        match self {
            Self::Leaf(leaf) => leaf.id(),
            Self::Topology(topology) => topology.id(),
        }
    }

    /// All leaves below this node, depth-first and left-to-right.
    ///
    /// Calling this repeatedly yields the same sequence.
    pub fn flatten(&self) -> Vec<&Leaf> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);
        leaves
    }

    fn collect_leaves<'a>(&'a self, leaves: &mut Vec<&'a Leaf>) {
        match self {
            Self::Leaf(leaf) => leaves.push(leaf),
            Self::Topology(topology) => {
                for node in &topology.nodes {
                    node.collect_leaves(leaves);
                }
            }
        }
    }

    /// Mutable counterpart of [`Node::flatten`], same order
    pub(crate) fn leaves_mut(&mut self) -> Vec<&mut Leaf> {
        let mut leaves = Vec::new();
        self.collect_leaves_mut(&mut leaves);
        leaves
    }

    fn collect_leaves_mut<'a>(&'a mut self, leaves: &mut Vec<&'a mut Leaf>) {
        match self {
            Self::Leaf(leaf) => leaves.push(leaf),
            Self::Topology(topology) => {
                for node in topology.nodes_mut() {
                    node.collect_leaves_mut(leaves);
                }
            }
        }
    }

    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Leaf(_) => 1,
            Self::Topology(topology) => topology.nodes.iter().map(Node::leaf_count).sum(),
        }
    }

    /// Total number of directed edges owned by the leaves below this node
    pub fn edge_count(&self) -> usize {
        self.flatten().iter().map(|leaf| leaf.edges().len()).sum()
    }

    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            Self::Leaf(leaf) => Some(leaf),
            Self::Topology(_) => None,
        }
    }

    pub fn as_topology(&self) -> Option<&Topology> {
        match self {
            Self::Topology(topology) => Some(topology),
            Self::Leaf(_) => None,
        }
    }
}

impl From<Leaf> for Node {
    fn from(leaf: Leaf) -> Self {
        Self::Leaf(leaf)
    }
}

impl From<Topology> for Node {
    fn from(topology: Topology) -> Self {
        Self::Topology(topology)
    }
}
