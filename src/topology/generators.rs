//! Random topology generators.
//!
//! Both generators resolve the same three parameters (name, node count and
//! connectivity) and differ only in which pairs of leaves are candidates for
//! a link.

use log::info;
use rand::Rng;

use crate::error::ParameterError;
use crate::parameters::{Parameter, ParameterSource};
use crate::topology::connections::connect;
use crate::topology::types::{Leaf, Node, Topology};

pub const NAME: Parameter<String> = Parameter::new(
    "name",
    "the network name",
    "a string with length > 0 and < 30",
    |name| !name.is_empty() && name.len() < 30,
);

pub const NODE_COUNT: Parameter<usize> = Parameter::new(
    "node_count",
    "the number of nodes",
    "an integer with value >= 0 and < 100,000",
    |count| *count < 100_000,
);

pub const CONNECTIVITY: Parameter<f64> = Parameter::new(
    "connectivity",
    "the connectivity",
    "a float with value >= 0 and <= 1",
    |connectivity| (0.0..=1.0).contains(connectivity),
);

/// Resolved input shared by all topology generators
#[derive(Debug, Clone, PartialEq)]
pub struct TopologySettings {
    pub name: String,
    pub node_count: usize,
    /// Probability in [0, 1] that a candidate pair gets linked
    pub connectivity: f64,
}

impl TopologySettings {
    pub fn resolve<P: ParameterSource>(params: &mut P) -> Result<Self, ParameterError> {
        Ok(Self {
            name: params.resolve(&NAME)?,
            node_count: params.resolve(&NODE_COUNT)?,
            connectivity: params.resolve(&CONNECTIVITY)?,
        })
    }
}

/// Available topology generators
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TopologyGenerator {
    Mesh,
    Star,
}

impl TopologyGenerator {
    pub const ALL: [Self; 2] = [Self::Mesh, Self::Star];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Mesh => "mesh",
            Self::Star => "star",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Mesh => "Generates a topology in which hosts are directly connected to one another at a rate according to the connectivity",
            Self::Star => "Generates a topology in which all hosts are connected to the same switch at a rate according to the connectivity",
        }
    }

    /// Pick one of the generators uniformly
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    /// Resolve the settings from `params` and build a topology
    pub fn generate<P, R>(&self, params: &mut P, rng: &mut R) -> Result<Node, ParameterError>
    where
        P: ParameterSource,
        R: Rng + ?Sized,
    {
        let settings = TopologySettings::resolve(params)?;
        let node = match self {
            Self::Mesh => mesh(&settings, rng),
            Self::Star => star(&settings, rng),
        };

        info!(
            "Generated {} topology '{}' with {} leaves and {} edges",
            self.name(),
            node.id(),
            node.leaf_count(),
            node.edge_count()
        );
        Ok(node)
    }
}

fn hosts(settings: &TopologySettings) -> Vec<Node> {
    (0..settings.node_count)
        .map(|i| Node::from(Leaf::host(format!("{}-{}", settings.name, i))))
        .collect()
}

fn assemble(name: &str, nodes: Vec<Node>) -> Node {
    let mut topology = Topology::new(name);
    for node in nodes {
        topology.add_node(node);
    }
    Node::from(topology)
}

/// Hosts only; every unordered pair of hosts is a candidate link
pub fn mesh<R: Rng + ?Sized>(settings: &TopologySettings, rng: &mut R) -> Node {
    let mut leaves = hosts(settings);

    for i in 0..leaves.len() {
        let (head, tail) = leaves.split_at_mut(i + 1);
        let a = &mut head[i];
        for b in tail.iter_mut() {
            connect(a, b, settings.connectivity, None, rng);
        }
    }

    assemble(&settings.name, leaves)
}

/// One switch in the center; every host is a candidate link to it
pub fn star<R: Rng + ?Sized>(settings: &TopologySettings, rng: &mut R) -> Node {
    let mut center = Node::from(Leaf::switch(format!("{}-center", settings.name)));
    let mut leaves = hosts(settings);

    for host in leaves.iter_mut() {
        connect(&mut center, host, settings.connectivity, None, rng);
    }

    leaves.push(center);
    assemble(&settings.name, leaves)
}
