//! JSON encoding of topologies and traffic.

use std::io::Write;

use serde::Serialize;

use crate::model::Identified;
use crate::topology::types::{Bandwidth, Edge, LeafKind, Node};
use crate::traffic::types::{Arrival, Traffic};

#[derive(Serialize)]
#[serde(tag = "type")]
enum NodeDocument<'a> {
    Topology {
        id: &'a str,
        nodes: Vec<NodeDocument<'a>>,
    },
    Host {
        id: &'a str,
        edges: Vec<EdgeDocument<'a>>,
    },
    Switch {
        id: &'a str,
        edges: Vec<EdgeDocument<'a>>,
    },
}

#[derive(Serialize)]
struct EdgeDocument<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    id: &'a str,
    source: &'a str,
    destination: &'a str,
    bandwidth: Bandwidth,
}

#[derive(Serialize)]
struct TrafficDocument<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    id: &'a str,
    arrivals: Vec<ArrivalDocument<'a>>,
}

#[derive(Serialize)]
struct ArrivalDocument<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    id: &'a str,
    time: f64,
    source: &'a str,
    destination: &'a str,
    size: u32,
}

impl<'a> From<&'a Edge> for EdgeDocument<'a> {
    fn from(edge: &'a Edge) -> Self {
        Self {
            kind: "Edge",
            id: edge.id(),
            source: edge.source(),
            destination: edge.destination(),
            bandwidth: edge.bandwidth(),
        }
    }
}

impl<'a> From<&'a Node> for NodeDocument<'a> {
    fn from(node: &'a Node) -> Self {
        match node {
            Node::Topology(topology) => Self::Topology {
                id: topology.id(),
                nodes: topology.nodes().iter().map(NodeDocument::from).collect(),
            },
            Node::Leaf(leaf) => {
                let id = leaf.id();
                let edges = leaf.edges().iter().map(EdgeDocument::from).collect();
                match leaf.kind() {
                    LeafKind::Host => Self::Host { id, edges },
                    LeafKind::Switch => Self::Switch { id, edges },
                }
            }
        }
    }
}

impl<'a> From<&'a Arrival> for ArrivalDocument<'a> {
    fn from(arrival: &'a Arrival) -> Self {
        Self {
            kind: "Arrival",
            id: arrival.id(),
            time: arrival.time(),
            source: arrival.source(),
            destination: arrival.destination(),
            size: arrival.size(),
        }
    }
}

/// Pretty-printed JSON document for `node`
pub fn write_topology<W: Write + ?Sized>(node: &Node, writer: &mut W) -> std::io::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, &NodeDocument::from(node))?;
    writeln!(writer)
}

/// Pretty-printed JSON document for `traffic`
pub fn write_traffic<W: Write + ?Sized>(traffic: &Traffic, writer: &mut W) -> std::io::Result<()> {
    let document = TrafficDocument {
        kind: "Traffic",
        id: traffic.id(),
        arrivals: traffic.arrivals().iter().map(ArrivalDocument::from).collect(),
    };
    serde_json::to_writer_pretty(&mut *writer, &document)?;
    writeln!(writer)
}
