//! Human readable tree output.

use std::collections::HashMap;
use std::io::Write;

use crate::model::Identified;
use crate::topology::types::{Bandwidth, Leaf, LeafKind, Node};
use crate::traffic::types::Traffic;

/// Render a bandwidth as whole Mbps below 1 Gbps and whole Gbps above
pub fn format_bandwidth(bandwidth: Bandwidth) -> String {
    if bandwidth < 1_000_000_000 {
        format!("{:.0} Mbps", bandwidth as f64 / 1e6)
    } else {
        format!("{:.0} Gbps", bandwidth as f64 / 1e9)
    }
}

fn print_line<W: Write + ?Sized>(
    writer: &mut W,
    depth: usize,
    item_type: &str,
    item_id: &str,
    message: &str,
) -> std::io::Result<()> {
    let indent = "  ".repeat(depth);
    if message.is_empty() {
        writeln!(writer, "{}- [{}] {}", indent, item_type, item_id)
    } else {
        writeln!(writer, "{}- [{}] {} {}", indent, item_type, item_id, message)
    }
}

pub fn write_topology<W: Write + ?Sized>(node: &Node, writer: &mut W) -> std::io::Result<()> {
    let kinds: HashMap<&str, LeafKind> = node
        .flatten()
        .into_iter()
        .map(|leaf| (leaf.id(), leaf.kind()))
        .collect();
    write_node(node, &kinds, writer, 0)
}

fn write_node<W: Write + ?Sized>(
    node: &Node,
    kinds: &HashMap<&str, LeafKind>,
    writer: &mut W,
    depth: usize,
) -> std::io::Result<()> {
    match node {
        Node::Leaf(leaf) => write_leaf(leaf, kinds, writer, depth),
        Node::Topology(topology) => {
            if topology.nodes().is_empty() {
                return print_line(writer, depth, "Topology", topology.id(), "has no nodes.");
            }
            print_line(writer, depth, "Topology", topology.id(), "has nodes:")?;
            for child in topology.nodes() {
                write_node(child, kinds, writer, depth + 1)?;
            }
            Ok(())
        }
    }
}

fn write_leaf<W: Write + ?Sized>(
    leaf: &Leaf,
    kinds: &HashMap<&str, LeafKind>,
    writer: &mut W,
    depth: usize,
) -> std::io::Result<()> {
    let kind = leaf.kind().name();
    if leaf.edges().is_empty() {
        return print_line(writer, depth, kind, leaf.id(), "has no edges.");
    }

    print_line(writer, depth, kind, leaf.id(), "has edges to:")?;
    for edge in leaf.edges() {
        // Destinations outside the printed subtree have no known kind
        let destination_kind = kinds
            .get(edge.destination())
            .map_or("Leaf", |kind| kind.name());
        let bandwidth = format!("({})", format_bandwidth(edge.bandwidth()));
        print_line(writer, depth + 1, destination_kind, edge.destination(), &bandwidth)?;
    }
    Ok(())
}

pub fn write_traffic<W: Write + ?Sized>(traffic: &Traffic, writer: &mut W) -> std::io::Result<()> {
    if traffic.is_empty() {
        return print_line(writer, 0, "Traffic", traffic.id(), "has no traffic");
    }

    print_line(writer, 0, "Traffic", traffic.id(), "has arrivals:")?;
    for arrival in traffic.arrivals() {
        print_line(writer, 1, "Arrival", arrival.id(), "")?;
    }
    Ok(())
}
