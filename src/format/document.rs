//! Format independent decoding of topology and traffic documents.
//!
//! Both the JSON value tree and the XML element tree implement
//! [`DocumentNode`], so the decoding rules below are shared by every input
//! format. Topologies are decoded in two passes: the first registers every
//! leaf id, the second rebuilds the graph and resolves edge destinations
//! against those ids.

use std::collections::HashMap;
use std::str::FromStr;

use log::{debug, warn};
use serde_json::Value;

use crate::error::DocumentError;
use crate::format::xml::Element;
use crate::model::Identified;
use crate::topology::types::{Leaf, LeafKind, Node, Topology};
use crate::traffic::types::{Arrival, Traffic};

/// Read access to one node of a parsed document
pub trait DocumentNode {
    /// Type tag of the node, e.g. `Topology` or `host`
    fn tag(&self) -> Option<&str>;

    /// A string valued field
    fn text(&self, key: &str) -> Option<&str>;

    /// A numeric field rendered as text
    fn number(&self, key: &str) -> Option<String>;

    /// Child items stored under `key`
    fn items(&self, key: &str) -> Option<Vec<&Self>>;
}

impl DocumentNode for Value {
    fn tag(&self) -> Option<&str> {
        self.get("type")?.as_str()
    }

    fn text(&self, key: &str) -> Option<&str> {
        self.get(key)?.as_str()
    }

    fn number(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::Number(number) => Some(number.to_string()),
            _ => None,
        }
    }

    fn items(&self, key: &str) -> Option<Vec<&Self>> {
        Some(self.get(key)?.as_array()?.iter().collect())
    }
}

/// XML carries the type in the tag name, scalars in attributes and every
/// child item as a nested element whatever the key.
impl DocumentNode for Element {
    fn tag(&self) -> Option<&str> {
        Some(self.name())
    }

    fn text(&self, key: &str) -> Option<&str> {
        self.attribute(key)
    }

    fn number(&self, key: &str) -> Option<String> {
        self.attribute(key).map(str::to_string)
    }

    fn items(&self, _key: &str) -> Option<Vec<&Self>> {
        Some(self.children().iter().collect())
    }
}

/// Recognised type tags, matched case-insensitively
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Topology,
    Host,
    Switch,
    Edge,
    Traffic,
    Arrival,
}

impl Tag {
    fn of<D: DocumentNode>(doc: &D) -> Result<Self, DocumentError> {
        let tag = doc
            .tag()
            .ok_or_else(|| DocumentError::Validation("Item is missing its type".to_string()))?;

        match tag.to_ascii_lowercase().as_str() {
            "topology" => Ok(Self::Topology),
            "host" => Ok(Self::Host),
            "switch" => Ok(Self::Switch),
            "edge" => Ok(Self::Edge),
            "traffic" => Ok(Self::Traffic),
            "arrival" => Ok(Self::Arrival),
            _ => Err(DocumentError::UnsupportedType(tag.to_string())),
        }
    }
}

fn required_text<'d, D: DocumentNode>(doc: &'d D, key: &str) -> Result<&'d str, DocumentError> {
    doc.text(key).ok_or_else(|| {
        DocumentError::Validation(format!("Key `{}` is missing or not a string", key))
    })
}

fn required_number<D: DocumentNode, T: FromStr>(doc: &D, key: &str) -> Result<T, DocumentError> {
    let raw = doc.number(key).ok_or_else(|| {
        DocumentError::Validation(format!("Key `{}` is missing or not a number", key))
    })?;
    raw.trim().parse::<T>().map_err(|_| {
        DocumentError::Validation(format!("Key `{}` has invalid value: {}", key, raw))
    })
}

fn required_items<'d, D: DocumentNode>(doc: &'d D, key: &str) -> Result<Vec<&'d D>, DocumentError> {
    doc.items(key).ok_or_else(|| {
        DocumentError::Validation(format!("Key `{}` is missing or not a list", key))
    })
}

fn expect_tag<D: DocumentNode>(doc: &D, expected: Tag) -> Result<(), DocumentError> {
    let tag = Tag::of(doc)?;
    if tag != expected {
        return Err(DocumentError::UnsupportedType(
            doc.tag().unwrap_or_default().to_string(),
        ));
    }
    Ok(())
}

/// Warn when a stored id disagrees with the id derived from the fields
fn check_derived_id<D: DocumentNode>(doc: &D, derived: &str) {
    if let Some(stored) = doc.text("id") {
        if stored != derived {
            warn!("Stored id '{}' differs from derived id '{}'", stored, derived);
        }
    }
}

/// Decode a topology document into a node tree
pub fn decode_topology<D: DocumentNode>(doc: &D) -> Result<Node, DocumentError> {
    let mut leaves = HashMap::new();
    scan_leaves(doc, &mut leaves)?;
    debug!("Registered {} leaf declarations", leaves.len());

    build_node(doc, &leaves)
}

/// First pass: register every leaf declaration by id
fn scan_leaves<D: DocumentNode>(
    doc: &D,
    leaves: &mut HashMap<String, LeafKind>,
) -> Result<(), DocumentError> {
    match Tag::of(doc)? {
        Tag::Topology => {
            for child in required_items(doc, "nodes")? {
                scan_leaves(child, leaves)?;
            }
        }
        tag @ (Tag::Host | Tag::Switch) => {
            let id = required_text(doc, "id")?;
            let kind = if tag == Tag::Host { LeafKind::Host } else { LeafKind::Switch };
            if leaves.insert(id.to_string(), kind).is_some() {
                return Err(DocumentError::Validation(format!(
                    "Leaf id '{}' is declared more than once",
                    id
                )));
            }
        }
        _ => {
            return Err(DocumentError::UnsupportedType(
                doc.tag().unwrap_or_default().to_string(),
            ))
        }
    }
    Ok(())
}

/// Second pass: rebuild the tree, resolving edge destinations
fn build_node<D: DocumentNode>(
    doc: &D,
    leaves: &HashMap<String, LeafKind>,
) -> Result<Node, DocumentError> {
    match Tag::of(doc)? {
        Tag::Topology => {
            let mut topology = Topology::new(required_text(doc, "id")?);
            for child in required_items(doc, "nodes")? {
                topology.add_node(build_node(child, leaves)?);
            }
            Ok(Node::Topology(topology))
        }
        tag @ (Tag::Host | Tag::Switch) => {
            let kind = if tag == Tag::Host { LeafKind::Host } else { LeafKind::Switch };
            let mut leaf = Leaf::new(required_text(doc, "id")?, kind);
            for edge in required_items(doc, "edges")? {
                decode_edge(edge, &mut leaf, leaves)?;
            }
            Ok(Node::Leaf(leaf))
        }
        _ => Err(DocumentError::UnsupportedType(
            doc.tag().unwrap_or_default().to_string(),
        )),
    }
}

fn decode_edge<D: DocumentNode>(
    doc: &D,
    leaf: &mut Leaf,
    leaves: &HashMap<String, LeafKind>,
) -> Result<(), DocumentError> {
    expect_tag(doc, Tag::Edge)?;

    let source = required_text(doc, "source")?;
    let destination = required_text(doc, "destination")?;
    let bandwidth: u64 = required_number(doc, "bandwidth")?;

    if source != leaf.id() {
        return Err(DocumentError::Validation(format!(
            "Edge source '{}' does not match its owning leaf '{}'",
            source,
            leaf.id()
        )));
    }
    if !leaves.contains_key(destination) {
        return Err(DocumentError::Reference {
            edge: doc.text("id").unwrap_or_default().to_string(),
            destination: destination.to_string(),
        });
    }

    leaf.add_edge(destination, bandwidth);
    if let Some(edge) = leaf.edges().last() {
        check_derived_id(doc, edge.id());
    }
    Ok(())
}

/// Decode a traffic document
pub fn decode_traffic<D: DocumentNode>(doc: &D) -> Result<Traffic, DocumentError> {
    expect_tag(doc, Tag::Traffic)?;

    let mut traffic = Traffic::new(required_text(doc, "id")?);
    for item in required_items(doc, "arrivals")? {
        traffic.add_arrival(decode_arrival(item)?);
    }
    debug!("Decoded traffic '{}' with {} arrivals", traffic.id(), traffic.len());
    Ok(traffic)
}

fn decode_arrival<D: DocumentNode>(doc: &D) -> Result<Arrival, DocumentError> {
    expect_tag(doc, Tag::Arrival)?;

    let time: f64 = required_number(doc, "time")?;
    if !time.is_finite() || time < 0.0 {
        return Err(DocumentError::Validation(format!(
            "Arrival time must be a finite number >= 0, found {}",
            time
        )));
    }
    let source = required_text(doc, "source")?;
    let destination = required_text(doc, "destination")?;
    let size: u32 = required_number(doc, "size")?;

    let arrival = Arrival::new(time, source, destination, size);
    check_derived_id(doc, arrival.id());
    Ok(arrival)
}
