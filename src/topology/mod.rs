//! Network topology module.
//!
//! This module contains the topology graph model, link creation between
//! nodes and the random topology generators.

pub mod types;
pub mod connections;
pub mod generators;

// Re-export key types and functions for easier access
pub use types::{Bandwidth, Edge, Leaf, LeafKind, Node, Topology, BANDWIDTHS};
pub use connections::connect;
pub use generators::{TopologyGenerator, TopologySettings};
