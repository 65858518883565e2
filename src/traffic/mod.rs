//! Network traffic module.
//!
//! This module contains the traffic trace model, reachability over a
//! topology and the random traffic generators.

pub mod types;
pub mod traversal;
pub mod generators;

// Re-export key types and functions for easier access
pub use types::{Arrival, Traffic, MAX_ARRIVAL_SIZE, MIN_ARRIVAL_SIZE};
pub use traversal::{Route, Traversal};
pub use generators::{TrafficGenerator, TrainSettings};
