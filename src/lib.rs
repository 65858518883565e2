//! # nsim - Network topology and traffic synthesis for network simulators
//!
//! This library generates synthetic network topologies and traffic traces,
//! and converts them between the document formats that simulators consume.
//!
//! ## Overview
//!
//! A topology is a tree of nodes whose leaves are hosts and switches joined
//! by directed, bandwidth-weighted edges. Traffic is a list of arrivals,
//! each one message sent between two leaves at a point in simulation time.
//! Traffic is only ever generated over routes that the topology's edges can
//! actually carry.
//!
//! ## Key Features
//!
//! - **Topology Generators**: Mesh (host to host) and Star (hosts around a switch)
//! - **Traffic Generators**: Constant rate, Poisson and packet trains
//! - **Reachability**: Directed reachability index used for route sampling
//! - **Formats**: JSON and XML in and out, console trees, OMNeT++/INET export
//! - **Reproducible**: Every random choice draws from one injected generator
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - `topology`: Graph model, link creation and topology generators
//! - `traffic`: Arrival model, traversal engine and traffic generators
//! - `parameters`: Generator parameter descriptors and sources
//! - `format`: Document decoding and output writers
//! - `config`: Runtime configuration of the command line tool
//! - `config_loader`: Generator options files
//! - `error`: Error types shared across the crate
//! - `utils`: Duration parsing and option merging
//!
//! ## Example Usage
//!
//! ```rust
//! use nsim::format::{self, OutputType};
//! use nsim::parameters::OptionsSource;
//! use nsim::topology::TopologyGenerator;
//! use nsim::traffic::TrafficGenerator;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use serde_json::json;
//!
//! let options = json!({
//!     "name": "lab",
//!     "node_count": 4,
//!     "connectivity": 1.0,
//!     "duration": "10s",
//!     "rate": 2
//! });
//! let mut params = OptionsSource::new(options.as_object().cloned().unwrap_or_default());
//! let mut rng = StdRng::seed_from_u64(7);
//!
//! // Fully connected mesh of four hosts
//! let topology = TopologyGenerator::Mesh.generate(&mut params, &mut rng)?;
//! assert_eq!(topology.edge_count(), 12);
//!
//! // One arrival every two seconds for ten seconds
//! let traffic = TrafficGenerator::Constant.generate(&topology, &mut params, &mut rng)?;
//! assert_eq!(traffic.len(), 5);
//!
//! let mut document = Vec::new();
//! format::write_topology(&topology, OutputType::Json, &mut document)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Error Handling
//!
//! Library functions return typed errors defined with `thiserror`: document
//! problems, parameter problems and topologies without any route are kept
//! apart. The command line tool reports them through `color_eyre`.

pub mod config;
pub mod config_loader;
pub mod error;
pub mod format;
pub mod model;
pub mod parameters;
pub mod topology;
pub mod traffic;
pub mod utils;
