//! Traffic trace types.

use rand::Rng;

use crate::error::ExhaustedRouteError;
use crate::model::Identified;
use crate::traffic::traversal::Traversal;

/// Smallest generated message size in bytes
pub const MIN_ARRIVAL_SIZE: u32 = 512;
/// Largest generated message size in bytes
pub const MAX_ARRIVAL_SIZE: u32 = 1500;

/// A message entering the network at a point in simulation time
#[derive(Debug, Clone, PartialEq)]
pub struct Arrival {
    id: String,
    /// Simulation time in seconds
    time: f64,
    source: String,
    destination: String,
    /// Message size in bytes
    size: u32,
}

impl Arrival {
    pub fn new(time: f64, source: &str, destination: &str, size: u32) -> Self {
        Self {
            // Whole times keep their fraction ("2.0"), matching documents from other tools
            id: format!("{:?}_{}_{}_{}", time, source, destination, size),
            time,
            source: source.to_string(),
            destination: destination.to_string(),
            size,
        }
    }

    /// Arrival with a size drawn uniformly from typical TCP/IP packet sizes
    pub fn with_random_size<R: Rng + ?Sized>(
        time: f64,
        source: &str,
        destination: &str,
        rng: &mut R,
    ) -> Self {
        let size = rng.gen_range(MIN_ARRIVAL_SIZE..=MAX_ARRIVAL_SIZE);
        Self::new(time, source, destination, size)
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn size(&self) -> u32 {
        self.size
    }
}

impl Identified for Arrival {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Named, insertion-ordered collection of arrivals
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Traffic {
    id: String,
    arrivals: Vec<Arrival>,
}

impl Traffic {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            arrivals: Vec::new(),
        }
    }

    pub fn add_arrival(&mut self, arrival: Arrival) {
        self.arrivals.push(arrival);
    }

    /// Add an arrival at `time` over a freshly sampled route
    pub fn add_random_arrival<R: Rng + ?Sized>(
        &mut self,
        traversal: &Traversal<'_>,
        time: f64,
        rng: &mut R,
    ) -> Result<(), ExhaustedRouteError> {
        let route = traversal.get_random_route(rng)?;
        let arrival = Arrival::with_random_size(
            time,
            route.source().id(),
            route.destination().id(),
            rng,
        );
        self.add_arrival(arrival);
        Ok(())
    }

    pub fn arrivals(&self) -> &[Arrival] {
        &self.arrivals
    }

    pub fn len(&self) -> usize {
        self.arrivals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrivals.is_empty()
    }
}

impl Identified for Traffic {
    fn id(&self) -> &str {
        &self.id
    }
}
