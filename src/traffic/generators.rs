//! Random traffic generators.
//!
//! Every generator walks a simulation clock forward from zero and emits
//! arrivals over routes sampled from a [`Traversal`] until the clock passes
//! the requested duration. An arrival exactly at the duration is kept.

use log::info;
use rand::Rng;

use crate::error::{ExhaustedRouteError, GenerateError};
use crate::model::Identified;
use crate::parameters::{Parameter, ParameterSource};
use crate::topology::types::Node;
use crate::traffic::traversal::Traversal;
use crate::traffic::types::{Arrival, Traffic};
use crate::utils::duration::SimDuration;

pub const DURATION: Parameter<SimDuration> = Parameter::new(
    "duration",
    "the duration of the traffic in simulation seconds",
    "a number of seconds >= 0, optionally suffixed with s, m or h",
    |_| true,
);

pub const RATE: Parameter<f64> = Parameter::new(
    "rate",
    "the fixed time in simulation seconds between consecutive arrivals",
    "a float with value > 0",
    |rate| rate.is_finite() && *rate > 0.0,
);

pub const LAMBDA: Parameter<f64> = Parameter::new(
    "lambda",
    "the mean rate at which arrivals occur per second",
    "a float with value > 0",
    |lambda| lambda.is_finite() && *lambda > 0.0,
);

pub const INTER_TRAIN_TIME: Parameter<f64> = Parameter::new(
    "inter_train_time",
    "the average time in simulation seconds between the starts of consecutive packet trains",
    "a float with value > 0",
    |time| time.is_finite() && *time > 0.0,
);

pub const INTER_CAR_TIME: Parameter<f64> = Parameter::new(
    "inter_car_time",
    "the average time in simulation seconds between packets within a train",
    "a float with value >= 0",
    |time| time.is_finite() && *time >= 0.0,
);

pub const MAX_TRAIN_LENGTH: Parameter<usize> = Parameter::new(
    "max_train_length",
    "the maximum number of packets in a train",
    "an integer with value >= 1",
    |length| *length >= 1,
);

/// Shape of the packet trains emitted by [`train`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainSettings {
    /// Mean gap between the last car of a train and the next train
    pub inter_train_time: f64,
    /// Mean gap between consecutive cars of one train
    pub inter_car_time: f64,
    pub max_train_length: usize,
}

/// Available traffic generators
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TrafficGenerator {
    Constant,
    Poisson,
    Train,
}

impl TrafficGenerator {
    pub const ALL: [Self; 3] = [Self::Constant, Self::Poisson, Self::Train];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Constant => "constant",
            Self::Poisson => "poisson",
            Self::Train => "train",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Constant => "Generates network traffic with a constant arrival pattern",
            Self::Poisson => "Generates network traffic with exponentially distributed gaps between arrivals",
            Self::Train => "Generates network traffic where arrivals are grouped into trains with a common source and destination",
        }
    }

    /// Pick one of the generators uniformly
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    /// Resolve the parameters from `params` and generate traffic over `node`
    pub fn generate<P, R>(&self, node: &Node, params: &mut P, rng: &mut R) -> Result<Traffic, GenerateError>
    where
        P: ParameterSource,
        R: Rng + ?Sized,
    {
        let duration = params.resolve(&DURATION)?.seconds();

        let traffic = match self {
            Self::Constant => {
                let rate = params.resolve(&RATE)?;
                constant(node, duration, rate, rng)?
            }
            Self::Poisson => {
                let lambda = params.resolve(&LAMBDA)?;
                poisson(node, duration, lambda, rng)?
            }
            Self::Train => {
                let settings = TrainSettings {
                    inter_train_time: params.resolve(&INTER_TRAIN_TIME)?,
                    inter_car_time: params.resolve(&INTER_CAR_TIME)?,
                    max_train_length: params.resolve(&MAX_TRAIN_LENGTH)?,
                };
                train(node, duration, &settings, rng)?
            }
        };

        info!(
            "Generated {} traffic '{}' with {} arrivals over {}s",
            self.name(),
            traffic.id(),
            traffic.len(),
            duration
        );
        Ok(traffic)
    }
}

fn traffic_for(node: &Node) -> Traffic {
    Traffic::new(format!("{}-traffic", node.id()))
}

/// Exponentially distributed gap with the given mean (inverse transform)
fn exponential_gap<R: Rng + ?Sized>(mean: f64, rng: &mut R) -> f64 {
    let u: f64 = rng.gen();
    -mean * (1.0 - u).ln()
}

/// Arrivals at fixed intervals of `rate` seconds, the first at `rate`
pub fn constant<R: Rng + ?Sized>(
    node: &Node,
    duration: f64,
    rate: f64,
    rng: &mut R,
) -> Result<Traffic, ExhaustedRouteError> {
    let mut traffic = traffic_for(node);
    let traversal = Traversal::new(node);

    // Multiply instead of accumulating so long runs do not drift past the boundary
    let mut tick: u64 = 1;
    loop {
        let time = rate * tick as f64;
        if time > duration {
            break;
        }
        traffic.add_random_arrival(&traversal, time, rng)?;
        tick += 1;
    }

    Ok(traffic)
}

/// Poisson arrival process with mean rate `lambda` per second
pub fn poisson<R: Rng + ?Sized>(
    node: &Node,
    duration: f64,
    lambda: f64,
    rng: &mut R,
) -> Result<Traffic, ExhaustedRouteError> {
    let mut traffic = traffic_for(node);
    let traversal = Traversal::new(node);
    let mean_gap = 1.0 / lambda;

    let mut time = exponential_gap(mean_gap, rng);
    while time <= duration {
        traffic.add_random_arrival(&traversal, time, rng)?;
        time += exponential_gap(mean_gap, rng);
    }

    Ok(traffic)
}

/// Packet trains: each train samples one route and emits 1 to
/// `max_train_length` cars over it.
///
/// Cars past `duration` are dropped. The next train starts an exponential
/// gap after the last car that was actually emitted, so arrivals stay in
/// time order.
pub fn train<R: Rng + ?Sized>(
    node: &Node,
    duration: f64,
    settings: &TrainSettings,
    rng: &mut R,
) -> Result<Traffic, ExhaustedRouteError> {
    let mut traffic = traffic_for(node);
    let traversal = Traversal::new(node);

    let mut start = exponential_gap(settings.inter_train_time, rng);
    while start <= duration {
        let cars = next_train(&traversal, start, duration, settings, rng)?;
        let last_emitted = cars.last().map_or(start, Arrival::time);
        for car in cars {
            traffic.add_arrival(car);
        }

        start = last_emitted + exponential_gap(settings.inter_train_time, rng);
    }

    Ok(traffic)
}

/// Cars of one train starting at `start`, all over the same route
fn next_train<R: Rng + ?Sized>(
    traversal: &Traversal<'_>,
    start: f64,
    duration: f64,
    settings: &TrainSettings,
    rng: &mut R,
) -> Result<Vec<Arrival>, ExhaustedRouteError> {
    let route = traversal.get_random_route(rng)?;
    let source = route.source().id();
    let destination = route.destination().id();
    let length = rng.gen_range(1..=settings.max_train_length);

    // `length` may be huge, the duration bounds how many cars are pushed
    let mut cars = Vec::new();
    let mut time = start;
    for car in 0..length {
        if car > 0 {
            time += exponential_gap(settings.inter_car_time, rng);
        }
        if time > duration {
            break;
        }
        cars.push(Arrival::with_random_size(time, source, destination, rng));
    }

    Ok(cars)
}
