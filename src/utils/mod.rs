//! Shared utilities: duration parsing and generator option handling.

pub mod duration;
pub mod options;

pub use duration::{parse_duration_to_seconds, SimDuration};
pub use options::{merge_options, parse_inline_options};
