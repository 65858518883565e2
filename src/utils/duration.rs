//! Duration parsing utilities.
//!
//! Simulation durations are fractional seconds. On input they may carry a
//! unit suffix (e.g. "90", "1.5m", "2h").

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

fn duration_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^(?P<value>\d+(?:\.\d*)?(?:[eE][+-]?\d+)?|\.\d+)\s*(?P<unit>[a-zA-Z]*)$",
        )
        .expect("duration pattern is valid")
    })
}

/// Parse a duration string (e.g. "5h", "30m", "1800s", "12.5") to seconds
///
/// Supported units:
/// - Seconds: no suffix, "s", "sec", "secs", "second", "seconds"
/// - Minutes: "m", "min", "mins", "minute", "minutes"
/// - Hours: "h", "hr", "hrs", "hour", "hours"
///
/// # Examples
/// ```
/// use nsim::utils::duration::parse_duration_to_seconds;
///
/// assert_eq!(parse_duration_to_seconds("1800"), Ok(1800.0));
/// assert_eq!(parse_duration_to_seconds("1.5m"), Ok(90.0));
/// assert_eq!(parse_duration_to_seconds("5h"), Ok(18000.0));
/// assert!(parse_duration_to_seconds("invalid").is_err());
/// ```
pub fn parse_duration_to_seconds(duration: &str) -> Result<f64, String> {
    let duration = duration.trim();
    let captures = duration_pattern()
        .captures(duration)
        .ok_or_else(|| format!("Invalid duration format: {}", duration))?;

    let value: f64 = captures["value"]
        .parse()
        .map_err(|_| format!("Invalid duration value: {}", duration))?;

    let multiplier = match captures["unit"].to_ascii_lowercase().as_str() {
        "" | "s" | "sec" | "secs" | "second" | "seconds" => 1.0,
        "m" | "min" | "mins" | "minute" | "minutes" => 60.0,
        "h" | "hr" | "hrs" | "hour" | "hours" => 3600.0,
        unit => return Err(format!("Invalid duration unit '{}' in: {}", unit, duration)),
    };

    Ok(value * multiplier)
}

/// Non-negative, finite span of simulation time in seconds
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct SimDuration(f64);

impl SimDuration {
    pub fn from_seconds(seconds: f64) -> Option<Self> {
        (seconds.is_finite() && seconds >= 0.0).then_some(Self(seconds))
    }

    pub fn seconds(&self) -> f64 {
        self.0
    }
}

impl FromStr for SimDuration {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let seconds = parse_duration_to_seconds(s)?;
        Self::from_seconds(seconds).ok_or_else(|| format!("Duration out of range: {}", s))
    }
}

impl fmt::Display for SimDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_seconds() {
        assert_eq!(parse_duration_to_seconds("1800"), Ok(1800.0));
        assert_eq!(parse_duration_to_seconds("0"), Ok(0.0));
        assert_eq!(parse_duration_to_seconds("12.5"), Ok(12.5));
        assert_eq!(parse_duration_to_seconds(".5"), Ok(0.5));
        assert_eq!(parse_duration_to_seconds("1e3"), Ok(1000.0));

        assert_eq!(parse_duration_to_seconds("1800s"), Ok(1800.0));
        assert_eq!(parse_duration_to_seconds("1800 sec"), Ok(1800.0));
        assert_eq!(parse_duration_to_seconds("1800seconds"), Ok(1800.0));

        assert_eq!(parse_duration_to_seconds("30m"), Ok(1800.0));
        assert_eq!(parse_duration_to_seconds("30min"), Ok(1800.0));
        assert_eq!(parse_duration_to_seconds("1.5minutes"), Ok(90.0));

        assert_eq!(parse_duration_to_seconds("5h"), Ok(18000.0));
        assert_eq!(parse_duration_to_seconds("5HR"), Ok(18000.0));
        assert_eq!(parse_duration_to_seconds("5hours"), Ok(18000.0));

        assert!(parse_duration_to_seconds("").is_err());
        assert!(parse_duration_to_seconds("invalid").is_err());
        assert!(parse_duration_to_seconds("5x").is_err());
        assert!(parse_duration_to_seconds("-5").is_err());
        assert!(parse_duration_to_seconds("5minutesx").is_err());
    }

    #[test]
    fn test_sim_duration() {
        assert_eq!("10".parse::<SimDuration>().unwrap().seconds(), 10.0);
        assert_eq!("2m".parse::<SimDuration>().unwrap().seconds(), 120.0);
        assert!("abc".parse::<SimDuration>().is_err());
        assert!(SimDuration::from_seconds(f64::INFINITY).is_none());
        assert!(SimDuration::from_seconds(-1.0).is_none());
    }
}
