//! Generator parameter resolution.
//!
//! Generators describe each value they need with a [`Parameter`] and ask a
//! [`ParameterSource`] for it. [`OptionsSource`] only looks at the options
//! object and fails on anything missing or invalid, which is what library
//! callers want. [`PromptSource`] falls back to asking on a terminal and keeps
//! asking until the answer parses and validates.

use std::fmt::Debug;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

use log::{debug, warn};
use serde_json::Value;

use crate::error::ParameterError;

/// Options object passed to a generator, keyed by parameter name
pub type GeneratorOptions = serde_json::Map<String, Value>;

/// Description of one value a generator needs
#[derive(Debug, Clone, Copy)]
pub struct Parameter<T> {
    /// Key looked up in the options object
    pub key: &'static str,
    /// What the value means, shown when prompting
    pub description: &'static str,
    /// Human-readable form of `validate`
    pub constraint: &'static str,
    pub validate: fn(&T) -> bool,
}

impl<T: FromStr> Parameter<T> {
    pub const fn new(
        key: &'static str,
        description: &'static str,
        constraint: &'static str,
        validate: fn(&T) -> bool,
    ) -> Self {
        Self {
            key,
            description,
            constraint,
            validate,
        }
    }

    /// Parse `raw` and check it against the constraint
    pub fn parse(&self, raw: &str) -> Result<T, ParameterError> {
        let raw = raw.trim();
        let value = raw.parse::<T>().map_err(|_| ParameterError::Unparseable {
            key: self.key.to_string(),
            value: raw.to_string(),
            constraint: self.constraint.to_string(),
        })?;

        if !(self.validate)(&value) {
            return Err(ParameterError::Constraint {
                key: self.key.to_string(),
                value: raw.to_string(),
                constraint: self.constraint.to_string(),
            });
        }

        Ok(value)
    }
}

/// Strategy for resolving generator parameters
pub trait ParameterSource {
    fn resolve<T>(&mut self, parameter: &Parameter<T>) -> Result<T, ParameterError>
    where
        T: FromStr + Debug;
}

/// Read the raw text for `key` from an options object.
///
/// Strings are used as-is; numbers and booleans are converted to their
/// textual form so `{"node_count": 5}` and `{"node_count": "5"}` agree.
fn option_text(options: &GeneratorOptions, key: &str) -> Result<String, ParameterError> {
    match options.get(key) {
        None | Some(Value::Null) => Err(ParameterError::Missing {
            key: key.to_string(),
        }),
        Some(Value::String(text)) => Ok(text.clone()),
        Some(Value::Number(number)) => Ok(number.to_string()),
        Some(Value::Bool(flag)) => Ok(flag.to_string()),
        Some(other) => Err(ParameterError::NotScalar {
            key: key.to_string(),
            value: other.to_string(),
        }),
    }
}

fn resolve_option<T>(options: &GeneratorOptions, parameter: &Parameter<T>) -> Result<T, ParameterError>
where
    T: FromStr + Debug,
{
    let text = option_text(options, parameter.key)?;
    let value = parameter.parse(&text)?;
    debug!("Set {} to {:?}", parameter.key, value);
    Ok(value)
}

/// Resolves parameters from an options object only
#[derive(Debug, Clone, Default)]
pub struct OptionsSource {
    options: GeneratorOptions,
}

impl OptionsSource {
    pub fn new(options: GeneratorOptions) -> Self {
        Self { options }
    }
}

impl ParameterSource for OptionsSource {
    fn resolve<T>(&mut self, parameter: &Parameter<T>) -> Result<T, ParameterError>
    where
        T: FromStr + Debug,
    {
        resolve_option(&self.options, parameter)
    }
}

/// Resolves parameters from an options object, prompting for whatever is
/// missing or invalid
pub struct PromptSource<I, O> {
    options: GeneratorOptions,
    input: I,
    output: O,
}

impl PromptSource<io::StdinLock<'static>, io::Stderr> {
    /// Prompt on stderr so generated documents on stdout stay clean
    pub fn terminal(options: GeneratorOptions) -> Self {
        Self::new(options, io::stdin().lock(), io::stderr())
    }
}

impl<I: BufRead, O: Write> PromptSource<I, O> {
    pub fn new(options: GeneratorOptions, input: I, output: O) -> Self {
        Self {
            options,
            input,
            output,
        }
    }

    fn prompt<T>(&mut self, parameter: &Parameter<T>) -> Result<T, ParameterError>
    where
        T: FromStr + Debug,
    {
        let io_error = |source| ParameterError::Io {
            key: parameter.key.to_string(),
            source,
        };

        loop {
            write!(
                self.output,
                "Please enter {} ({}): ",
                parameter.description, parameter.constraint
            )
            .map_err(io_error)?;
            self.output.flush().map_err(io_error)?;

            let mut line = String::new();
            let read = self.input.read_line(&mut line).map_err(io_error)?;
            if read == 0 {
                return Err(ParameterError::InputClosed {
                    key: parameter.key.to_string(),
                });
            }

            match parameter.parse(&line) {
                Ok(value) => {
                    debug!("Set {} to {:?}", parameter.key, value);
                    return Ok(value);
                }
                Err(e) => warn!("{}", e),
            }
        }
    }
}

impl<I: BufRead, O: Write> ParameterSource for PromptSource<I, O> {
    fn resolve<T>(&mut self, parameter: &Parameter<T>) -> Result<T, ParameterError>
    where
        T: FromStr + Debug,
    {
        match resolve_option(&self.options, parameter) {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!("{}, asking interactively", e);
                self.prompt(parameter)
            }
        }
    }
}
