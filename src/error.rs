//! Error types shared across the crate.
//!
//! Document decoding, parameter resolution and route sampling each have their
//! own error enum so callers can tell a malformed input file apart from a
//! topology that simply has no routes.

use std::path::PathBuf;

/// Errors raised while reading or decoding a topology or traffic document
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// A required field is missing or has the wrong type
    #[error("Validation error: {0}")]
    Validation(String),

    /// An edge points at a leaf that was never declared
    #[error("Reference error: edge '{edge}' points to undeclared leaf '{destination}'")]
    Reference { edge: String, destination: String },

    /// A node or item carries a type tag that is not recognised
    #[error("Unsupported type '{0}'")]
    UnsupportedType(String),

    /// The source file is not a recognised or parseable document
    #[error("Input format error: {0}")]
    InputFormat(String),

    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write document: {0}")]
    Write(#[from] std::io::Error),

    /// The requested output type cannot represent this kind of document
    #[error("Output type '{output}' does not support {document} documents")]
    UnsupportedOutput {
        output: &'static str,
        document: &'static str,
    },
}

/// Errors raised while resolving a generator parameter
#[derive(Debug, thiserror::Error)]
pub enum ParameterError {
    #[error("Missing value for '{key}'")]
    Missing { key: String },

    #[error("Value for '{key}' is not a scalar: {value}")]
    NotScalar { key: String, value: String },

    #[error("Could not parse '{value}' for '{key}', expected {constraint}")]
    Unparseable {
        key: String,
        value: String,
        constraint: String,
    },

    #[error("Value '{value}' for '{key}' is invalid, expected {constraint}")]
    Constraint {
        key: String,
        value: String,
        constraint: String,
    },

    #[error("Input closed while waiting for '{key}'")]
    InputClosed { key: String },

    #[error("Failed to prompt for '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

/// Raised when no leaf of a topology can reach any other leaf
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Topology '{topology}' has no valid routes")]
pub struct ExhaustedRouteError {
    pub topology: String,
}

/// Errors raised by the traffic generators
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error(transparent)]
    Parameter(#[from] ParameterError),

    #[error(transparent)]
    ExhaustedRoute(#[from] ExhaustedRouteError),
}
