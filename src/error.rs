//! Error types for the sparsepool crate.
//!
//! This module provides a unified error type for every fallible operation in
//! the spatial pooler, using the `thiserror` crate for ergonomic error handling.
//!
//! Errors fall into three families that callers treat differently:
//!
//! - **Configuration** errors are raised at construction or update time and
//!   always name the offending field.
//! - **Invalid input** errors are raised per `process()` call before any
//!   column state is touched.
//! - **Processing** errors signal an internal invariant violation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The main error type for spatial pooler operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PoolerError {
    /// A configuration parameter is out of range
    #[error("Invalid configuration: {field} {reason}")]
    Config {
        /// Name of the rejected field
        field: &'static str,
        /// Human readable constraint that was violated
        reason: String,
    },

    /// Input SDR width does not match the configured input width
    #[error("Invalid input width: expected {expected}, got {actual}")]
    InputWidthMismatch {
        /// Configured input width
        expected: u32,
        /// Width of the received SDR
        actual: u32,
    },

    /// Input SDR has no active bits
    #[error("Invalid input: no active bits")]
    EmptyInput,

    /// Input SDR references a bit outside its width
    #[error("Invalid input: bit {index} out of range for width {width}")]
    BitOutOfRange {
        /// The offending bit index
        index: u32,
        /// Width of the SDR
        width: u32,
    },

    /// Internal invariant violation during a pooling cycle
    #[error("Processing failed: {0}")]
    Processing(String),

    /// Configuration could not be (de)serialized or read
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Coarse classification of a [`PoolerError`], used for metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Config,
    InvalidInput,
    Processing,
    Serialization,
}

impl PoolerError {
    /// Shorthand for building a configuration error.
    pub fn config(field: &'static str, reason: impl Into<String>) -> Self {
        PoolerError::Config {
            field,
            reason: reason.into(),
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PoolerError::Config { .. } => ErrorKind::Config,
            PoolerError::InputWidthMismatch { .. }
            | PoolerError::EmptyInput
            | PoolerError::BitOutOfRange { .. } => ErrorKind::InvalidInput,
            PoolerError::Processing(_) => ErrorKind::Processing,
            PoolerError::Serialization(_) => ErrorKind::Serialization,
        }
    }

    /// Name of the configuration field this error refers to, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            PoolerError::Config { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for PoolerError {
    fn from(err: serde_json::Error) -> Self {
        PoolerError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for PoolerError {
    fn from(err: std::io::Error) -> Self {
        PoolerError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for spatial pooler operations.
pub type Result<T> = std::result::Result<T, PoolerError>;
