//! Error types for sandfall.
//!
//! Boundary escapes during a run are not errors; they are reported through
//! [`DropOutcome`](crate::simulator::DropOutcome). Everything here aborts the
//! operation that raised it.

use crate::coordinate::Coordinate;
use std::fmt;

/// Errors raised while reading input, building a grid or persisting state.
#[derive(Debug)]
pub enum SandError {
    /// Failed to read or write a file.
    Io(std::io::Error),
    /// A scan line is structurally wrong (missing comma, empty point, ...).
    InvalidInput { line: usize, message: String },
    /// A coordinate token is not an integer.
    InvalidNumber { line: usize, token: String },
    /// Two consecutive polyline points share neither x nor y.
    NotAxisAligned { from: Coordinate, to: Coordinate },
    /// A cell access outside the grid.
    OutOfBounds { x: i32, y: i32 },
    /// The source column does not fall inside the computed grid.
    SourceOutOfBounds { x: i32 },
    /// config.toml could not be parsed.
    Config(toml::de::Error),
    /// JSON (de)serialization failed.
    Serialization(serde_json::Error),
    /// A compact binary log is truncated or malformed.
    Decode(String),
}

impl fmt::Display for SandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SandError::Io(e) => write!(f, "I/O error: {}", e),
            SandError::InvalidInput { line, message } => {
                write!(f, "line {}: {}", line, message)
            }
            SandError::InvalidNumber { line, token } => {
                write!(f, "line {}: '{}' is not an integer", line, token)
            }
            SandError::NotAxisAligned { from, to } => {
                write!(f, "segment {} -> {} is not horizontal or vertical", from, to)
            }
            SandError::OutOfBounds { x, y } => {
                write!(f, "cell ({}, {}) is outside the grid", x, y)
            }
            SandError::SourceOutOfBounds { x } => {
                write!(f, "source column {} is outside the grid", x)
            }
            SandError::Config(e) => write!(f, "Failed to parse config: {}", e),
            SandError::Serialization(e) => write!(f, "Failed to (de)serialize: {}", e),
            SandError::Decode(msg) => write!(f, "Failed to decode log: {}", msg),
        }
    }
}

impl std::error::Error for SandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SandError::Io(e) => Some(e),
            SandError::Config(e) => Some(e),
            SandError::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SandError {
    fn from(e: std::io::Error) -> Self {
        SandError::Io(e)
    }
}

impl From<toml::de::Error> for SandError {
    fn from(e: toml::de::Error) -> Self {
        SandError::Config(e)
    }
}

impl From<serde_json::Error> for SandError {
    fn from(e: serde_json::Error) -> Self {
        SandError::Serialization(e)
    }
}

pub type Result<T> = std::result::Result<T, SandError>;
