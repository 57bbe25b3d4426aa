//! Unified error types for the domain layer
//!
//! Every failure here is local to the call that produced it. Absence
//! ("no component at this position") is never an error, lookups return `Option`.

use thiserror::Error;

use crate::value_objects::Position;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid argument (contradictory directions, bad dimensions, empty names)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Parse error (hex colors, variant names)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Placement outside the furniture grid
    #[error("Position {position} is outside the {width}x{height} grid")]
    OutOfBounds {
        position: Position,
        width: u32,
        height: u32,
    },

    /// Placement over a cell claimed by another component
    #[error("Position {position} is already occupied")]
    Occupied { position: Position },
}

impl DomainError {
    /// Creates a validation error for invalid arguments.
    ///
    /// Use this when the caller handed in something that can never be valid:
    /// - Two opposing directions on the same axis
    /// - Zero width, height or module size
    /// - An empty module list
    ///
    /// # Example
    /// ```ignore
    /// if modules.is_empty() {
    ///     return Err(DomainError::validation("A component needs at least one module"));
    /// }
    /// ```
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates a parse error for string-to-type conversion failures.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create an out of bounds placement error
    pub fn out_of_bounds(position: Position, width: u32, height: u32) -> Self {
        Self::OutOfBounds {
            position,
            width,
            height,
        }
    }

    /// Create an occupied cell error
    pub fn occupied(position: Position) -> Self {
        Self::Occupied { position }
    }

    /// True for every error class that means "your input was wrong".
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Parse(_))
    }
}
