//! Error types for the engine.
//!
//! Gameplay precondition failures (target not minable, cap reached,
//! missing resources) are ordinary return values, not errors; see
//! [`crate::operation::StartDenied`] and [`crate::crafting::CraftCheck`].
//! This module covers genuine failures: bad data files and invalid
//! configuration.

use thiserror::Error;

/// Result type alias using [`EngineError`].
pub type Result<T> = std::result::Result<T, EngineError>;

/// Top-level error type for engine setup and data loading.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Data file parsing error (recipe catalog, engine config).
    #[error("Failed to parse {what}: {message}")]
    DataParse {
        /// What was being parsed.
        what: String,
        /// Error message from the parser.
        message: String,
    },

    /// Configuration value out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A recipe catalog entry is malformed.
    #[error("Invalid recipe '{id}': {message}")]
    InvalidRecipe {
        /// Recipe identifier.
        id: String,
        /// What is wrong with it.
        message: String,
    },
}
