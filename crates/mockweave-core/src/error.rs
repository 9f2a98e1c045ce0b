//! # Error Types
//!
//! Defines `MockWeaveError`, the unified error enum for the mockweave
//! pipeline. Data-availability gaps (empty id pools, exhausted unique pools)
//! are not errors: they surface as `null` values in the generated records.
//! What remains here are configuration mistakes and I/O at the crate edges.

use thiserror::Error;

/// All errors that can occur in mockweave operations.
#[derive(Error, Debug)]
pub enum MockWeaveError {
    #[error("Unknown resolution strategy '{name}'. Available: {available}")]
    UnknownStrategy { name: String, available: String },

    #[error("Unknown preset '{name}'. Available: {available}")]
    UnknownPreset { name: String, available: String },

    #[error("Failed to read model map from {path}: {message}")]
    Schema { path: String, message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Output error: {message}: {source}")]
    Output {
        message: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, MockWeaveError>;
