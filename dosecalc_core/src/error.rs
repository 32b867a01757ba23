//! Error types for the dosecalc_core library.
//!
//! Calculation itself never fails: missing or non-positive inputs degrade to
//! placeholder results. These variants cover the surfaces around the engine
//! (config files, text parsing, calendar export).

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for dosecalc_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unrecognised schedule, syringe size or mode text
    #[error("Parse error: {0}")]
    Parse(String),

    /// Calendar export requested without an exportable reorder date,
    /// or the deferred export task did not complete
    #[error("Export error: {0}")]
    Export(String),
}
