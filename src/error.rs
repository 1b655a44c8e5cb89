//! Error types for the symcompound library.
//!
//! All fallible operations return [`SpellError`]. Lookups and corrections never
//! fail: a rejected query yields an empty suggestion list and an unresolved
//! token is tagged with an out-of-budget distance instead.
//!
//! # Examples
//!
//! ```
//! use symcompound::error::{SpellError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(SpellError::configuration("prefix length must be positive"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for symcompound operations.
#[derive(Error, Debug)]
pub enum SpellError {
    /// I/O errors (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid parameters or distance selection at construction time
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Dictionary source missing or unreadable
    #[error("Load error: {0}")]
    Load(String),

    /// Corrupt or incompatible index snapshot
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with SpellError.
pub type Result<T> = std::result::Result<T, SpellError>;

impl SpellError {
    /// Create a new configuration error.
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        SpellError::Configuration(msg.into())
    }

    /// Create a new dictionary load error.
    pub fn load<S: Into<String>>(msg: S) -> Self {
        SpellError::Load(msg.into())
    }

    /// Create a new snapshot error.
    pub fn snapshot<S: Into<String>>(msg: S) -> Self {
        SpellError::Snapshot(msg.into())
    }

    /// Create a new serialization error.
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        SpellError::SerializationError(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        SpellError::Other(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        SpellError::Other(format!("Invalid argument: {}", msg.into()))
    }

    /// Create a new internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        SpellError::Other(format!("Internal error: {}", msg.into()))
    }
}

impl From<bincode::Error> for SpellError {
    fn from(err: bincode::Error) -> Self {
        SpellError::serialization(err.to_string())
    }
}
