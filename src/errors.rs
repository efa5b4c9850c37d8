//! Error types for stream operations
//!
//! Values are the only signal carried through a stream. These errors only
//! surface at the fallible edges of the API: configuration, timeouts, and
//! feeding a wire that has already been finished.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur around stream construction and consumption
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// A value was offered to a wire or behavior after `finish`
    #[error("wire is finished and no longer accepts values")]
    Finished,

    /// A bounded wait for the first value elapsed
    #[error("no value arrived within {0:?}")]
    Timeout(Duration),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// No async runtime available to defer work onto
    #[error("Runtime error: {0}")]
    Runtime(String),
}

/// Result type for stream operations
pub type StreamResult<T> = Result<T, StreamError>;
