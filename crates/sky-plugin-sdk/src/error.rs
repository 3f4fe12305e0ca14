//! Errors raised by the SDK helpers.

use std::io;

use thiserror::Error;

/// Failures while writing plugin output.
#[derive(Debug, Error)]
pub enum SdkError {
    /// A value could not be encoded as JSON.
    #[error("failed to encode output: {0}")]
    Encode(#[source] serde_json::Error),
    /// Writing to a standard stream failed.
    #[error("failed to write output: {0}")]
    Io(#[source] io::Error),
}
