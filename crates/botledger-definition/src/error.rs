//! Error types for definition payloads.

use thiserror::Error;

/// Errors that can occur while encoding or decoding a definition.
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// Serialization to payload bytes failed.
    #[error("failed to encode definition: {0}")]
    Encode(#[source] serde_json::Error),

    /// Payload bytes are not a well-formed, complete definition.
    #[error("failed to decode definition: {0}")]
    Decode(#[source] serde_json::Error),
}
