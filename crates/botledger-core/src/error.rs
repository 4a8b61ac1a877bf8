//! Error types for botledger core.

use thiserror::Error;

/// Errors that can occur while encoding or decoding records.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("record hash mismatch: expected {expected}, got {actual}")]
    HashMismatch { expected: String, actual: String },

    #[error("malformed record: {0}")]
    MalformedRecord(String),

    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("decoding error: {0}")]
    DecodingError(String),
}

/// An integrity violation found while verifying a chain.
///
/// Each variant carries the position of the first record that failed, so a
/// caller can report where corruption begins. Recovery (truncate there,
/// reject the whole chain) is the caller's policy decision.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityError {
    /// Recomputing a record's hash did not reproduce its stored hash.
    #[error("record at position {position} does not match its recomputed hash")]
    HashMismatch { position: u64 },

    /// A record's previous_hash does not equal its predecessor's hash
    /// (or the genesis sentinel, at position 0).
    #[error("record at position {position} does not link to its predecessor")]
    BrokenLink { position: u64 },

    /// A record's stored position disagrees with its index in the chain.
    #[error("record claims position {position}, expected {expected}")]
    PositionMismatch { position: u64, expected: u64 },
}

impl IntegrityError {
    /// The position of the first failing record.
    pub fn position(&self) -> u64 {
        match self {
            IntegrityError::HashMismatch { position }
            | IntegrityError::BrokenLink { position }
            | IntegrityError::PositionMismatch { position, .. } => *position,
        }
    }
}
