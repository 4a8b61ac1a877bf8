//! Error types for the Ledger.

use botledger_core::{Blake3Hash, IntegrityError};
use botledger_definition::DefinitionError;
use botledger_store::StoreError;
use thiserror::Error;

/// Errors that can occur during Ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Storage error.
    #[error("storage error: {0}")]
    Store(StoreError),

    /// Definition payload encode/decode error.
    #[error("definition error: {0}")]
    Definition(#[from] DefinitionError),

    /// Integrity violation found during verification.
    #[error("integrity violation: {0}")]
    Integrity(#[from] IntegrityError),

    /// The store already holds a different record at this position.
    #[error("conflict at position {position}: existing record {existing}")]
    Conflict {
        position: u64,
        existing: Blake3Hash,
    },
}

// Integrity failures keep their own variant whichever layer surfaced them.
impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Integrity(inner) => LedgerError::Integrity(inner),
            other => LedgerError::Store(other),
        }
    }
}

/// Result type for Ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
