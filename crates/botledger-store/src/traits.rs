//! Store trait: the abstract interface for record persistence.
//!
//! This trait keeps the ledger storage-agnostic. Implementations include
//! SQLite (primary) and in-memory (for tests). The core chain stays
//! synchronous and I/O-free; durability lives entirely behind this boundary.

use async_trait::async_trait;
use botledger_core::{Blake3Hash, Chain, Record};

use crate::error::Result;

/// Result of inserting a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertResult {
    /// Record was inserted successfully.
    Inserted,
    /// The identical record already exists at this position (idempotent,
    /// not an error).
    AlreadyExists,
    /// Conflict: a different record already occupies this position.
    Conflict {
        /// The hash of the record already stored there.
        existing: Blake3Hash,
    },
}

/// The Store trait: async interface for record persistence.
///
/// All methods are async to support both sync (SQLite via `spawn_blocking`)
/// and async backends.
///
/// # Design Notes
///
/// - **Idempotent inserts**: inserting the same record twice returns
///   `AlreadyExists`.
/// - **Conflict evidence**: inserting a different record at an occupied
///   position returns `Conflict` with the existing hash. An append-only log
///   never overwrites.
/// - **Untrusted persistence**: stored hashes are re-derived and checked on
///   load (see [`StoreExt::load_chain`]); a store is a transcript, not an
///   authority.
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert a record into the store.
    ///
    /// # Arguments
    /// - `record`: the record to insert.
    /// - `canonical`: its canonical bytes (cached to avoid recomputation).
    async fn insert_record(&self, record: &Record, canonical: &[u8]) -> Result<InsertResult>;

    /// Get the record at a position, if present.
    async fn get_record(&self, position: u64) -> Result<Option<Record>>;

    /// Get a range of records, ordered by position.
    ///
    /// Returns records with `start <= position <= end`; absent positions
    /// are simply skipped.
    async fn get_records_range(&self, start: u64, end: u64) -> Result<Vec<Record>>;

    /// Number of records in the store.
    async fn record_count(&self) -> Result<u64>;

    /// The highest stored position and its record hash, if any.
    async fn head(&self) -> Result<Option<(u64, Blake3Hash)>>;

    /// Get the cached canonical bytes for a position, if present.
    async fn get_canonical_bytes(&self, position: u64) -> Result<Option<Vec<u8>>>;
}

/// Extension trait for common store patterns.
pub trait StoreExt: Store {
    /// Reconstruct the persisted chain, re-verifying every record.
    ///
    /// Persisted `hash`/`previous_hash` columns are never trusted: the
    /// records are replayed through [`Chain::from_records`], which
    /// recomputes every hash and checks every link. Corruption surfaces as
    /// [`StoreError::Integrity`](crate::StoreError::Integrity) with the
    /// first offending position.
    fn load_chain(&self) -> impl std::future::Future<Output = Result<Chain>> + Send;

    /// Reconstruct the persisted chain without re-verifying.
    ///
    /// Restores the trusting behavior some callers opt into; corruption
    /// stays invisible until someone calls `verify` on the result.
    fn load_chain_trusting(&self) -> impl std::future::Future<Output = Result<Chain>> + Send;

    /// Persist every record of a chain not yet in the store.
    fn persist_chain(
        &self,
        chain: &Chain,
    ) -> impl std::future::Future<Output = Result<u64>> + Send;
}

impl<S: Store + ?Sized> StoreExt for S {
    async fn load_chain(&self) -> Result<Chain> {
        // Load up to the highest stored position, not the row count: a
        // missing position then shows up as a hole for from_records to
        // reject instead of being silently truncated away.
        let records = match self.head().await? {
            Some((max, _)) => self.get_records_range(0, max).await?,
            None => Vec::new(),
        };
        Ok(Chain::from_records(records)?)
    }

    async fn load_chain_trusting(&self) -> Result<Chain> {
        let records = match self.head().await? {
            Some((max, _)) => self.get_records_range(0, max).await?,
            None => Vec::new(),
        };
        Ok(Chain::from_records_unchecked(records))
    }

    async fn persist_chain(&self, chain: &Chain) -> Result<u64> {
        let mut written = 0;
        for record in chain.records() {
            let canonical = botledger_core::canonical_record_bytes(record);
            if self.insert_record(record, &canonical).await? == InsertResult::Inserted {
                written += 1;
            }
        }
        Ok(written)
    }
}
