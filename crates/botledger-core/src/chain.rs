//! Chain: an ordered, append-only collection of hash-linked records.
//!
//! The chain owns its records exclusively. Appending is the only mutating
//! operation; there is no delete and no update. Lookups are total over any
//! caller-supplied integer, and the whole chain can be re-verified by
//! recomputation at any time.

use bytes::Bytes;

use crate::crypto::Blake3Hash;
use crate::error::IntegrityError;
use crate::record::Record;

/// An append-only log of [`Record`]s linked by hash.
///
/// Invariant: for every position `p > 0`,
/// `records[p].previous_hash == records[p-1].hash`; at position 0 the
/// previous hash is the genesis sentinel [`Blake3Hash::ZERO`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chain {
    records: Vec<Record>,
}

impl Chain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Number of records appended so far.
    pub fn len(&self) -> u64 {
        self.records.len() as u64
    }

    /// Whether the chain holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The most recently appended record, if any.
    pub fn last(&self) -> Option<&Record> {
        self.records.last()
    }

    /// The hash the next appended record will link to: the last record's
    /// hash, or the genesis sentinel for an empty chain.
    pub fn head_hash(&self) -> Blake3Hash {
        self.records
            .last()
            .map(|r| r.hash)
            .unwrap_or(Blake3Hash::ZERO)
    }

    /// Append a payload, deriving and storing the next record.
    ///
    /// Position and previous hash are computed from the current chain
    /// state, so the caller supplies nothing but the payload. Empty
    /// payloads are valid. Returns the stored record.
    pub fn append(&mut self, payload: impl Into<Bytes>) -> Record {
        let position = self.len();
        let previous_hash = self.head_hash();
        let record = Record::derive(position, payload, previous_hash);
        self.records.push(record.clone());
        record
    }

    /// Look up a record by position.
    ///
    /// Total over any integer: negative positions and positions at or past
    /// the end return `None`. Positions may be user-controlled (e.g. read
    /// back from persisted configuration), so absence is an ordinary
    /// outcome here, never a panic.
    pub fn get(&self, position: i64) -> Option<&Record> {
        let index = usize::try_from(position).ok()?;
        self.records.get(index)
    }

    /// Iterate over the records in position order.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    /// Verify the whole chain by recomputation.
    ///
    /// Checks, for every record, that its stored position matches its
    /// index, that its previous_hash links to its predecessor (or the
    /// genesis sentinel), and that recomputing its hash reproduces the
    /// stored value. On failure, reports the first position that broke.
    pub fn verify(&self) -> Result<(), IntegrityError> {
        let mut expected_prev = Blake3Hash::ZERO;

        for (index, record) in self.records.iter().enumerate() {
            let expected = index as u64;
            if record.position != expected {
                return Err(IntegrityError::PositionMismatch {
                    position: record.position,
                    expected,
                });
            }

            if record.previous_hash != expected_prev {
                return Err(IntegrityError::BrokenLink { position: expected });
            }

            if record.recompute_hash() != record.hash {
                return Err(IntegrityError::HashMismatch { position: expected });
            }

            expected_prev = record.hash;
        }

        Ok(())
    }

    /// Reconstruct a chain from persisted records, re-verifying everything.
    ///
    /// Persisted hashes are never trusted blindly: the records must already
    /// be in position order with intact links and hashes, or this fails
    /// with the first offending position.
    pub fn from_records(records: Vec<Record>) -> Result<Self, IntegrityError> {
        let chain = Self { records };
        chain.verify()?;
        Ok(chain)
    }

    /// Reconstruct a chain from persisted records without re-verifying.
    ///
    /// This restores the trusting load behavior: whatever was persisted is
    /// believed. A later [`verify`](Chain::verify) still works against the
    /// result. Prefer [`from_records`](Chain::from_records).
    pub fn from_records_unchecked(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Consume the chain, yielding its records in position order.
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}
