//! Record: the immutable unit of the ledger.
//!
//! A record is created exactly once, at append time, by the chain. It is
//! never edited and never deleted; a newer version of a document is a new
//! record, not a mutation.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::canonical::canonical_parts;
use crate::crypto::Blake3Hash;

/// An immutable, content-addressed entry in a chain.
///
/// The payload is opaque: the record never interprets it. What the bytes
/// mean (a chatbot definition, or anything else) is a consumer concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Zero-based position within the chain, unique and contiguous.
    pub position: u64,

    /// Opaque payload bytes. May be empty.
    pub payload: Bytes,

    /// Hash of the record at `position - 1`, or [`Blake3Hash::ZERO`] for
    /// the first record.
    pub previous_hash: Blake3Hash,

    /// Blake3 digest of the canonical `(position, payload, previous_hash)`
    /// triple, fixed at construction time.
    pub hash: Blake3Hash,
}

impl Record {
    /// Derive a new record from its parts, computing the content hash.
    ///
    /// Pure: same inputs always produce the same record. The record does
    /// not check that `position` matches any chain's length; that contract
    /// belongs to [`Chain::append`](crate::chain::Chain::append).
    pub fn derive(position: u64, payload: impl Into<Bytes>, previous_hash: Blake3Hash) -> Self {
        let payload = payload.into();
        let hash = Blake3Hash::hash(&canonical_parts(position, &payload, &previous_hash));
        Self {
            position,
            payload,
            previous_hash,
            hash,
        }
    }

    /// Recompute this record's hash from its stored fields.
    ///
    /// For an untampered record this equals `self.hash`.
    pub fn recompute_hash(&self) -> Blake3Hash {
        Blake3Hash::hash(&canonical_parts(
            self.position,
            &self.payload,
            &self.previous_hash,
        ))
    }

    /// Whether this is the first record in its chain.
    pub fn is_genesis(&self) -> bool {
        self.position == 0
    }
}
