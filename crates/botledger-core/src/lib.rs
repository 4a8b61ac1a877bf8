//! # botledger Core
//!
//! Pure primitives for botledger: hash-linked records and the append-only
//! chain that owns them.
//!
//! This crate contains no I/O, no storage, no logging. It is pure
//! computation over content-addressed data structures; every operation is
//! synchronous, short, and CPU-bound.
//!
//! ## Key Types
//!
//! - [`Record`] - An immutable, content-addressed entry (position, opaque
//!   payload, link to predecessor, own hash)
//! - [`Chain`] - The ordered, append-only collection of records
//! - [`Blake3Hash`] - The digest newtype; [`Blake3Hash::ZERO`] is the
//!   genesis sentinel
//! - [`IntegrityError`] - A verification failure, carrying the first
//!   offending position
//!
//! ## Canonicalization
//!
//! Hashes are derived from a deterministic CBOR encoding of
//! `(position, payload, previous_hash)`. See [`canonical`].

pub mod canonical;
pub mod chain;
pub mod crypto;
pub mod error;
pub mod record;

pub use canonical::{canonical_parts, canonical_record_bytes, decode_record};
pub use chain::Chain;
pub use crypto::Blake3Hash;
pub use error::{CoreError, IntegrityError};
pub use record::Record;
