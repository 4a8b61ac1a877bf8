//! # botledger Store
//!
//! Storage abstraction for botledger. Provides a trait-based interface for
//! record persistence with SQLite and in-memory implementations.
//!
//! ## Overview
//!
//! The store module abstracts record persistence behind the [`Store`] trait,
//! keeping the ledger storage-agnostic. The primary implementation is
//! [`SqliteStore`], with [`MemoryStore`] for testing.
//!
//! ## Key Types
//!
//! - [`Store`] - The async trait for all storage operations
//! - [`StoreExt`] - Chain-level helpers (`load_chain`, `persist_chain`)
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//! - [`InsertResult`] - Result of inserting a record
//!
//! ## Design Notes
//!
//! - **Idempotent inserts**: inserting the same record twice returns
//!   `AlreadyExists`
//! - **Conflict evidence**: a different record at an occupied position
//!   returns `Conflict`, never overwrites
//! - **Untrusted persistence**: `load_chain` replays and re-verifies every
//!   stored record; persisted hashes are recomputed, not believed

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{InsertResult, Store, StoreExt};
