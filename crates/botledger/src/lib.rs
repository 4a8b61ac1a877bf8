//! # botledger
//!
//! Versioned chatbot definitions on a hash-linked, append-only ledger.
//!
//! ## Overview
//!
//! botledger stores successive versions of a structured configuration
//! document (a chatbot definition: name, description, intents, response
//! templates) as content-addressed records in an append-only chain:
//!
//! - **Record**: immutable. Never edited. A new version is a new record.
//! - **Chain**: single-writer, append-only, verifiable by recomputation.
//! - **Store**: a persistence boundary that is replayed and re-verified on
//!   load; stored hashes are never trusted blindly.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use botledger::{BotDefinition, Intent, Ledger, LedgerConfig, Response};
//! use botledger::store::SqliteStore;
//!
//! async fn example() {
//!     let store = SqliteStore::open("ledger.db").unwrap();
//!     let ledger = Ledger::open(store, LedgerConfig::default()).await.unwrap();
//!
//!     let definition = BotDefinition::new("MyChatbot", "A decentralized chatbot")
//!         .with_intent(Intent::new("greeting", "Greeting intent", vec!["hello".into()]))
//!         .with_response(Response::new("Hello! How can I assist you today?", "greeting"));
//!
//!     let record = ledger.publish(&definition).await.unwrap();
//!     println!("published version at position {}", record.position);
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `botledger::core` - Core primitives (Record, Chain, Blake3Hash)
//! - `botledger::definition` - Typed definition payloads
//! - `botledger::store` - Storage abstraction and SQLite

pub mod error;
pub mod ledger;

// Re-export component crates
pub use botledger_core as core;
pub use botledger_definition as definition;
pub use botledger_store as store;

// Re-export main types for convenience
pub use error::{LedgerError, Result};
pub use ledger::{Ledger, LedgerConfig};

// Re-export commonly used component types
pub use botledger_core::{Blake3Hash, Chain, CoreError, IntegrityError, Record};
pub use botledger_definition::{BotDefinition, DefinitionError, Intent, Response};
pub use botledger_store::{InsertResult, MemoryStore, SqliteStore, Store, StoreExt};
