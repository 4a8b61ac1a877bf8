//! The Ledger: unified API for versioned chatbot definitions.
//!
//! A Ledger owns one in-memory chain and writes every appended record
//! through to a storage backend. Appends are serialized under a single
//! mutex so position assignment and hash linking never race; lookups and
//! verification read a consistent snapshot.

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::Mutex;
use tracing::{debug, info};

use botledger_core::{canonical_record_bytes, Chain, Record};
use botledger_definition::BotDefinition;
use botledger_store::{InsertResult, Store, StoreExt};

use crate::error::{LedgerError, Result};

/// Configuration for the Ledger.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Whether to re-verify the persisted chain when opening.
    ///
    /// Defaults to true: a stored chain is replayed and every hash
    /// recomputed before the ledger accepts it. Turning this off restores
    /// the trusting behavior where whatever was persisted is believed.
    pub verify_on_load: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            verify_on_load: true,
        }
    }
}

/// The main Ledger struct.
///
/// Provides a unified API for:
/// - Publishing definition versions (append)
/// - Looking up stored versions by position
/// - Verifying chain integrity
#[derive(Debug)]
pub struct Ledger<S: Store> {
    /// The in-memory chain; the mutex is the append serialization point.
    chain: Mutex<Chain>,
    /// The storage backend.
    store: Arc<S>,
    /// Configuration.
    config: LedgerConfig,
}

impl<S: Store> Ledger<S> {
    /// Open a ledger over the given store, loading any persisted chain.
    ///
    /// With `verify_on_load` set (the default) the persisted records are
    /// re-verified by recomputation; a corrupted store fails here, with
    /// the first offending position in the error.
    pub async fn open(store: S, config: LedgerConfig) -> Result<Self> {
        let chain = if config.verify_on_load {
            store.load_chain().await?
        } else {
            store.load_chain_trusting().await?
        };

        info!(
            records = chain.len(),
            verified = config.verify_on_load,
            "ledger opened"
        );

        Ok(Self {
            chain: Mutex::new(chain),
            store: Arc::new(store),
            config,
        })
    }

    /// Open with default configuration.
    pub async fn open_default(store: S) -> Result<Self> {
        Self::open(store, LedgerConfig::default()).await
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get the active configuration.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────
    // Publish Operations
    // ─────────────────────────────────────────────────────────────────────

    /// Publish a new version of a chatbot definition.
    ///
    /// Encodes the definition to payload bytes and appends it as the next
    /// record. Returns the stored record.
    pub async fn publish(&self, definition: &BotDefinition) -> Result<Record> {
        let payload = definition.to_bytes()?;
        self.publish_raw(payload).await
    }

    /// Append an opaque payload as the next record.
    ///
    /// The record is derived under the append lock, persisted, and only
    /// then committed to the in-memory chain, so a storage failure leaves
    /// the chain unchanged.
    pub async fn publish_raw(&self, payload: impl Into<Bytes>) -> Result<Record> {
        let mut chain = self.chain.lock().await;

        let record = Record::derive(chain.len(), payload, chain.head_hash());
        let canonical = canonical_record_bytes(&record);

        match self.store.insert_record(&record, &canonical).await? {
            InsertResult::Inserted | InsertResult::AlreadyExists => {
                chain.append(record.payload.clone());
                debug!(position = record.position, hash = %record.hash, "record published");
                Ok(record)
            }
            InsertResult::Conflict { existing } => Err(LedgerError::Conflict {
                position: record.position,
                existing,
            }),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Query Operations
    // ─────────────────────────────────────────────────────────────────────

    /// Get the record at a position.
    ///
    /// Total over any integer: negative and past-the-end positions return
    /// `None`.
    pub async fn record_at(&self, position: i64) -> Option<Record> {
        let chain = self.chain.lock().await;
        chain.get(position).cloned()
    }

    /// Decode the definition stored at a position.
    ///
    /// Returns `None` for an absent position. A present record whose
    /// payload does not decode as a definition is an explicit error, not
    /// an empty default.
    pub async fn definition_at(&self, position: i64) -> Result<Option<BotDefinition>> {
        match self.record_at(position).await {
            Some(record) => Ok(Some(BotDefinition::from_bytes(&record.payload)?)),
            None => Ok(None),
        }
    }

    /// Number of records published so far.
    pub async fn len(&self) -> u64 {
        self.chain.lock().await.len()
    }

    /// Whether no records have been published.
    pub async fn is_empty(&self) -> bool {
        self.chain.lock().await.is_empty()
    }

    /// The hash of the most recent record, or the genesis sentinel.
    pub async fn head_hash(&self) -> botledger_core::Blake3Hash {
        self.chain.lock().await.head_hash()
    }

    /// Verify the whole in-memory chain by recomputation.
    pub async fn verify(&self) -> Result<()> {
        let chain = self.chain.lock().await;
        chain.verify()?;
        Ok(())
    }

    /// A snapshot of the current chain.
    pub async fn chain(&self) -> Chain {
        self.chain.lock().await.clone()
    }
}
