//! In-memory implementation of the Store trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use botledger_core::{Blake3Hash, Record};

use crate::error::{Result, StoreError};
use crate::traits::{InsertResult, Store};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    inner: RwLock<BTreeMap<u64, StoredRecord>>,
}

struct StoredRecord {
    record: Record,
    canonical: Vec<u8>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(BTreeMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_record(&self, record: &Record, canonical: &[u8]) -> Result<InsertResult> {
        let mut inner = self
            .inner
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;

        if let Some(existing) = inner.get(&record.position) {
            if existing.record.hash == record.hash {
                return Ok(InsertResult::AlreadyExists);
            }
            return Ok(InsertResult::Conflict {
                existing: existing.record.hash,
            });
        }

        inner.insert(
            record.position,
            StoredRecord {
                record: record.clone(),
                canonical: canonical.to_vec(),
            },
        );

        Ok(InsertResult::Inserted)
    }

    async fn get_record(&self, position: u64) -> Result<Option<Record>> {
        let inner = self
            .inner
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        Ok(inner.get(&position).map(|sr| sr.record.clone()))
    }

    async fn get_records_range(&self, start: u64, end: u64) -> Result<Vec<Record>> {
        let inner = self
            .inner
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        Ok(inner
            .range(start..=end)
            .map(|(_, sr)| sr.record.clone())
            .collect())
    }

    async fn record_count(&self) -> Result<u64> {
        let inner = self
            .inner
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        Ok(inner.len() as u64)
    }

    async fn head(&self) -> Result<Option<(u64, Blake3Hash)>> {
        let inner = self
            .inner
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        Ok(inner
            .iter()
            .next_back()
            .map(|(&pos, sr)| (pos, sr.record.hash)))
    }

    async fn get_canonical_bytes(&self, position: u64) -> Result<Option<Vec<u8>>> {
        let inner = self
            .inner
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        Ok(inner.get(&position).map(|sr| sr.canonical.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::StoreExt;
    use botledger_core::{canonical_record_bytes, Chain};

    fn make_chain(n: usize) -> Chain {
        let mut chain = Chain::new();
        for i in 0..n {
            chain.append(format!("payload {}", i).into_bytes());
        }
        chain
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = MemoryStore::new();
        let chain = make_chain(1);
        let record = chain.get(0).unwrap();
        let canonical = canonical_record_bytes(record);

        let result = store.insert_record(record, &canonical).await.unwrap();
        assert_eq!(result, InsertResult::Inserted);

        let retrieved = store.get_record(0).await.unwrap().unwrap();
        assert_eq!(&retrieved, record);
        assert_eq!(
            store.get_canonical_bytes(0).await.unwrap().unwrap(),
            canonical
        );
    }

    #[tokio::test]
    async fn test_insert_idempotent() {
        let store = MemoryStore::new();
        let chain = make_chain(1);
        let record = chain.get(0).unwrap();
        let canonical = canonical_record_bytes(record);

        let r1 = store.insert_record(record, &canonical).await.unwrap();
        assert_eq!(r1, InsertResult::Inserted);

        let r2 = store.insert_record(record, &canonical).await.unwrap();
        assert_eq!(r2, InsertResult::AlreadyExists);

        assert_eq!(store.record_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_insert_conflict() {
        let store = MemoryStore::new();
        let chain = make_chain(1);
        let record = chain.get(0).unwrap();
        store
            .insert_record(record, &canonical_record_bytes(record))
            .await
            .unwrap();

        // A different record at the same position is conflict evidence.
        let mut other = Chain::new();
        let rival = other.append(&b"rival"[..]);
        let result = store
            .insert_record(&rival, &canonical_record_bytes(&rival))
            .await
            .unwrap();
        assert_eq!(
            result,
            InsertResult::Conflict {
                existing: record.hash
            }
        );
    }

    #[tokio::test]
    async fn test_head_and_count() {
        let store = MemoryStore::new();
        assert_eq!(store.head().await.unwrap(), None);

        let chain = make_chain(3);
        store.persist_chain(&chain).await.unwrap();

        assert_eq!(store.record_count().await.unwrap(), 3);
        let (pos, hash) = store.head().await.unwrap().unwrap();
        assert_eq!(pos, 2);
        assert_eq!(hash, chain.last().unwrap().hash);
    }

    #[tokio::test]
    async fn test_load_chain_roundtrip() {
        let store = MemoryStore::new();
        let chain = make_chain(5);
        assert_eq!(store.persist_chain(&chain).await.unwrap(), 5);

        let loaded = store.load_chain().await.unwrap();
        assert_eq!(loaded, chain);
        assert!(loaded.verify().is_ok());
    }

    #[tokio::test]
    async fn test_load_chain_empty() {
        let store = MemoryStore::new();
        let loaded = store.load_chain().await.unwrap();
        assert!(loaded.is_empty());
    }

    #[tokio::test]
    async fn test_load_chain_rejects_tampered_row() {
        let store = MemoryStore::new();
        let chain = make_chain(3);
        store.persist_chain(&chain).await.unwrap();

        // Corrupt record 1 in place, as a broken backend would.
        {
            let mut inner = store.inner.write().unwrap();
            let sr = inner.get_mut(&1).unwrap();
            sr.record.payload = bytes::Bytes::from_static(b"tampered");
        }

        let err = store.load_chain().await.unwrap_err();
        match err {
            StoreError::Integrity(e) => assert_eq!(e.position(), 1),
            other => panic!("expected integrity error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_load_chain_rejects_gap() {
        let store = MemoryStore::new();
        let chain = make_chain(3);
        store.persist_chain(&chain).await.unwrap();

        {
            let mut inner = store.inner.write().unwrap();
            inner.remove(&1);
        }

        assert!(store.load_chain().await.is_err());
    }
}
