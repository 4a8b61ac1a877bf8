//! SQLite implementation of the Store trait.
//!
//! This is the primary storage backend for botledger. It uses rusqlite with
//! bundled SQLite, wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use bytes::Bytes;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use botledger_core::{Blake3Hash, Record};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{InsertResult, Store};

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a closure against the connection on the blocking pool.
    async fn blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = lock_conn(&conn)?;
            f(&conn)
        })
        .await
        .map_err(|e| StoreError::TaskFailed(e.to_string()))?
    }
}

fn lock_conn(conn: &Arc<Mutex<Connection>>) -> Result<MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|e| StoreError::LockPoisoned(e.to_string()))
}

/// Convert a row (position, payload, prev_hash, hash) to a Record.
fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<Record> {
    let position: u64 = row.get("position")?;
    let payload: Vec<u8> = row.get("payload")?;
    let prev_hash: Vec<u8> = row.get("prev_hash")?;
    let hash: Vec<u8> = row.get("hash")?;

    Ok(Record {
        position,
        payload: Bytes::from(payload),
        previous_hash: blob_to_hash(prev_hash, "prev_hash")?,
        hash: blob_to_hash(hash, "hash")?,
    })
}

fn blob_to_hash(blob: Vec<u8>, column: &str) -> rusqlite::Result<Blake3Hash> {
    Blake3Hash::try_from(blob.as_slice()).map_err(|_| {
        rusqlite::Error::InvalidColumnType(0, column.into(), rusqlite::types::Type::Blob)
    })
}

#[async_trait]
impl Store for SqliteStore {
    async fn insert_record(&self, record: &Record, canonical: &[u8]) -> Result<InsertResult> {
        let record = record.clone();
        let canonical = canonical.to_vec();

        self.blocking(move |conn| {
            // A different record at an occupied position is conflict
            // evidence; the identical record is an idempotent no-op.
            let existing: Option<Vec<u8>> = conn
                .query_row(
                    "SELECT hash FROM records WHERE position = ?1",
                    params![record.position],
                    |row| row.get(0),
                )
                .optional()?;

            if let Some(existing_hash) = existing {
                let existing_hash = blob_to_hash(existing_hash, "hash")?;
                if existing_hash == record.hash {
                    return Ok(InsertResult::AlreadyExists);
                }
                return Ok(InsertResult::Conflict {
                    existing: existing_hash,
                });
            }

            conn.execute(
                "INSERT INTO records (position, payload, prev_hash, hash, canonical_bytes, inserted_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    record.position,
                    record.payload.as_ref(),
                    record.previous_hash.as_bytes().as_slice(),
                    record.hash.as_bytes().as_slice(),
                    canonical.as_slice(),
                    migration::now_millis(),
                ],
            )?;

            debug!(position = record.position, hash = %record.hash, "record inserted");
            Ok(InsertResult::Inserted)
        })
        .await
    }

    async fn get_record(&self, position: u64) -> Result<Option<Record>> {
        self.blocking(move |conn| {
            let record = conn
                .query_row(
                    "SELECT position, payload, prev_hash, hash FROM records WHERE position = ?1",
                    params![position],
                    row_to_record,
                )
                .optional()?;
            Ok(record)
        })
        .await
    }

    async fn get_records_range(&self, start: u64, end: u64) -> Result<Vec<Record>> {
        self.blocking(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT position, payload, prev_hash, hash FROM records
                 WHERE position >= ?1 AND position <= ?2
                 ORDER BY position ASC",
            )?;

            let records = stmt
                .query_map(params![start, end], row_to_record)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(records)
        })
        .await
    }

    async fn record_count(&self) -> Result<u64> {
        self.blocking(|conn| {
            let count: u64 = conn.query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))?;
            Ok(count)
        })
        .await
    }

    async fn head(&self) -> Result<Option<(u64, Blake3Hash)>> {
        self.blocking(|conn| {
            let head = conn
                .query_row(
                    "SELECT position, hash FROM records ORDER BY position DESC LIMIT 1",
                    [],
                    |row| {
                        let position: u64 = row.get(0)?;
                        let hash: Vec<u8> = row.get(1)?;
                        Ok((position, hash))
                    },
                )
                .optional()?;

            match head {
                Some((position, hash)) => Ok(Some((position, blob_to_hash(hash, "hash")?))),
                None => Ok(None),
            }
        })
        .await
    }

    async fn get_canonical_bytes(&self, position: u64) -> Result<Option<Vec<u8>>> {
        self.blocking(move |conn| {
            let bytes = conn
                .query_row(
                    "SELECT canonical_bytes FROM records WHERE position = ?1",
                    params![position],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(bytes)
        })
        .await
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
    async fn test_sqlite_insert_and_get() {
        let store = SqliteStore::open_memory().unwrap();
        let chain = make_chain(2);
        let record = chain.get(1).unwrap();
        let canonical = canonical_record_bytes(record);

        let result = store.insert_record(record, &canonical).await.unwrap();
        assert_eq!(result, InsertResult::Inserted);

        let retrieved = store.get_record(1).await.unwrap().unwrap();
        assert_eq!(&retrieved, record);
        assert_eq!(
            store.get_canonical_bytes(1).await.unwrap().unwrap(),
            canonical
        );
        assert!(store.get_record(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sqlite_idempotent_and_conflict() {
        let store = SqliteStore::open_memory().unwrap();
        let chain = make_chain(1);
        let record = chain.get(0).unwrap();
        let canonical = canonical_record_bytes(record);

        assert_eq!(
            store.insert_record(record, &canonical).await.unwrap(),
            InsertResult::Inserted
        );
        assert_eq!(
            store.insert_record(record, &canonical).await.unwrap(),
            InsertResult::AlreadyExists
        );

        let mut other = Chain::new();
        let rival = other.append(&b"rival"[..]);
        assert_eq!(
            store
                .insert_record(&rival, &canonical_record_bytes(&rival))
                .await
                .unwrap(),
            InsertResult::Conflict {
                existing: record.hash
            }
        );
    }

    #[tokio::test]
    async fn test_sqlite_load_chain_roundtrip() {
        let store = SqliteStore::open_memory().unwrap();
        let chain = make_chain(4);
        assert_eq!(store.persist_chain(&chain).await.unwrap(), 4);

        let loaded = store.load_chain().await.unwrap();
        assert_eq!(loaded, chain);
    }

    #[tokio::test]
    async fn test_sqlite_detects_tampered_row_on_load() {
        let store = SqliteStore::open_memory().unwrap();
        let chain = make_chain(3);
        store.persist_chain(&chain).await.unwrap();

        // Tamper directly with the database, bypassing the store API.
        {
            let conn = store.conn.lock().unwrap();
            conn.execute(
                "UPDATE records SET payload = ?1 WHERE position = 1",
                params![b"tampered".as_slice()],
            )
            .unwrap();
        }

        let err = store.load_chain().await.unwrap_err();
        match err {
            StoreError::Integrity(e) => assert_eq!(e.position(), 1),
            other => panic!("expected integrity error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_sqlite_detects_deleted_row_on_load() {
        let store = SqliteStore::open_memory().unwrap();
        let chain = make_chain(3);
        store.persist_chain(&chain).await.unwrap();

        {
            let conn = store.conn.lock().unwrap();
            conn.execute("DELETE FROM records WHERE position = 1", [])
                .unwrap();
        }

        assert!(store.load_chain().await.is_err());
    }

    #[tokio::test]
    async fn test_sqlite_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.db");

        let chain = make_chain(3);
        {
            let store = SqliteStore::open(&path).unwrap();
            store.persist_chain(&chain).await.unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        let loaded = store.load_chain().await.unwrap();
        assert_eq!(loaded, chain);
        assert_eq!(store.record_count().await.unwrap(), 3);
    }
}
