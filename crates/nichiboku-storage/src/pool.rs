//! ConnectionPool: one writer plus N read-only readers with round-robin
//! selection. The only place in the crate that holds a `Connection`.
//!
//! The writer sits behind an async mutex so a write never parks a runtime
//! thread on a std lock. Closures passed to the pool are synchronous and
//! never await, so a transaction always completes before the lock is handed
//! on.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use nichiboku_core::errors::{StorageError, StorageResult};
use rusqlite::{Connection, OpenFlags};

use crate::{migrations, pragmas, to_storage_err};

pub struct ConnectionPool {
    writer: tokio::sync::Mutex<Connection>,
    readers: Vec<Mutex<Connection>>,
    read_index: AtomicUsize,
}

impl ConnectionPool {
    /// Open a file-backed pool and bring the schema up to date.
    pub fn open(path: &Path, read_pool_size: usize, busy_timeout_ms: u64) -> StorageResult<Self> {
        let writer = Connection::open(path).map_err(|e| StorageError::Unavailable {
            reason: format!("cannot open writer on {}: {}", path.display(), e),
        })?;
        pragmas::configure_connection(&writer, busy_timeout_ms)?;
        migrations::migrate(&writer)?;

        let mut readers = Vec::with_capacity(read_pool_size);
        for i in 0..read_pool_size {
            let reader = Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
            .map_err(|e| StorageError::Unavailable {
                reason: format!("cannot open reader {} on {}: {}", i, path.display(), e),
            })?;
            pragmas::configure_readonly_connection(&reader, busy_timeout_ms)?;
            readers.push(Mutex::new(reader));
        }

        Ok(Self {
            writer: tokio::sync::Mutex::new(writer),
            readers,
            read_index: AtomicUsize::new(0),
        })
    }

    /// Single-connection in-memory pool. Reads fall back to the writer.
    pub fn open_in_memory(busy_timeout_ms: u64) -> StorageResult<Self> {
        let writer = Connection::open_in_memory().map_err(to_storage_err)?;
        pragmas::configure_connection(&writer, busy_timeout_ms)?;
        migrations::migrate(&writer)?;

        Ok(Self {
            writer: tokio::sync::Mutex::new(writer),
            readers: Vec::new(),
            read_index: AtomicUsize::new(0),
        })
    }

    pub async fn with_writer<F, T>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&Connection) -> StorageResult<T>,
    {
        let conn = self.writer.lock().await;
        f(&conn)
    }

    /// Execute `f` on a reader (round-robin), or on the writer when the pool
    /// has no readers.
    pub async fn with_reader<F, T>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&Connection) -> StorageResult<T>,
    {
        if self.readers.is_empty() {
            return self.with_writer(f).await;
        }
        self.read_now(f)
    }

    fn read_now<F, T>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&Connection) -> StorageResult<T>,
    {
        let index = self.read_index.fetch_add(1, Ordering::Relaxed) % self.readers.len();
        let conn = self.readers[index].lock().map_err(|e| StorageError::Unavailable {
            reason: format!("reader lock poisoned: {e}"),
        })?;
        f(&conn)
    }

    pub fn reader_count(&self) -> usize {
        self.readers.len()
    }
}
