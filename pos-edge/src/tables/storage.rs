//! redb-based persistence for the state snapshot
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `pos_state` | `"snapshot"` | JSON-serialized `StateSnapshot` | Last saved state |
//!
//! Every save replaces the whole snapshot in one write transaction
//! (last writer wins). redb commits with `Durability::Immediate`, so the
//! snapshot is on disk as soon as `save` returns.
//!
//! A database file redb refuses to open as damaged is moved aside to
//! `<file>.corrupt` and a new empty database is created in its place.

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use shared::order::StateSnapshot;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Table for the state snapshot: key = slot name, value = JSON bytes
const STATE_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("pos_state");

const SNAPSHOT_KEY: &str = "snapshot";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unsupported snapshot version: {0}")]
    UnsupportedVersion(u32),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// Whether the stored bytes exist but cannot be interpreted
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            StorageError::Serialization(_) | StorageError::UnsupportedVersion(_)
        )
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// A damaged database file that was replaced on open
#[derive(Debug, Clone, PartialEq)]
pub struct RecoveredFile {
    /// Where the damaged file was moved
    pub moved_to: PathBuf,
    /// Why redb rejected it
    pub reason: String,
}

/// Whether redb rejected the file because its contents are damaged
///
/// An already-open database, a required upgrade, or an I/O failure such as
/// a permission error is not damage and must not trigger a reset.
fn is_damaged_file(err: &redb::DatabaseError) -> bool {
    match err {
        redb::DatabaseError::Storage(redb::StorageError::Corrupted(_)) => true,
        redb::DatabaseError::Storage(redb::StorageError::Io(e)) => {
            matches!(e.kind(), ErrorKind::InvalidData | ErrorKind::UnexpectedEof)
        }
        _ => false,
    }
}

/// First free `<file>.corrupt[-<millis>]` path next to `path`
fn quarantine_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".corrupt");
    let candidate = path.with_file_name(&name);
    if !candidate.exists() {
        return candidate;
    }
    name.push(format!("-{}", shared::util::now_millis()));
    path.with_file_name(name)
}

/// Durable save/load of the full state snapshot
pub trait PersistenceStore: Send {
    /// Overwrite the stored snapshot
    fn save(&self, snapshot: &StateSnapshot) -> StorageResult<()>;

    /// Read the stored snapshot, `None` when nothing was saved yet
    fn load(&self) -> StorageResult<Option<StateSnapshot>>;
}

/// Snapshot storage backed by redb
#[derive(Clone)]
pub struct RedbStore {
    db: Arc<Database>,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore").finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open the database, replacing a damaged file with a new empty one
    ///
    /// Returns the recovery details when the file had to be replaced. Errors
    /// that are not file damage are returned unchanged.
    pub fn open_or_recover(path: impl AsRef<Path>) -> StorageResult<(Self, Option<RecoveredFile>)> {
        let path = path.as_ref();
        match Database::create(path) {
            Ok(db) => Ok((Self::init(db)?, None)),
            Err(e) if is_damaged_file(&e) => {
                let moved_to = quarantine_path(path);
                std::fs::rename(path, &moved_to)?;
                tracing::error!(
                    path = %path.display(),
                    moved_to = %moved_to.display(),
                    error = %e,
                    "Database file damaged, moved aside and recreated"
                );
                let store = Self::init(Database::create(path)?)?;
                let recovered = RecoveredFile {
                    moved_to,
                    reason: e.to_string(),
                };
                Ok((store, Some(recovered)))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Open an in-memory database (tests and throwaway sessions)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(STATE_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Store raw bytes in the snapshot slot
    ///
    /// Bypasses serialization; used to simulate damaged files.
    pub fn store_raw(&self, bytes: &[u8]) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(STATE_TABLE)?;
            table.insert(SNAPSHOT_KEY, bytes)?;
        }
        txn.commit()?;
        Ok(())
    }
}

impl PersistenceStore for RedbStore {
    fn save(&self, snapshot: &StateSnapshot) -> StorageResult<()> {
        let value = serde_json::to_vec(snapshot)?;
        self.store_raw(&value)
    }

    fn load(&self) -> StorageResult<Option<StateSnapshot>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(STATE_TABLE)?;
        let Some(guard) = table.get(SNAPSHOT_KEY)? else {
            return Ok(None);
        };

        let snapshot: StateSnapshot = serde_json::from_slice(guard.value())?;
        if !snapshot.is_supported_version() {
            return Err(StorageError::UnsupportedVersion(snapshot.version));
        }
        Ok(Some(snapshot))
    }
}
