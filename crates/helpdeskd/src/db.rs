//! SQLite connection management and the scoped transaction helper.
//!
//! Blocking work runs on the tokio blocking pool through [`Database::call`].
//! A file-backed `Database` gives every call its own connection, so requests
//! never queue behind each other inside the process. Check-and-write
//! operations use [`with_transaction`], which opens the transaction with
//! `BEGIN IMMEDIATE` so the write lock is held before the first read. That is
//! what serializes concurrent transitions on the same ticket, including
//! across processes sharing the database file.

use crate::error::{HelpdeskError, Result};
use anyhow::Context;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, warn};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    role TEXT NOT NULL CHECK (role IN ('MANAGER', 'SUPPORT', 'USER')),
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS api_tokens (
    token_hash TEXT PRIMARY KEY,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS tickets (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    priority TEXT NOT NULL DEFAULT 'MEDIUM' CHECK (priority IN ('LOW', 'MEDIUM', 'HIGH')),
    status TEXT NOT NULL DEFAULT 'OPEN'
        CHECK (status IN ('OPEN', 'IN_PROGRESS', 'RESOLVED', 'CLOSED')),
    created_by INTEGER NOT NULL REFERENCES users(id),
    assigned_to INTEGER REFERENCES users(id),
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_tickets_created_by ON tickets(created_by);
CREATE INDEX IF NOT EXISTS idx_tickets_assigned_to ON tickets(assigned_to);

CREATE TABLE IF NOT EXISTS ticket_status_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    ticket_id INTEGER NOT NULL,
    old_status TEXT NOT NULL,
    new_status TEXT NOT NULL,
    changed_by INTEGER NOT NULL REFERENCES users(id),
    changed_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_status_logs_ticket ON ticket_status_logs(ticket_id);

CREATE TRIGGER IF NOT EXISTS ticket_status_logs_no_update
BEFORE UPDATE ON ticket_status_logs
BEGIN
    SELECT RAISE(ABORT, 'ticket_status_logs is append-only');
END;

CREATE TRIGGER IF NOT EXISTS ticket_status_logs_no_delete
BEFORE DELETE ON ticket_status_logs
BEGIN
    SELECT RAISE(ABORT, 'ticket_status_logs is append-only');
END;

CREATE TABLE IF NOT EXISTS ticket_comments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    ticket_id INTEGER NOT NULL REFERENCES tickets(id) ON DELETE CASCADE,
    user_id INTEGER NOT NULL REFERENCES users(id),
    comment TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_comments_ticket ON ticket_comments(ticket_id);
"#;

/// Database location
#[derive(Debug, Clone)]
pub enum DbLocation {
    /// On-disk database file
    File(PathBuf),
    /// Private in-memory database (tests)
    Memory,
}

/// Create all tables, indexes and triggers if missing.
pub fn initialize_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA)
}

/// Connect to an existing database file with per-connection pragmas.
pub fn connect(path: &Path, busy_timeout: Duration) -> rusqlite::Result<Connection> {
    let conn = Connection::open(path)?;
    conn.busy_timeout(busy_timeout)?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    Ok(conn)
}

/// Open a file-backed connection, switching the file to WAL and applying
/// the schema.
pub fn open_connection(path: &Path, busy_timeout: Duration) -> rusqlite::Result<Connection> {
    let conn = connect(path, busy_timeout)?;

    // WAL is persistent in the file; readers proceed while a transition
    // holds the write lock
    conn.pragma_update(None, "journal_mode", "WAL")?;

    initialize_schema(&conn)?;
    Ok(conn)
}

/// Open a private in-memory connection with the schema applied.
pub fn open_memory_connection() -> rusqlite::Result<Connection> {
    let conn = Connection::open_in_memory()?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    initialize_schema(&conn)?;
    Ok(conn)
}

/// Run `body` inside one immediate transaction.
///
/// Commits only when `body` returns `Ok`. Any error rolls the whole unit
/// back before it is returned; a panic or a dropped future also rolls back,
/// since an uncommitted `Transaction` rolls back on drop.
pub fn with_transaction<T, F>(conn: &mut Connection, body: F) -> Result<T>
where
    F: FnOnce(&Transaction<'_>) -> Result<T>,
{
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    match body(&tx) {
        Ok(value) => {
            tx.commit()?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback() {
                warn!("Rollback failed after {}: {}", err.reason(), rollback_err);
            }
            Err(err)
        }
    }
}

/// Handle to the helpdesk database
#[derive(Clone)]
pub struct Database {
    backend: Backend,
}

#[derive(Clone)]
enum Backend {
    /// One connection per call; SQLite locking coordinates writers
    File { path: PathBuf, busy_timeout: Duration },
    /// A private in-memory database exists only inside its one connection
    Memory(Arc<Mutex<Connection>>),
}

impl Database {
    /// Open or create the database at the specified location
    pub async fn open(location: DbLocation, busy_timeout: Duration) -> anyhow::Result<Self> {
        let backend = match location {
            DbLocation::File(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    tokio::fs::create_dir_all(parent)
                        .await
                        .context("Failed to create database directory")?;
                }
                info!("Opening helpdesk database at: {}", path.display());

                let target = path.clone();
                tokio::task::spawn_blocking(move || open_connection(&target, busy_timeout))
                    .await?
                    .context("Failed to open SQLite database")?;
                Backend::File { path, busy_timeout }
            }
            DbLocation::Memory => {
                let conn = tokio::task::spawn_blocking(open_memory_connection)
                    .await?
                    .context("Failed to open in-memory database")?;
                Backend::Memory(Arc::new(Mutex::new(conn)))
            }
        };

        Ok(Self { backend })
    }

    /// Run blocking store work on the blocking pool.
    ///
    /// File-backed calls each get a fresh connection and run concurrently;
    /// in-memory calls take turns on the single connection.
    pub async fn call<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let backend = self.backend.clone();
        tokio::task::spawn_blocking(move || -> Result<T> {
            match backend {
                Backend::File { path, busy_timeout } => {
                    let mut conn = connect(&path, busy_timeout)?;
                    f(&mut conn)
                }
                Backend::Memory(conn) => {
                    let mut guard = conn.blocking_lock();
                    f(&mut guard)
                }
            }
        })
        .await
        .map_err(HelpdeskError::from)?
    }
}
