//! SQLite connection and schema migrations.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::Connection;

use crate::error::Result;

/// Ordered schema steps; `PRAGMA user_version` records how many were applied.
const MIGRATIONS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS best_story (
        item_id INTEGER NOT NULL,
        day     TEXT    NOT NULL,
        UNIQUE (item_id, day)
    );
    CREATE INDEX IF NOT EXISTS best_story_day ON best_story (day);",
    "CREATE TABLE IF NOT EXISTS issue (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        identifier  TEXT    NOT NULL UNIQUE,
        created_at  TEXT    NOT NULL,
        period      TEXT    NOT NULL,
        num_stories INTEGER NOT NULL,
        meta        TEXT    NOT NULL
    );
    CREATE TABLE IF NOT EXISTS issue_story (
        issue_id INTEGER NOT NULL REFERENCES issue (id),
        item_id  INTEGER NOT NULL,
        position INTEGER NOT NULL,
        UNIQUE (issue_id, item_id)
    );
    CREATE TABLE IF NOT EXISTS issue_format (
        issue_id  INTEGER NOT NULL REFERENCES issue (id),
        file_name TEXT    NOT NULL,
        file_size INTEGER NOT NULL,
        mimetype  TEXT    NOT NULL
    );",
];

/// Single-writer, file-backed store shared by the repositories.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (creating if needed) the database at `path` and apply migrations.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Self::from_connection(Connection::open(path)?)
    }

    /// Private in-memory database, mainly for tests.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.migrate()?;
        Ok(db)
    }

    /// Apply pending migrations; returns how many ran.
    pub fn migrate(&self) -> Result<usize> {
        let mut conn = self.lock();
        let current: usize = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        let pending = MIGRATIONS.len().saturating_sub(current);

        for (version, sql) in MIGRATIONS.iter().enumerate().skip(current) {
            let tx = conn.transaction()?;
            tx.execute_batch(sql)?;
            tx.pragma_update(None, "user_version", version + 1)?;
            tx.commit()?;
            log::debug!("Applied migration {}", version + 1);
        }
        Ok(pending)
    }

    /// Schema version currently applied.
    pub fn schema_version(&self) -> Result<usize> {
        let conn = self.lock();
        Ok(conn.query_row("PRAGMA user_version", [], |row| row.get(0))?)
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Connection> {
        // Poisoning is ignored; uncommitted transactions roll back on drop.
        self.conn
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
