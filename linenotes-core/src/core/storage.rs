//! SQLite connection management and schema setup.

use crate::{LinenotesError, Result};
use rusqlite::Connection;
use std::path::Path;

pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Creates (or re-initialises) a database at `path` with the full schema.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Opens a private in-memory database with the full schema.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    /// Opens an existing database at `path`, migrating older layouts forward.
    ///
    /// # Errors
    ///
    /// Returns [`LinenotesError::InvalidDatabase`] if the file lacks the
    /// `texts` and `lines` tables.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;

        let table_count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master
             WHERE type='table'
             AND name IN ('texts', 'lines')",
            [],
            |row| row.get(0),
        )?;

        if table_count != 2 {
            return Err(LinenotesError::InvalidDatabase(
                "Not a valid Linenotes database".to_string(),
            ));
        }

        // Migrate: add created_at column if it doesn't exist
        let column_exists: bool = conn.query_row(
            "SELECT COUNT(*) FROM pragma_table_info('texts') WHERE name='created_at'",
            [],
            |row| row.get::<_, i64>(0).map(|count| count > 0),
        )?;

        if !column_exists {
            log::info!("migrating texts table: adding created_at column");
            conn.execute(
                "ALTER TABLE texts ADD COLUMN created_at INTEGER NOT NULL DEFAULT 0",
                [],
            )?;
        }

        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }

    /// Opens `path` if it already holds a database, otherwise creates one.
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let exists = std::fs::metadata(path.as_ref())
            .map(|m| m.len() > 0)
            .unwrap_or(false);
        if exists {
            Self::open(path)
        } else {
            Self::create(path)
        }
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }
}
