use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;

/// Storage key for the product records (JSON array)
pub const PRODUCTS_KEY: &str = "productData";
/// Storage key for the global settings (JSON object)
pub const SETTINGS_KEY: &str = "settingsData";
/// Storage key for the image map (JSON object keyed by item number)
pub const IMAGES_KEY: &str = "productImages";

/// Persistence port for the catalog.
///
/// Each store is an independent keyed blob; writes are not atomic across keys.
pub trait Storage {
    /// Read the blob stored under `key`, if any
    fn load(&self, key: &str) -> Result<Option<String>>;

    /// Replace the blob stored under `key`
    fn save(&self, key: &str, blob: &str) -> Result<()>;
}

/// SQLite-backed key/value store living in the user's data directory.
pub struct SqliteStorage {
    conn: Connection,
    db_path: PathBuf,
}

impl SqliteStorage {
    /// Open (or create) the database file and initialize the schema.
    pub fn open(db_path: &Path) -> Result<Self> {
        // Ensure the parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;

        tracing::info!("📁 Database opened at: {}", db_path.display());

        let storage = SqliteStorage {
            conn,
            db_path: db_path.to_path_buf(),
        };
        storage.init_schema()?;

        Ok(storage)
    }

    /// Create the key/value table if it doesn't exist.
    fn init_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key             TEXT PRIMARY KEY,
                value           TEXT NOT NULL,
                updated_at      INTEGER NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    /// Get the path to the database file
    pub fn path(&self) -> &Path {
        &self.db_path
    }
}

impl Storage for SqliteStorage {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let value: Option<String> = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn save(&self, key: &str, blob: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, blob, Utc::now().timestamp()],
        )?;
        Ok(())
    }
}

impl std::fmt::Debug for SqliteStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStorage")
            .field("db_path", &self.db_path)
            .finish()
    }
}

/// In-process store, used by tests and as a fallback when the database
/// cannot be opened.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    blobs: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a key, e.g. with a corrupt blob
    #[cfg(test)]
    pub fn with(self, key: &str, blob: &str) -> Self {
        self.blobs.borrow_mut().insert(key.to_string(), blob.to_string());
        self
    }
}

impl Storage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.blobs.borrow().get(key).cloned())
    }

    fn save(&self, key: &str, blob: &str) -> Result<()> {
        self.blobs.borrow_mut().insert(key.to_string(), blob.to_string());
        Ok(())
    }
}
