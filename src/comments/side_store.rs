//! Durable local side-store trait and backends.

use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

/// Trait for durable local key-value storage backends.
pub trait SideStore: Send + Sync {
  /// Read the value stored under `key`, if any.
  fn read(&self, key: &str) -> Result<Option<serde_json::Value>>;

  /// Store `value` under `key`, replacing any previous value.
  fn write(&self, key: &str, value: &serde_json::Value) -> Result<()>;
}

impl<S: SideStore + ?Sized> SideStore for std::sync::Arc<S> {
  fn read(&self, key: &str) -> Result<Option<serde_json::Value>> {
    (**self).read(key)
  }

  fn write(&self, key: &str, value: &serde_json::Value) -> Result<()> {
    (**self).write(key, value)
  }
}

/// In-memory backend. Nothing survives the process; used for tests and
/// ephemeral sessions.
#[derive(Default)]
pub struct MemorySideStore {
  entries: Mutex<HashMap<String, serde_json::Value>>,
}

impl MemorySideStore {
  pub fn new() -> Self {
    Self::default()
  }
}

impl SideStore for MemorySideStore {
  fn read(&self, key: &str) -> Result<Option<serde_json::Value>> {
    let entries = self
      .entries
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    Ok(entries.get(key).cloned())
  }

  fn write(&self, key: &str, value: &serde_json::Value) -> Result<()> {
    let mut entries = self
      .entries
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    entries.insert(key.to_string(), value.clone());
    Ok(())
  }
}

/// SQLite-backed side-store.
pub struct SqliteSideStore {
  conn: Mutex<Connection>,
}

/// Schema for the side-store table.
const SIDE_STORE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS side_store (
    key TEXT PRIMARY KEY,
    value BLOB NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

impl SqliteSideStore {
  /// Open or create the store at the default location.
  pub fn open() -> Result<Self> {
    let path = Self::default_path()?;
    Self::open_at(&path)
  }

  /// Open or create the store at an explicit path.
  pub fn open_at(path: &Path) -> Result<Self> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create side-store directory: {}", e))?;
    }

    let conn = Connection::open(path)
      .map_err(|e| eyre!("Failed to open side-store at {}: {}", path.display(), e))?;

    Self::from_connection(conn)
  }

  /// In-memory database, for tests.
  pub fn in_memory() -> Result<Self> {
    let conn =
      Connection::open_in_memory().map_err(|e| eyre!("Failed to open in-memory store: {}", e))?;
    Self::from_connection(conn)
  }

  fn from_connection(conn: Connection) -> Result<Self> {
    conn
      .execute_batch(SIDE_STORE_SCHEMA)
      .map_err(|e| eyre!("Failed to run side-store migrations: {}", e))?;
    Ok(Self {
      conn: Mutex::new(conn),
    })
  }

  /// Get the default database path.
  fn default_path() -> Result<std::path::PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("boardkit").join("comments.db"))
  }
}

impl SideStore for SqliteSideStore {
  fn read(&self, key: &str) -> Result<Option<serde_json::Value>> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let mut stmt = conn
      .prepare("SELECT value FROM side_store WHERE key = ?")
      .map_err(|e| eyre!("Failed to prepare query: {}", e))?;

    let data: Option<Vec<u8>> = stmt.query_row(params![key], |row| row.get(0)).ok();

    match data {
      Some(bytes) => {
        let value = serde_json::from_slice(&bytes)
          .map_err(|e| eyre!("Failed to deserialize stored value: {}", e))?;
        Ok(Some(value))
      }
      None => Ok(None),
    }
  }

  fn write(&self, key: &str, value: &serde_json::Value) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let data = serde_json::to_vec(value).map_err(|e| eyre!("Failed to serialize value: {}", e))?;

    conn
      .execute(
        "INSERT OR REPLACE INTO side_store (key, value, updated_at)
         VALUES (?, ?, datetime('now'))",
        params![key, data],
      )
      .map_err(|e| eyre!("Failed to write side-store entry: {}", e))?;

    Ok(())
  }
}
