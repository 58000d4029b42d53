use crate::error::{AppError, AppResult};
use crate::DbConnection;
use async_trait::async_trait;
use chrono::Utc;
use leadform_core::storage::{KeyValueStore, StorageError};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// SQLite file holding the application's local key-value state.
pub struct Database {
    connection: DbConnection,
}

impl Database {
    pub fn new(db_path: &Path) -> AppResult<Self> {
        // Ensure the database directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;

        let database = Database {
            connection: Arc::new(Mutex::new(conn)),
        };

        database.run_migrations()?;

        Ok(database)
    }

    pub fn connection(&self) -> DbConnection {
        Arc::clone(&self.connection)
    }

    fn run_migrations(&self) -> AppResult<()> {
        let conn = self
            .connection
            .lock()
            .map_err(|e| AppError::Internal(format!("Failed to acquire database lock: {e}")))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv_entries (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            [],
        )?;

        Ok(())
    }
}

/// [`KeyValueStore`] backed by the `kv_entries` table. Each save is a single
/// upsert statement, so writes are atomic per key.
#[derive(Clone)]
pub struct SqliteKeyValueStore {
    connection: DbConnection,
}

impl SqliteKeyValueStore {
    pub fn new(database: &Database) -> Self {
        Self {
            connection: database.connection(),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.connection
            .lock()
            .map_err(|e| StorageError::OperationFailed(format!("Failed to acquire database lock: {e}")))
    }
}

fn storage_error(e: rusqlite::Error) -> StorageError {
    StorageError::OperationFailed(e.to_string())
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT value FROM kv_entries WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(storage_error)
    }

    async fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO kv_entries (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().timestamp()],
        )
        .map_err(storage_error)?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM kv_entries WHERE key = ?1", params![key])
            .map_err(storage_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[actix_rt::test]
    async fn test_save_load_remove() {
        let database = Database::new(&PathBuf::from(":memory:")).unwrap();
        let store = SqliteKeyValueStore::new(&database);

        assert_eq!(store.load("logo").await.unwrap(), None);

        store.save("logo", "data:image/png;base64,AAAA").await.unwrap();
        store.save("logo", "data:image/png;base64,BBBB").await.unwrap();
        assert_eq!(
            store.load("logo").await.unwrap().as_deref(),
            Some("data:image/png;base64,BBBB")
        );

        store.remove("logo").await.unwrap();
        assert_eq!(store.load("logo").await.unwrap(), None);
    }

    #[actix_rt::test]
    async fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/leadform.db");

        {
            let database = Database::new(&path).unwrap();
            SqliteKeyValueStore::new(&database)
                .save("messaging_destination", "5511988887777")
                .await
                .unwrap();
        }

        let database = Database::new(&path).unwrap();
        let value = SqliteKeyValueStore::new(&database)
            .load("messaging_destination")
            .await
            .unwrap();
        assert_eq!(value.as_deref(), Some("5511988887777"));
    }
}
