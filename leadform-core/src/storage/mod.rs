use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use shared_types::ResponseRecord;

mod local;
mod memory;

pub use local::{LocalCredentialStore, LocalMirror};
pub use memory::InMemoryKeyValueStore;

/// Keys under which the application keeps its local state.
pub mod keys {
    pub const QUESTIONS: &str = "questions";
    pub const RESPONSES: &str = "responses";
    pub const LOGO: &str = "logo";
    pub const MESSAGING_DESTINATION: &str = "messaging_destination";
    pub const COLORS: &str = "colors";
    pub const ADMIN_CREDENTIAL: &str = "admin_credential";
}

/// String-keyed persistent storage. Writes are atomic per key.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn load(&self, key: &str) -> Result<Option<String>, StorageError>;
    async fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// A table of submitted responses.
#[async_trait]
pub trait ResponseSink: Send + Sync {
    async fn insert(&self, record: &ResponseRecord) -> Result<(), StorageError>;
    async fn list(&self) -> Result<Vec<ResponseRecord>, StorageError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminCredential {
    pub username: String,
    pub password_hash: String,
    pub updated_at: DateTime<Utc>,
}

/// Where the single admin credential lives.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn load_credential(&self) -> Result<Option<AdminCredential>, StorageError>;
    async fn save_credential(&self, credential: &AdminCredential) -> Result<(), StorageError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage operation failed: {0}")]
    OperationFailed(String),

    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub async fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    match store.load(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

pub async fn save_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value)?;
    store.save(key, &raw).await
}
