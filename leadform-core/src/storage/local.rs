use super::{
    keys, load_json, save_json, AdminCredential, CredentialStore, KeyValueStore, ResponseSink,
    StorageError,
};
use async_trait::async_trait;
use shared_types::ResponseRecord;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Append-only list of responses kept in the local key-value store.
#[derive(Clone)]
pub struct LocalMirror {
    store: Arc<dyn KeyValueStore>,
    // Held from load to save; the list is rewritten whole on every append.
    append_lock: Arc<Mutex<()>>,
}

impl LocalMirror {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            append_lock: Arc::new(Mutex::new(())),
        }
    }
}

#[async_trait]
impl ResponseSink for LocalMirror {
    async fn insert(&self, record: &ResponseRecord) -> Result<(), StorageError> {
        let _guard = self.append_lock.lock().await;
        let mut records: Vec<ResponseRecord> = load_json(self.store.as_ref(), keys::RESPONSES)
            .await?
            .unwrap_or_default();
        records.push(record.clone());
        save_json(self.store.as_ref(), keys::RESPONSES, &records).await
    }

    async fn list(&self) -> Result<Vec<ResponseRecord>, StorageError> {
        Ok(load_json(self.store.as_ref(), keys::RESPONSES)
            .await?
            .unwrap_or_default())
    }
}

/// Keeps the admin credential next to the rest of the local state.
#[derive(Clone)]
pub struct LocalCredentialStore {
    store: Arc<dyn KeyValueStore>,
}

impl LocalCredentialStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CredentialStore for LocalCredentialStore {
    async fn load_credential(&self) -> Result<Option<AdminCredential>, StorageError> {
        load_json(self.store.as_ref(), keys::ADMIN_CREDENTIAL).await
    }

    async fn save_credential(&self, credential: &AdminCredential) -> Result<(), StorageError> {
        save_json(self.store.as_ref(), keys::ADMIN_CREDENTIAL, credential).await
    }
}
