use crate::config::RemoteConfig;
use async_trait::async_trait;
use leadform_core::gate::ADMIN_USERNAME;
use leadform_core::storage::{AdminCredential, CredentialStore, ResponseSink, StorageError};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{RequestBuilder, Response};
use serde::Serialize;
use shared_types::ResponseRecord;

/// Client for a hosted PostgREST endpoint holding the response table and the
/// admin credential table.
pub struct RemoteTableClient {
    api_key: String,
    base_url: String,
    responses_table: String,
    admin_table: String,
    http_client: reqwest::Client,
}

impl RemoteTableClient {
    pub fn new(config: &RemoteConfig) -> Result<Self, StorageError> {
        if config.api_key.is_empty() {
            return Err(StorageError::Unavailable(
                "remote API key cannot be empty".to_string(),
            ));
        }

        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;

        Ok(Self {
            api_key: config.api_key.clone(),
            base_url: config.url.trim_end_matches('/').to_string(),
            responses_table: config.responses_table.clone(),
            admin_table: config.admin_table.clone(),
            http_client,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn headers(&self, prefer: Option<&'static str>) -> Result<HeaderMap, StorageError> {
        let invalid_key = |_| StorageError::Unavailable("Invalid API key format".to_string());

        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(&self.api_key).map_err(invalid_key)?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key)).map_err(invalid_key)?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(prefer) = prefer {
            headers.insert("Prefer", HeaderValue::from_static(prefer));
        }
        Ok(headers)
    }

    async fn send(&self, table: &str, request: RequestBuilder) -> Result<Response, StorageError> {
        let response = request
            .send()
            .await
            .map_err(|e| StorageError::Unavailable(format!("{}: {}", table, e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        if status.is_server_error() {
            Err(StorageError::Unavailable(format!(
                "{} returned {}: {}",
                table, status, error_text
            )))
        } else {
            Err(StorageError::OperationFailed(format!(
                "{} returned {}: {}",
                table, status, error_text
            )))
        }
    }

    async fn post<T: Serialize + ?Sized>(
        &self,
        table: &str,
        body: &T,
        prefer: &'static str,
    ) -> Result<(), StorageError> {
        let request = self
            .http_client
            .post(self.table_url(table))
            .headers(self.headers(Some(prefer))?)
            .json(body);
        self.send(table, request).await?;
        Ok(())
    }
}

#[async_trait]
impl ResponseSink for RemoteTableClient {
    async fn insert(&self, record: &ResponseRecord) -> Result<(), StorageError> {
        self.post(&self.responses_table, record, "return=minimal")
            .await
    }

    async fn list(&self) -> Result<Vec<ResponseRecord>, StorageError> {
        let request = self
            .http_client
            .get(self.table_url(&self.responses_table))
            .headers(self.headers(None)?)
            .query(&[("select", "*"), ("order", "created_at.desc")]);

        let response = self.send(&self.responses_table, request).await?;
        response
            .json()
            .await
            .map_err(|e| StorageError::OperationFailed(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl CredentialStore for RemoteTableClient {
    async fn load_credential(&self) -> Result<Option<AdminCredential>, StorageError> {
        let username_filter = format!("eq.{}", ADMIN_USERNAME);
        let request = self
            .http_client
            .get(self.table_url(&self.admin_table))
            .headers(self.headers(None)?)
            .query(&[
                ("select", "username,password_hash,updated_at"),
                ("username", username_filter.as_str()),
            ]);

        let response = self.send(&self.admin_table, request).await?;
        let rows: Vec<AdminCredential> = response.json().await.map_err(|e| {
            StorageError::OperationFailed(format!("Failed to parse response: {}", e))
        })?;
        Ok(rows.into_iter().next())
    }

    async fn save_credential(&self, credential: &AdminCredential) -> Result<(), StorageError> {
        self.post(
            &self.admin_table,
            credential,
            "resolution=merge-duplicates,return=minimal",
        )
        .await
    }
}
