use crate::auth::Argon2Hasher;
use crate::config::ApiConfig;
use crate::database::{Database, SqliteKeyValueStore};
use crate::error::{AppError, AppResult};
use crate::remote::RemoteTableClient;
use actix_web::{web, HttpResponse, Result};
use leadform_core::storage::{
    CredentialStore, KeyValueStore, LocalCredentialStore, LocalMirror, ResponseSink,
};
use leadform_core::{AdminGate, MessageTemplate, QuestionStore, ResponseRecorder, SettingsStore};
use shared_types::ServerStatus;
use std::sync::Arc;
use std::time::SystemTime;

pub struct AppState {
    pub questions: QuestionStore,
    pub settings: SettingsStore,
    pub recorder: ResponseRecorder,
    pub gate: Arc<AdminGate>,
    pub jwt_secret: String,
    pub token_hours: i64,
    pub start_time: SystemTime,
}

impl AppState {
    /// Wires the stores together. Without a `[remote]` section responses are
    /// only mirrored locally and the admin credential lives in SQLite.
    pub fn from_config(config: &ApiConfig, database: &Database) -> AppResult<Self> {
        let store: Arc<dyn KeyValueStore> = Arc::new(SqliteKeyValueStore::new(database));

        let remote = match &config.remote {
            Some(remote_config) => {
                tracing::info!(url = %remote_config.url, "Remote table store enabled");
                Some(Arc::new(RemoteTableClient::new(remote_config)?))
            }
            None => {
                tracing::info!("Remote table store disabled; using local storage only");
                None
            }
        };

        let credentials: Arc<dyn CredentialStore> = match &remote {
            Some(client) => client.clone(),
            None => Arc::new(LocalCredentialStore::new(store.clone())),
        };
        let remote_sink = remote.map(|client| client as Arc<dyn ResponseSink>);

        let questions = QuestionStore::new(store.clone());
        let settings = SettingsStore::with_default_destination(
            store.clone(),
            config.messaging.default_destination.clone(),
        );
        let recorder = ResponseRecorder::new(
            questions.clone(),
            settings.clone(),
            remote_sink,
            Arc::new(LocalMirror::new(store)),
            MessageTemplate::new(config.messaging.message_template.clone()),
        );
        let gate = AdminGate::new(
            credentials,
            Arc::new(Argon2Hasher),
            config.auth.gate_config(),
        );

        Ok(Self {
            questions,
            settings,
            recorder,
            gate: Arc::new(gate),
            jwt_secret: config.jwt_secret().to_string(),
            token_hours: config.auth.token_hours,
            start_time: SystemTime::now(),
        })
    }
}

pub async fn health_check(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let uptime = data
        .start_time
        .elapsed()
        .map_err(|e| AppError::Internal(format!("Failed to calculate uptime: {e}")))?
        .as_secs();

    let status = ServerStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime,
    };

    Ok(HttpResponse::Ok().json(status))
}
