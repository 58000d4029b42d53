use actix_web::http::header;
use actix_web::{HttpResponse, ResponseError};
use leadform_core::export::ExportError;
use leadform_core::{GateError, QuestionError, SettingsError, StorageError, SubmissionError};
use serde_json::json;
use shared_types::ErrorResponse;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("{message}")]
    Validation {
        category: &'static str,
        message: String,
    },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid password")]
    InvalidCredentials { remaining_attempts: u32 },

    #[error("Too many failed attempts, retry in {retry_after_secs} seconds")]
    Locked { retry_after_secs: u64 },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let error_response = ErrorResponse {
            error: self.error_type(),
            message: self.to_string(),
        };

        match self {
            AppError::NotFound(_) => HttpResponse::NotFound().json(error_response),
            AppError::InvalidRequest(_) | AppError::Validation { .. } => {
                HttpResponse::BadRequest().json(error_response)
            }
            AppError::Unauthorized(_) => HttpResponse::Unauthorized().json(error_response),
            AppError::InvalidCredentials { remaining_attempts } => HttpResponse::Unauthorized()
                .json(json!({
                    "error": error_response.error,
                    "message": error_response.message,
                    "remaining_attempts": remaining_attempts,
                })),
            AppError::Locked { retry_after_secs } => HttpResponse::TooManyRequests()
                .insert_header((header::RETRY_AFTER, retry_after_secs.to_string()))
                .json(json!({
                    "error": error_response.error,
                    "message": error_response.message,
                    "retry_after_secs": retry_after_secs,
                })),
            AppError::Forbidden(_) => HttpResponse::Forbidden().json(error_response),
            AppError::Conflict(_) => HttpResponse::Conflict().json(error_response),
            AppError::ServiceUnavailable(_) | AppError::Storage(StorageError::Unavailable(_)) => {
                HttpResponse::ServiceUnavailable().json(error_response)
            }
            AppError::Database(_)
            | AppError::Config(_)
            | AppError::Io(_)
            | AppError::Storage(_)
            | AppError::Internal(_) => HttpResponse::InternalServerError().json(error_response),
        }
    }
}

impl AppError {
    fn error_type(&self) -> String {
        match self {
            AppError::Database(_) => "database_error".to_string(),
            AppError::Config(_) => "config_error".to_string(),
            AppError::Io(_) => "io_error".to_string(),
            AppError::Storage(StorageError::Unavailable(_)) => "storage_unavailable".to_string(),
            AppError::Storage(_) => "storage_error".to_string(),
            AppError::NotFound(_) => "not_found".to_string(),
            AppError::InvalidRequest(_) => "invalid_request".to_string(),
            AppError::Validation { category, .. } => category.to_string(),
            AppError::Unauthorized(_) => "unauthorized".to_string(),
            AppError::InvalidCredentials { .. } => "invalid_credentials".to_string(),
            AppError::Locked { .. } => "locked".to_string(),
            AppError::Forbidden(_) => "forbidden".to_string(),
            AppError::Conflict(_) => "conflict".to_string(),
            AppError::ServiceUnavailable(_) => "service_unavailable".to_string(),
            AppError::Internal(_) => "internal_error".to_string(),
        }
    }

    fn validation(category: &'static str, source: impl std::fmt::Display) -> Self {
        AppError::Validation {
            category,
            message: source.to_string(),
        }
    }
}

impl From<SubmissionError> for AppError {
    fn from(error: SubmissionError) -> Self {
        match error {
            SubmissionError::Storage(e) => AppError::Storage(e),
            SubmissionError::Questions(e) => e.into(),
            other => AppError::validation(other.category(), &other),
        }
    }
}

impl From<QuestionError> for AppError {
    fn from(error: QuestionError) -> Self {
        match error {
            QuestionError::EmptyText => AppError::validation("empty_text", &error),
            QuestionError::NotFound(_) => AppError::NotFound(error.to_string()),
            QuestionError::Storage(e) => AppError::Storage(e),
        }
    }
}

impl From<SettingsError> for AppError {
    fn from(error: SettingsError) -> Self {
        match error {
            SettingsError::InvalidLogo => AppError::validation("invalid_logo", &error),
            SettingsError::LogoTooLarge(_) => AppError::validation("logo_too_large", &error),
            SettingsError::InvalidDestination => {
                AppError::validation("invalid_destination", &error)
            }
            SettingsError::InvalidColor { .. } => AppError::validation("invalid_color", &error),
            SettingsError::Storage(e) => AppError::Storage(e),
        }
    }
}

impl From<GateError> for AppError {
    fn from(error: GateError) -> Self {
        match error {
            GateError::EmptyPassword => AppError::validation("empty_password", &error),
            GateError::PasswordMismatch => AppError::validation("password_mismatch", &error),
            GateError::PasswordTooShort => AppError::validation("password_too_short", &error),
            GateError::ResetDisabled => AppError::Forbidden(error.to_string()),
            GateError::NotConfigured => AppError::Conflict(error.to_string()),
            GateError::InvalidCredentials { remaining } => AppError::InvalidCredentials {
                remaining_attempts: remaining,
            },
            GateError::Locked { retry_after } => AppError::Locked {
                retry_after_secs: leadform_core::gate::ceil_secs(retry_after),
            },
            GateError::Backend(e) => AppError::ServiceUnavailable(e),
            GateError::Hashing(e) => AppError::Internal(e),
        }
    }
}

impl From<ExportError> for AppError {
    fn from(error: ExportError) -> Self {
        AppError::Internal(error.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
