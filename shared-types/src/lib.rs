use serde::{Deserialize, Serialize};
use ts_rs::TS;

pub mod admin;
pub mod form;
pub mod questionnaire;
pub mod settings;
pub mod typescript_gen;

pub use typescript_gen::generate_typescript_definitions;

pub use admin::{
    AdminLoginRequest, AdminLoginResponse, AdminStatsResponse, AdminStatusResponse,
    SetPasswordRequest,
};
pub use form::{
    ApprovalBand, EvaluateRequest, EvaluationResponse, FormResponse, SinkOutcome, SubmitRequest,
    SubmitResponse,
};
pub use questionnaire::{
    AnswerSet, DisplayCondition, Question, QuestionDraft, QuestionId, QuestionKind,
    QuestionListResponse, QuestionResponse, ResponseListResponse, ResponseRecord, NO, YES,
};
pub use settings::{ColorScheme, LogoSettings, MessagingSettings};

// Shared models for the leadform API and its web client

#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ServerStatus {
    pub status: String,
    pub version: String,
    pub uptime: u64,
}

#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
