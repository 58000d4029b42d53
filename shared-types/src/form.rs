use crate::questionnaire::{AnswerSet, Question, QuestionId, ResponseRecord};
use crate::settings::ColorScheme;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Everything the public page needs to render the questionnaire.
#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FormResponse {
    pub questions: Vec<Question>,
    pub logo: Option<String>,
    pub colors: ColorScheme,
}

#[derive(Debug, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EvaluateRequest {
    #[serde(default)]
    pub answers: AnswerSet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ApprovalBand {
    Neutral,
    Excellent,
    Moderate,
    Low,
}

#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EvaluationResponse {
    pub visible_question_ids: Vec<QuestionId>,
    pub yes_count: u32,
    pub no_count: u32,
    pub approval_percent: f64,
    pub approval_percent_rounded: u8,
    pub band: ApprovalBand,
    pub message: String,
    pub color: String,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SubmitRequest {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub answers: AnswerSet,
    #[serde(default)]
    pub dates: AnswerSet,
}

/// Outcome of writing a record to one persistence sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "status", rename_all = "snake_case")]
#[ts(export)]
pub enum SinkOutcome {
    Stored,
    Failed { reason: String },
    Disabled,
}

impl SinkOutcome {
    pub fn is_stored(&self) -> bool {
        matches!(self, SinkOutcome::Stored)
    }
}

#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SubmitResponse {
    pub record: ResponseRecord,
    pub remote: SinkOutcome,
    pub local: SinkOutcome,
    pub redirect_url: String,
}
