use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

pub type QuestionId = i64;

/// Answers keyed by question id. Yes/no questions hold [`YES`] or [`NO`],
/// text questions hold free text and date questions an ISO date.
pub type AnswerSet = BTreeMap<QuestionId, String>;

pub const YES: &str = "sim";
pub const NO: &str = "nao";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum QuestionKind {
    YesNo,
    Text,
    Date,
}

/// Shows a question only when another question was answered with a given value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DisplayCondition {
    pub depends_on: QuestionId,
    pub required_answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    pub kind: QuestionKind,
    pub counts_toward_score: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<DisplayCondition>,
}

/// Body used by the admin panel to add or replace a question. The id is
/// assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QuestionDraft {
    pub text: String,
    pub kind: QuestionKind,
    #[serde(default = "default_counts_toward_score")]
    pub counts_toward_score: bool,
    #[serde(default)]
    pub condition: Option<DisplayCondition>,
}

fn default_counts_toward_score() -> bool {
    true
}

impl QuestionDraft {
    pub fn into_question(self, id: QuestionId) -> Question {
        Question {
            id,
            text: self.text,
            kind: self.kind,
            counts_toward_score: self.counts_toward_score,
            condition: self.condition,
        }
    }
}

/// A completed submission. Never modified after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ResponseRecord {
    pub id: String,
    pub name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub answers: AnswerSet,
    #[serde(default)]
    pub dates: AnswerSet,
    pub yes_count: u32,
    pub no_count: u32,
    pub approval_percent: u8,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QuestionListResponse {
    pub questions: Vec<Question>,
}

#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QuestionResponse {
    pub question: Question,
}

#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ResponseListResponse {
    pub responses: Vec<ResponseRecord>,
}
