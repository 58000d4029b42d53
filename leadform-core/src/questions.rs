use crate::storage::{keys, load_json, save_json, KeyValueStore, StorageError};
use chrono::Utc;
use shared_types::{DisplayCondition, Question, QuestionDraft, QuestionId, QuestionKind, NO};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum QuestionError {
    #[error("Question text must not be empty")]
    EmptyText,

    #[error("Question not found: {0}")]
    NotFound(QuestionId),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Ordered question list, stored as one serialized collection that every
/// mutation overwrites.
#[derive(Clone)]
pub struct QuestionStore {
    store: Arc<dyn KeyValueStore>,
}

impl QuestionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    async fn stored(&self) -> Result<Option<Vec<Question>>, QuestionError> {
        Ok(load_json(self.store.as_ref(), keys::QUESTIONS).await?)
    }

    async fn persist(&self, questions: &[Question]) -> Result<(), QuestionError> {
        save_json(self.store.as_ref(), keys::QUESTIONS, questions).await?;
        Ok(())
    }

    /// Stored questions, or the default seed when nothing was saved yet.
    pub async fn list(&self) -> Result<Vec<Question>, QuestionError> {
        Ok(self.stored().await?.unwrap_or_else(default_questions))
    }

    /// Like [`list`](Self::list), but writes the default seed on first use.
    pub async fn list_or_seed(&self) -> Result<Vec<Question>, QuestionError> {
        match self.stored().await? {
            Some(questions) => Ok(questions),
            None => {
                let seed = default_questions();
                self.persist(&seed).await?;
                info!(count = seed.len(), "Seeded default questions");
                Ok(seed)
            }
        }
    }

    pub async fn add(&self, draft: QuestionDraft) -> Result<Question, QuestionError> {
        check_text(&draft)?;
        let mut questions = self.list().await?;
        let id = next_id(&questions, Utc::now().timestamp_millis());
        let question = draft.into_question(id);
        questions.push(question.clone());
        self.persist(&questions).await?;
        info!(question_id = id, "Added question");
        Ok(question)
    }

    pub async fn update(
        &self,
        id: QuestionId,
        draft: QuestionDraft,
    ) -> Result<Question, QuestionError> {
        check_text(&draft)?;
        let mut questions = self.list().await?;
        let slot = questions
            .iter_mut()
            .find(|question| question.id == id)
            .ok_or(QuestionError::NotFound(id))?;
        *slot = draft.into_question(id);
        let updated = slot.clone();
        self.persist(&questions).await?;
        info!(question_id = id, "Updated question");
        Ok(updated)
    }

    pub async fn delete(&self, id: QuestionId) -> Result<(), QuestionError> {
        let mut questions = self.list().await?;
        let before = questions.len();
        questions.retain(|question| question.id != id);
        if questions.len() == before {
            return Err(QuestionError::NotFound(id));
        }
        self.persist(&questions).await?;
        info!(question_id = id, "Deleted question");
        Ok(())
    }
}

fn check_text(draft: &QuestionDraft) -> Result<(), QuestionError> {
    if draft.text.trim().is_empty() {
        return Err(QuestionError::EmptyText);
    }
    Ok(())
}

/// Millisecond timestamp, bumped past the largest id in use.
fn next_id(questions: &[Question], now_millis: i64) -> QuestionId {
    let max_existing = questions.iter().map(|question| question.id).max();
    match max_existing {
        Some(max) if max >= now_millis => max + 1,
        _ => now_millis,
    }
}

pub fn default_questions() -> Vec<Question> {
    let texts = [
        "Are you over 18 years old?",
        "Have you been formally employed for more than 12 months at your current job?",
        "Does your role have low turnover?",
        "Have you ever taken a payroll-deductible loan?",
        "Do you have other personal loans?",
        "Do you know a colleague at your company who took a payroll-deductible loan?",
        "Has your employer been active for more than 24 months?",
        "Has your employer changed its company registration in the last 12 months?",
        "Does your employer have more than 10 employees?",
    ];

    let mut questions: Vec<Question> = texts
        .iter()
        .zip(1..)
        .map(|(text, id)| Question {
            id,
            text: text.to_string(),
            kind: QuestionKind::YesNo,
            counts_toward_score: true,
            condition: None,
        })
        .collect();

    questions.push(Question {
        id: 10,
        text: "Do you have an account at Banco do Brasil?".to_string(),
        kind: QuestionKind::YesNo,
        counts_toward_score: false,
        condition: Some(DisplayCondition {
            depends_on: 6,
            required_answer: NO.to_string(),
        }),
    });

    questions
}
