use crate::evaluator::{answer_for, visible_questions};
use crate::questions::QuestionError;
use crate::storage::StorageError;
use regex::Regex;
use shared_types::{Question, QuestionId, SubmitRequest};
use std::sync::OnceLock;

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Phone number must have 10 or 11 digits")]
    InvalidPhone,

    #[error("Email address is not valid")]
    InvalidEmail,

    #[error("Unanswered questions: {unanswered:?}")]
    IncompleteAnswers { unanswered: Vec<QuestionId> },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Questions(#[from] QuestionError),
}

impl SubmissionError {
    /// Machine-readable category returned to the client.
    pub fn category(&self) -> &'static str {
        match self {
            SubmissionError::MissingField(_) => "missing_field",
            SubmissionError::InvalidPhone => "invalid_phone",
            SubmissionError::InvalidEmail => "invalid_email",
            SubmissionError::IncompleteAnswers { .. } => "incomplete_answers",
            SubmissionError::Storage(_) | SubmissionError::Questions(_) => "storage_error",
        }
    }
}

pub fn digits_only(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

pub fn is_valid_phone(phone: &str) -> bool {
    (10..=11).contains(&digits_only(phone).len())
}

/// Renders a phone number as `(DD) NNNNN-NNNN`, or `(DD) NNNN-NNNN` for
/// ten-digit landlines. Anything else is returned as the bare digits.
pub fn format_phone(phone: &str) -> String {
    let digits = digits_only(phone);
    match digits.len() {
        11 => format!("({}) {}-{}", &digits[..2], &digits[2..7], &digits[7..]),
        10 => format!("({}) {}-{}", &digits[..2], &digits[2..6], &digits[6..]),
        _ => digits,
    }
}

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap())
}

pub fn is_valid_email(email: &str) -> bool {
    email_pattern().is_match(email)
}

/// Checks a submission in order: required fields, phone, email, then answers
/// to every currently visible question.
pub fn validate_submission(
    request: &SubmitRequest,
    questions: &[Question],
) -> Result<(), SubmissionError> {
    if request.name.trim().is_empty() {
        return Err(SubmissionError::MissingField("name"));
    }
    if request.phone.trim().is_empty() {
        return Err(SubmissionError::MissingField("phone"));
    }
    if !is_valid_phone(&request.phone) {
        return Err(SubmissionError::InvalidPhone);
    }
    if let Some(email) = request.email.as_deref().map(str::trim) {
        if !email.is_empty() && !is_valid_email(email) {
            return Err(SubmissionError::InvalidEmail);
        }
    }

    let unanswered: Vec<QuestionId> = visible_questions(questions, &request.answers)
        .into_iter()
        .filter(|question| answer_for(&request.answers, question.id).is_none())
        .map(|question| question.id)
        .collect();

    if !unanswered.is_empty() {
        return Err(SubmissionError::IncompleteAnswers { unanswered });
    }

    Ok(())
}
