//! Question visibility and approval scoring.
//!
//! Everything here is a pure function of the question list and the current
//! answers; callers re-run it on every change.

use shared_types::{
    AnswerSet, ApprovalBand, EvaluationResponse, Question, QuestionId, NO, YES,
};

/// Returns the recorded answer for `id`, treating an empty string as unanswered.
pub fn answer_for(answers: &AnswerSet, id: QuestionId) -> Option<&str> {
    answers
        .get(&id)
        .map(String::as_str)
        .filter(|answer| !answer.is_empty())
}

/// A question without a condition is always visible. A conditional question is
/// visible only when the referenced answer matches exactly, so a condition that
/// points at an unknown question keeps it hidden.
pub fn is_visible(question: &Question, answers: &AnswerSet) -> bool {
    match &question.condition {
        None => true,
        Some(condition) => {
            answers.get(&condition.depends_on).map(String::as_str)
                == Some(condition.required_answer.as_str())
        }
    }
}

pub fn visible_questions<'a>(questions: &'a [Question], answers: &AnswerSet) -> Vec<&'a Question> {
    questions
        .iter()
        .filter(|question| is_visible(question, answers))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub visible_question_ids: Vec<QuestionId>,
    pub yes_count: u32,
    pub no_count: u32,
    pub approval_percent: f64,
    pub band: ApprovalBand,
}

impl Evaluation {
    /// Percentage rounded half away from zero, for display and storage.
    pub fn rounded_percent(&self) -> u8 {
        self.approval_percent.round().clamp(0.0, 100.0) as u8
    }
}

pub fn evaluate(questions: &[Question], answers: &AnswerSet) -> Evaluation {
    let visible = visible_questions(questions, answers);

    let scored: Vec<&str> = visible
        .iter()
        .filter(|question| question.counts_toward_score)
        .filter_map(|question| answer_for(answers, question.id))
        .collect();

    let yes_count = scored.iter().filter(|answer| **answer == YES).count() as u32;
    let no_count = scored.iter().filter(|answer| **answer == NO).count() as u32;

    Evaluation {
        visible_question_ids: visible.iter().map(|question| question.id).collect(),
        yes_count,
        no_count,
        approval_percent: approval_percent(yes_count, no_count),
        band: band_for(yes_count, no_count),
    }
}

pub fn approval_percent(yes_count: u32, no_count: u32) -> f64 {
    let total = yes_count + no_count;
    if total == 0 {
        return 0.0;
    }
    f64::from(yes_count) / f64::from(total) * 100.0
}

/// Bands are decided by the number of negative answers, not by the percentage.
pub fn band_for(yes_count: u32, no_count: u32) -> ApprovalBand {
    if yes_count + no_count == 0 {
        return ApprovalBand::Neutral;
    }
    match no_count {
        0 => ApprovalBand::Excellent,
        1 => ApprovalBand::Moderate,
        _ => ApprovalBand::Low,
    }
}

pub fn band_message(band: ApprovalBand) -> &'static str {
    match band {
        ApprovalBand::Neutral => "Answer the questions to see your chances",
        ApprovalBand::Excellent => "Excellent! Your chances are very high!",
        ApprovalBand::Moderate => "Good chances! Let's review your profile.",
        ApprovalBand::Low => "Let's find alternatives for you.",
    }
}

/// Theme token the client maps to its palette.
pub fn band_color(band: ApprovalBand) -> &'static str {
    match band {
        ApprovalBand::Neutral => "muted",
        ApprovalBand::Excellent => "success",
        ApprovalBand::Moderate => "warning",
        ApprovalBand::Low => "destructive",
    }
}

impl From<Evaluation> for EvaluationResponse {
    fn from(evaluation: Evaluation) -> Self {
        let approval_percent_rounded = evaluation.rounded_percent();
        EvaluationResponse {
            visible_question_ids: evaluation.visible_question_ids,
            yes_count: evaluation.yes_count,
            no_count: evaluation.no_count,
            approval_percent: evaluation.approval_percent,
            approval_percent_rounded,
            band: evaluation.band,
            message: band_message(evaluation.band).to_string(),
            color: band_color(evaluation.band).to_string(),
        }
    }
}
