use crate::validation::digits_only;
use chrono::{NaiveDate, Utc};
use csv::{QuoteStyle, WriterBuilder};
use serde::Deserialize;
use shared_types::{AdminStatsResponse, Question, ResponseRecord};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Encoding error: {0}")]
    Encoding(String),
}

/// Admin-side filters over the response table. All criteria are optional and
/// combined with AND.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseFilter {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl ResponseFilter {
    pub fn matches(&self, record: &ResponseRecord) -> bool {
        if let Some(name) = self.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            if !record.name.to_lowercase().contains(&name.to_lowercase()) {
                return false;
            }
        }

        if let Some(phone) = self.phone.as_deref().map(digits_only).filter(|p| !p.is_empty()) {
            if !digits_only(&record.phone).contains(&phone) {
                return false;
            }
        }

        let created = record.created_at.date_naive();
        if let Some(from) = self.from {
            if created < from {
                return false;
            }
        }
        // `to` covers the whole day.
        if let Some(to) = self.to {
            if created > to {
                return false;
            }
        }

        true
    }

    /// Matching records, newest first.
    pub fn apply(&self, records: Vec<ResponseRecord>) -> Vec<ResponseRecord> {
        let mut matching: Vec<ResponseRecord> =
            records.into_iter().filter(|r| self.matches(r)).collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matching
    }
}

/// Renders records as CSV with one column per question, every cell quoted.
pub fn to_csv(records: &[ResponseRecord], questions: &[Question]) -> Result<String, ExportError> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(Vec::new());

    let mut header = vec!["Name", "Phone", "Email", "Date"];
    header.extend(questions.iter().map(|q| q.text.as_str()));
    header.extend(["Yes", "No", "Approval"]);
    writer.write_record(&header)?;

    for record in records {
        let mut row = vec![
            record.name.clone(),
            record.phone.clone(),
            record.email.clone().unwrap_or_default(),
            record.created_at.format("%d/%m/%Y").to_string(),
        ];
        row.extend(questions.iter().map(|q| {
            record
                .answers
                .get(&q.id)
                .or_else(|| record.dates.get(&q.id))
                .cloned()
                .unwrap_or_default()
        }));
        row.push(record.yes_count.to_string());
        row.push(record.no_count.to_string());
        row.push(format!("{}%", record.approval_percent));
        writer.write_record(&row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Encoding(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ExportError::Encoding(e.to_string()))
}

pub fn to_json_pretty(records: &[ResponseRecord]) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// `responses_YYYY-MM-DD.<extension>` for the given day.
pub fn export_file_name(date: NaiveDate, extension: &str) -> String {
    format!("responses_{}.{}", date.format("%Y-%m-%d"), extension)
}

pub fn today_file_name(extension: &str) -> String {
    export_file_name(Utc::now().date_naive(), extension)
}

/// Dashboard totals. The average is the mean of per-record percentages.
pub fn summarize(records: &[ResponseRecord], active_questions: usize) -> AdminStatsResponse {
    let average = if records.is_empty() {
        0
    } else {
        let sum: u64 = records.iter().map(|r| u64::from(r.approval_percent)).sum();
        (sum as f64 / records.len() as f64).round() as u8
    };

    AdminStatsResponse {
        total_responses: records.len(),
        average_approval_percent: average,
        active_questions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use shared_types::{AnswerSet, QuestionKind, NO, YES};

    fn record(id: &str, name: &str, phone: &str, day: u32, percent: u8) -> ResponseRecord {
        let answers: AnswerSet = [(1, YES.to_string()), (2, NO.to_string())]
            .into_iter()
            .collect();
        ResponseRecord {
            id: id.to_string(),
            name: name.to_string(),
            phone: phone.to_string(),
            email: None,
            answers,
            dates: [(3, "2024-01-02".to_string())].into_iter().collect(),
            yes_count: 1,
            no_count: 1,
            approval_percent: percent,
            created_at: Utc.with_ymd_and_hms(2024, 3, day, 23, 30, 0).unwrap(),
        }
    }

    fn question(id: i64, text: &str) -> Question {
        Question {
            id,
            text: text.to_string(),
            kind: QuestionKind::YesNo,
            counts_toward_score: true,
            condition: None,
        }
    }

    fn sample() -> Vec<ResponseRecord> {
        vec![
            record("1", "Maria Souza", "(11) 98765-4321", 1, 50),
            record("2", "João Lima", "(21) 91234-5678", 5, 100),
            record("3", "Ana MARIA", "(11) 3456-7890", 10, 0),
        ]
    }

    #[test]
    fn test_filter_by_name_case_insensitive() {
        let filter = ResponseFilter {
            name: Some("maria".to_string()),
            ..Default::default()
        };
        let ids: Vec<String> = filter.apply(sample()).into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["3", "1"]);
    }

    #[test]
    fn test_filter_by_phone_digits() {
        let filter = ResponseFilter {
            phone: Some("(21) 9123".to_string()),
            ..Default::default()
        };
        let ids: Vec<String> = filter.apply(sample()).into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["2"]);
    }

    #[test]
    fn test_date_range_includes_end_of_day() {
        let filter = ResponseFilter {
            from: NaiveDate::from_ymd_opt(2024, 3, 1),
            to: NaiveDate::from_ymd_opt(2024, 3, 5),
            ..Default::default()
        };
        let ids: Vec<String> = filter.apply(sample()).into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["2", "1"]);
    }

    #[test]
    fn test_empty_filter_sorts_newest_first() {
        let ids: Vec<String> = ResponseFilter::default()
            .apply(sample())
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["3", "2", "1"]);
    }

    #[test]
    fn test_csv_layout() {
        let questions = vec![
            question(1, "Over 18?"),
            question(2, "Say \"no\""),
            question(3, "Start date"),
        ];
        let csv = to_csv(&sample()[..1], &questions).unwrap();
        let mut lines = csv.lines();

        assert_eq!(
            lines.next().unwrap(),
            r#""Name","Phone","Email","Date","Over 18?","Say ""no""","Start date","Yes","No","Approval""#
        );
        assert_eq!(
            lines.next().unwrap(),
            r#""Maria Souza","(11) 98765-4321","","01/03/2024","sim","nao","2024-01-02","1","1","50%""#
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_json_is_pretty() {
        let json = to_json_pretty(&sample()[..1]).unwrap();
        assert!(json.starts_with("[\n  {"));
        let parsed: Vec<ResponseRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, sample()[..1].to_vec());
    }

    #[test]
    fn test_file_names() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 9).unwrap();
        assert_eq!(export_file_name(date, "csv"), "responses_2024-07-09.csv");
        assert_eq!(export_file_name(date, "json"), "responses_2024-07-09.json");
    }

    #[test]
    fn test_summary() {
        let stats = summarize(&sample(), 10);
        assert_eq!(stats.total_responses, 3);
        assert_eq!(stats.average_approval_percent, 50);
        assert_eq!(stats.active_questions, 10);

        assert_eq!(summarize(&[], 4).average_approval_percent, 0);
    }
}
