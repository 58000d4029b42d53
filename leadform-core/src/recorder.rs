use crate::evaluator::evaluate;
use crate::messaging::MessageTemplate;
use crate::questions::QuestionStore;
use crate::settings::SettingsStore;
use crate::storage::{ResponseSink, StorageError};
use crate::validation::{format_phone, validate_submission, SubmissionError};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use shared_types::{ResponseRecord, SinkOutcome, SubmitRequest, SubmitResponse};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Which table a response listing is read from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    #[default]
    Local,
    Remote,
}

#[derive(Debug, Clone)]
pub struct Submission {
    pub record: ResponseRecord,
    pub remote: SinkOutcome,
    pub local: SinkOutcome,
    pub redirect_url: String,
}

impl From<Submission> for SubmitResponse {
    fn from(submission: Submission) -> Self {
        SubmitResponse {
            record: submission.record,
            remote: submission.remote,
            local: submission.local,
            redirect_url: submission.redirect_url,
        }
    }
}

/// Validates submissions and writes them to the remote table and the local
/// mirror. Neither sink failing stops the other.
#[derive(Clone)]
pub struct ResponseRecorder {
    questions: QuestionStore,
    settings: SettingsStore,
    remote: Option<Arc<dyn ResponseSink>>,
    local: Arc<dyn ResponseSink>,
    template: MessageTemplate,
}

impl ResponseRecorder {
    pub fn new(
        questions: QuestionStore,
        settings: SettingsStore,
        remote: Option<Arc<dyn ResponseSink>>,
        local: Arc<dyn ResponseSink>,
        template: MessageTemplate,
    ) -> Self {
        Self {
            questions,
            settings,
            remote,
            local,
            template,
        }
    }

    pub fn remote_enabled(&self) -> bool {
        self.remote.is_some()
    }

    pub async fn submit(&self, request: SubmitRequest) -> Result<Submission, SubmissionError> {
        let questions = self.questions.list().await?;

        validate_submission(&request, &questions)?;

        let evaluation = evaluate(&questions, &request.answers);
        let created_at = Utc::now();
        let email = request
            .email
            .map(|email| email.trim().to_string())
            .filter(|email| !email.is_empty());

        let record = ResponseRecord {
            id: next_response_id(created_at.timestamp_millis()).to_string(),
            name: request.name.trim().to_string(),
            phone: format_phone(&request.phone),
            email,
            answers: request.answers,
            dates: request.dates,
            yes_count: evaluation.yes_count,
            no_count: evaluation.no_count,
            approval_percent: evaluation.rounded_percent(),
            created_at,
        };

        let remote = match &self.remote {
            Some(sink) => match sink.insert(&record).await {
                Ok(()) => SinkOutcome::Stored,
                Err(e) => {
                    warn!(record_id = %record.id, error = %e, "Remote insert failed");
                    SinkOutcome::Failed {
                        reason: e.to_string(),
                    }
                }
            },
            None => SinkOutcome::Disabled,
        };

        let local = match self.local.insert(&record).await {
            Ok(()) => SinkOutcome::Stored,
            Err(e) => {
                error!(record_id = %record.id, error = %e, "Local mirror append failed");
                SinkOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        };

        let destination = match self.settings.destination().await {
            Ok(destination) => destination,
            Err(e) => {
                warn!(error = %e, "Falling back to default messaging destination");
                self.settings.default_destination().to_string()
            }
        };

        info!(
            record_id = %record.id,
            approval_percent = record.approval_percent,
            remote_stored = remote.is_stored(),
            local_stored = local.is_stored(),
            "Recorded submission"
        );

        Ok(Submission {
            redirect_url: self.template.deep_link(&destination),
            record,
            remote,
            local,
        })
    }

    pub async fn responses(
        &self,
        source: ResponseSource,
    ) -> Result<Vec<ResponseRecord>, StorageError> {
        match source {
            ResponseSource::Local => self.local.list().await,
            ResponseSource::Remote => match &self.remote {
                Some(sink) => sink.list().await,
                None => Err(StorageError::Unavailable(
                    "remote store is not configured".to_string(),
                )),
            },
        }
    }
}

static LAST_RESPONSE_ID: AtomicI64 = AtomicI64::new(0);

/// Millisecond timestamp, bumped past the last id handed out by this process.
fn next_response_id(now_millis: i64) -> i64 {
    let mut last = LAST_RESPONSE_ID.load(Ordering::SeqCst);
    loop {
        let next = now_millis.max(last + 1);
        match LAST_RESPONSE_ID.compare_exchange_weak(last, next, Ordering::SeqCst, Ordering::SeqCst)
        {
            Ok(_) => return next,
            Err(current) => last = current,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{InMemoryKeyValueStore, LocalMirror};
    use async_trait::async_trait;
    use shared_types::{AnswerSet, NO, YES};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        records: Mutex<Vec<ResponseRecord>>,
        fail: bool,
    }

    #[async_trait]
    impl ResponseSink for RecordingSink {
        async fn insert(&self, record: &ResponseRecord) -> Result<(), StorageError> {
            if self.fail {
                return Err(StorageError::Unavailable("connection refused".to_string()));
            }
            self.records.lock().unwrap().push(record.clone());
            Ok(())
        }

        async fn list(&self) -> Result<Vec<ResponseRecord>, StorageError> {
            Ok(self.records.lock().unwrap().clone())
        }
    }

    fn recorder(remote: Option<Arc<dyn ResponseSink>>) -> (ResponseRecorder, LocalMirror) {
        let kv = Arc::new(InMemoryKeyValueStore::new());
        let local = LocalMirror::new(kv.clone());
        let recorder = ResponseRecorder::new(
            QuestionStore::new(kv.clone()),
            SettingsStore::new(kv),
            remote,
            Arc::new(local.clone()),
            MessageTemplate::new("Hello"),
        );
        (recorder, local)
    }

    fn all_yes() -> AnswerSet {
        (1..=9).map(|id| (id, YES.to_string())).collect()
    }

    fn request(answers: AnswerSet) -> SubmitRequest {
        SubmitRequest {
            name: " Maria Souza ".to_string(),
            phone: "11987654321".to_string(),
            email: Some(String::new()),
            answers,
            dates: AnswerSet::new(),
        }
    }

    #[tokio::test]
    async fn test_submit_builds_record_and_link() {
        let (recorder, local) = recorder(None);
        let submission = recorder.submit(request(all_yes())).await.unwrap();

        assert_eq!(submission.record.name, "Maria Souza");
        assert_eq!(submission.record.phone, "(11) 98765-4321");
        assert_eq!(submission.record.email, None);
        assert_eq!(submission.record.yes_count, 9);
        assert_eq!(submission.record.approval_percent, 100);
        let id: i64 = submission.record.id.parse().unwrap();
        assert!(id >= submission.record.created_at.timestamp_millis());
        assert_eq!(submission.remote, SinkOutcome::Disabled);
        assert_eq!(submission.local, SinkOutcome::Stored);
        assert_eq!(
            submission.redirect_url,
            "https://wa.me/5511999999999?text=Hello"
        );
        assert_eq!(local.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_conditional_question_required_when_visible() {
        let (recorder, local) = recorder(None);
        let mut answers = all_yes();
        answers.insert(6, NO.to_string());

        let err = recorder.submit(request(answers.clone())).await.unwrap_err();
        assert_eq!(err.category(), "incomplete_answers");
        assert!(local.list().await.unwrap().is_empty());

        answers.insert(10, YES.to_string());
        let submission = recorder.submit(request(answers)).await.unwrap();
        // Question 10 does not count toward the score.
        assert_eq!(submission.record.yes_count, 8);
        assert_eq!(submission.record.no_count, 1);
        assert_eq!(submission.record.approval_percent, 89);
    }

    #[tokio::test]
    async fn test_local_write_survives_remote_failure() {
        let remote: Arc<dyn ResponseSink> = Arc::new(RecordingSink {
            fail: true,
            ..Default::default()
        });
        let (recorder, local) = recorder(Some(remote));

        let submission = recorder.submit(request(all_yes())).await.unwrap();
        assert!(matches!(submission.remote, SinkOutcome::Failed { .. }));
        assert_eq!(submission.local, SinkOutcome::Stored);
        assert_eq!(local.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_both_sinks_receive_record() {
        let remote: Arc<dyn ResponseSink> = Arc::new(RecordingSink::default());
        let (recorder, _) = recorder(Some(remote));

        let submission = recorder.submit(request(all_yes())).await.unwrap();
        assert_eq!(submission.remote, SinkOutcome::Stored);

        let remote_records = recorder.responses(ResponseSource::Remote).await.unwrap();
        let local_records = recorder.responses(ResponseSource::Local).await.unwrap();
        assert_eq!(remote_records, local_records);
    }

    #[test]
    fn test_ids_distinct_within_same_millisecond() {
        let first = next_response_id(1_000);
        let second = next_response_id(1_000);
        assert!(second > first);
        assert!(first >= 1_000);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_submissions_get_unique_ids() {
        let (recorder, local) = recorder(None);
        let recorder = Arc::new(recorder);

        let handles: Vec<_> = (0..20)
            .map(|_| {
                let recorder = recorder.clone();
                tokio::spawn(async move { recorder.submit(request(all_yes())).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let mut ids: Vec<String> = local.list().await.unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids.len(), 20);
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 20);
    }

    #[tokio::test]
    async fn test_remote_listing_without_remote() {
        let (recorder, _) = recorder(None);
        assert!(matches!(
            recorder.responses(ResponseSource::Remote).await,
            Err(StorageError::Unavailable(_))
        ));
    }
}
