//! Domain logic for the lead qualification questionnaire: question storage,
//! visibility and scoring, submission recording, admin access and exports.

pub mod evaluator;
pub mod export;
pub mod gate;
pub mod messaging;
pub mod questions;
pub mod recorder;
pub mod settings;
pub mod storage;
pub mod validation;

pub use evaluator::{evaluate, is_visible, visible_questions, Evaluation};
pub use export::{ExportError, ResponseFilter};
pub use gate::{AdminGate, CredentialHasher, GateConfig, GateError};
pub use messaging::MessageTemplate;
pub use questions::{QuestionError, QuestionStore};
pub use recorder::{ResponseRecorder, ResponseSource, Submission};
pub use settings::{SettingsError, SettingsStore};
pub use storage::{
    AdminCredential, CredentialStore, InMemoryKeyValueStore, KeyValueStore, LocalCredentialStore,
    LocalMirror, ResponseSink, StorageError,
};
pub use validation::SubmissionError;
