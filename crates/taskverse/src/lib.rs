//! # TaskVerse - conversational task assistant
//!
//! Routes free-text utterances to a fixed set of capabilities (task
//! bookkeeping, task summaries, outgoing email, general chat) and keeps a
//! short per-session transcript that is fed back to the router as context.

pub mod assistant;
pub mod brain;
pub mod capability;
pub mod config;
pub mod email;
pub mod router;
pub mod session;
pub mod tasks;

#[cfg(test)]
mod assistant_tests;
#[cfg(test)]
mod test_support;

pub use assistant::{Assistant, AssistantReply};
pub use capability::{Capability, CapabilityOutcome, CapabilityScope, ErrorKind};
pub use config::{ClassifierKind, TaskverseConfig};
pub use email::{EmailCapability, MailTransport, OutgoingEmail, SenderCredentials, SmtpConfig};
pub use router::{Classifier, IntentRouter, KeywordClassifier, LlmClassifier, RouteOutcome};
pub use session::{Session, SessionLedger};
pub use tasks::{Task, TaskId, TaskStore};

/// Main error type for TaskVerse operations
#[derive(Debug, thiserror::Error)]
pub enum TaskverseError {
    #[error("LLM error: {0}")]
    LLMError(#[from] brain::ProviderError),

    #[error("Classification error: {0}")]
    ClassificationError(String),

    #[error("External call timed out after {0:?}")]
    Timeout(std::time::Duration),
}

impl TaskverseError {
    /// Machine-readable kind reported alongside the user-facing text
    pub fn kind(&self) -> ErrorKind {
        match self {
            TaskverseError::Timeout(_) => ErrorKind::UpstreamTimeout,
            TaskverseError::LLMError(_) | TaskverseError::ClassificationError(_) => {
                ErrorKind::UpstreamFailure
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, TaskverseError>;

/// Build the assistant from configuration
pub fn initialize_assistant(config: TaskverseConfig) -> Assistant {
    tracing::info!(
        classifier = %config.classifier,
        timeout_secs = config.external_timeout.as_secs(),
        "Initializing TaskVerse assistant..."
    );

    let assistant = Assistant::from_config(config);

    tracing::info!("TaskVerse assistant initialized");
    assistant
}
