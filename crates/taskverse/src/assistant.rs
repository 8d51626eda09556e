//! The assistant service object: task store, sessions and router wired together

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::{
    brain,
    capability::{CapabilityOutcome, CapabilityScope, ErrorKind},
    config::{ClassifierKind, TaskverseConfig},
    email::EmailCapability,
    router::{Classifier, IntentRouter, KeywordClassifier, LlmClassifier},
    session::{Session, SessionLedger},
    tasks::{Task, TaskId, TaskStore},
};

/// Reply to a routed utterance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantReply {
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

/// Constructed once at start-up and shared with every handler
#[derive(Clone)]
pub struct Assistant {
    tasks: Arc<RwLock<TaskStore>>,
    sessions: Arc<SessionLedger>,
    router: Arc<IntentRouter>,
}

impl Assistant {
    pub fn new(classifier: Arc<dyn Classifier>, email: EmailCapability, timeout: Duration) -> Self {
        let tasks = Arc::new(RwLock::new(TaskStore::new()));
        let router = IntentRouter::new(classifier, tasks.clone(), Arc::new(email), timeout);

        Self {
            tasks,
            sessions: Arc::new(SessionLedger::new()),
            router: Arc::new(router),
        }
    }

    pub fn from_config(config: TaskverseConfig) -> Self {
        let classifier: Arc<dyn Classifier> = match config.classifier {
            ClassifierKind::Llm => {
                let provider = brain::create_provider(&config.llm, config.openai_api_key.clone());
                if !provider.is_configured() {
                    tracing::warn!(
                        provider = provider.name(),
                        "LLM provider has no credentials; classification requests will fail"
                    );
                }
                Arc::new(LlmClassifier::new(provider, config.llm.clone()))
            }
            ClassifierKind::Keyword => Arc::new(KeywordClassifier::new()),
        };
        let email = EmailCapability::from_config(&config.smtp, config.external_timeout);

        Self::new(classifier, email, config.external_timeout)
    }

    pub fn classifier_name(&self) -> &'static str {
        self.router.classifier_name()
    }

    /// Route an utterance within a scope and record the exchange in the
    /// caller's session. No lock is held while the classifier runs.
    pub async fn handle(
        &self,
        scope: CapabilityScope,
        utterance: &str,
        session_id: Option<&str>,
    ) -> AssistantReply {
        let session = self.sessions.resolve(session_id).await;
        let (id, created_at, history) = {
            let session = session.lock().await;
            (session.id.clone(), session.created_at, session.recent_text())
        };

        tracing::info!(session_id = %id, %scope, "Handling utterance");
        let outcome = self.router.route(scope, utterance, &history).await;

        session.lock().await.record_turn(utterance, &outcome.text);

        AssistantReply {
            session_id: id,
            created_at,
            response: outcome.text,
            error_kind: outcome.error_kind,
        }
    }

    pub async fn add_task(&self, description: &str, date: &str, time: &str) -> CapabilityOutcome {
        self.tasks.write().await.add(description, date, time)
    }

    pub async fn summarize_tasks(&self) -> String {
        self.tasks.read().await.summary()
    }

    pub async fn active_tasks(&self) -> Vec<Task> {
        self.tasks.read().await.list_active()
    }

    pub async fn all_tasks(&self) -> Vec<Task> {
        self.tasks.read().await.list_all()
    }

    pub async fn get_task(&self, id: TaskId) -> Option<Task> {
        self.tasks.read().await.get(id).cloned()
    }

    pub async fn delete_task_by_id(&self, id: TaskId) -> CapabilityOutcome {
        self.tasks.write().await.delete_by_id(id)
    }

    pub async fn update_task_by_id(
        &self,
        id: TaskId,
        description: &str,
        date: &str,
        time: &str,
    ) -> CapabilityOutcome {
        self.tasks
            .write()
            .await
            .update_by_id(id, description, date, time)
    }

    pub async fn new_session(&self) -> Session {
        let handle = self.sessions.create().await;
        let session = handle.lock().await;
        session.clone()
    }

    pub async fn reset_session(&self, id: &str) -> Option<Session> {
        let handle = self.sessions.reset(id).await?;
        let session = handle.lock().await;
        Some(session.clone())
    }

    pub async fn remove_session(&self, id: &str) -> bool {
        self.sessions.remove(id).await
    }

    pub async fn transcript(&self, id: &str) -> Option<Session> {
        self.sessions.transcript(id).await
    }
}
