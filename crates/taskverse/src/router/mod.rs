//! Intent routing - picks one capability for an utterance and runs it

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::{
    capability::{Capability, CapabilityOutcome, CapabilityScope, ErrorKind},
    email::EmailCapability,
    tasks::TaskStore,
    Result, TaskverseError,
};

mod keyword;
mod llm;

pub use keyword::KeywordClassifier;
pub use llm::LlmClassifier;

/// Reply used when classification fails or yields nothing runnable
pub const ACKNOWLEDGEMENT: &str =
    "Got it. I wasn't able to act on that, could you rephrase your request?";

/// Chooses a capability and extracts its arguments from free text
#[async_trait]
pub trait Classifier: Send + Sync {
    fn name(&self) -> &'static str;

    async fn classify(
        &self,
        scope: CapabilityScope,
        utterance: &str,
        history: &str,
    ) -> Result<Capability>;
}

/// Result of routing one utterance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteOutcome {
    /// Name of the capability that ran, if any did
    pub capability: Option<&'static str>,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl RouteOutcome {
    fn ran(capability: &Capability, outcome: CapabilityOutcome) -> Self {
        Self {
            capability: Some(capability.name()),
            text: outcome.text,
            error_kind: outcome.error_kind,
        }
    }

    fn acknowledged(kind: ErrorKind) -> Self {
        Self {
            capability: None,
            text: ACKNOWLEDGEMENT.to_string(),
            error_kind: Some(kind),
        }
    }
}

/// Routes utterances through a swappable classifier to the capability handlers
pub struct IntentRouter {
    classifier: Arc<dyn Classifier>,
    tasks: Arc<RwLock<TaskStore>>,
    email: Arc<EmailCapability>,
    timeout: Duration,
}

impl IntentRouter {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        tasks: Arc<RwLock<TaskStore>>,
        email: Arc<EmailCapability>,
        timeout: Duration,
    ) -> Self {
        Self {
            classifier,
            tasks,
            email,
            timeout,
        }
    }

    pub fn classifier_name(&self) -> &'static str {
        self.classifier.name()
    }

    /// Classify under the external-call timeout and enforce scope eligibility
    pub async fn classify(
        &self,
        scope: CapabilityScope,
        utterance: &str,
        history: &str,
    ) -> Result<Capability> {
        let capability = tokio::time::timeout(
            self.timeout,
            self.classifier.classify(scope, utterance, history),
        )
        .await
        .map_err(|_| TaskverseError::Timeout(self.timeout))??;

        if !capability.allowed_in(scope) {
            return Err(TaskverseError::ClassificationError(format!(
                "{} is not available in the {} scope",
                capability.name(),
                scope
            )));
        }

        Ok(capability)
    }

    pub async fn route(&self, scope: CapabilityScope, utterance: &str, history: &str) -> RouteOutcome {
        let capability = match self.classify(scope, utterance, history).await {
            Ok(capability) => capability,
            Err(e) => {
                tracing::warn!(
                    classifier = self.classifier.name(),
                    %scope,
                    "Classification failed: {}",
                    e
                );
                return RouteOutcome::acknowledged(e.kind());
            }
        };

        tracing::info!(capability = capability.name(), %scope, "Running capability");
        let outcome = self.execute(&capability).await;
        RouteOutcome::ran(&capability, outcome)
    }

    /// Run a capability. Store locks cover only the in-memory mutation.
    pub async fn execute(&self, capability: &Capability) -> CapabilityOutcome {
        match capability {
            Capability::AddTask {
                description,
                date,
                time,
            } => self
                .tasks
                .write()
                .await
                .add(description.as_str(), date.as_str(), time.as_str()),
            Capability::DeleteTask { description } => self.tasks.write().await.delete(description),
            Capability::UpdateTask {
                description,
                new_description,
                new_date,
                new_time,
            } => self
                .tasks
                .write()
                .await
                .update(description, new_description, new_date, new_time),
            Capability::Summarize => CapabilityOutcome::ok(self.tasks.read().await.summary()),
            Capability::SendEmail {
                content,
                subject,
                recipient,
            } => self.email.send(content, subject, recipient).await,
            Capability::Chat { reply } => CapabilityOutcome::ok(reply.clone()),
        }
    }
}
