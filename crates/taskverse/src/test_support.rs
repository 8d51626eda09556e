//! Stub collaborators shared by the unit tests

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex as StdMutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    brain::{
        ChatRequest, LLMProviderTrait, ProviderError, ProviderResponse, ProviderType,
        ToolCallRequest,
    },
    email::{EmailError, MailTransport, OutgoingEmail, SenderCredentials},
};

/// Records every submission instead of talking to a server
#[derive(Default)]
pub struct RecordingTransport {
    pub calls: AtomicUsize,
    pub sent: Mutex<Vec<OutgoingEmail>>,
    pub fail_with: Option<String>,
    pub delay: Option<Duration>,
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn submit(
        &self,
        _sender: &SenderCredentials,
        email: &OutgoingEmail,
    ) -> Result<(), EmailError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(msg) = &self.fail_with {
            return Err(EmailError::Transport(msg.clone()));
        }
        self.sent.lock().await.push(email.clone());
        Ok(())
    }
}

/// Replays canned responses and remembers the requests it saw
pub struct ScriptedProvider {
    pub responses: StdMutex<Vec<std::result::Result<ProviderResponse, ProviderError>>>,
    pub requests: StdMutex<Vec<ChatRequest>>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<std::result::Result<ProviderResponse, ProviderError>>) -> Self {
        Self {
            responses: StdMutex::new(responses),
            requests: StdMutex::new(Vec::new()),
        }
    }

    pub fn tool_call(name: &str, arguments: serde_json::Value) -> ProviderResponse {
        ProviderResponse::ToolCalls {
            calls: vec![ToolCallRequest {
                id: "call_1".to_string(),
                name: name.to_string(),
                arguments,
            }],
            usage: None,
        }
    }

    pub fn text(content: &str) -> ProviderResponse {
        ProviderResponse::Text {
            content: content.to_string(),
            usage: None,
        }
    }
}

#[async_trait]
impl LLMProviderTrait for ScriptedProvider {
    fn provider_type(&self) -> ProviderType {
        ProviderType::Compatible
    }

    fn name(&self) -> &'static str {
        "scripted"
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn chat(
        &self,
        request: ChatRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        self.requests.lock().unwrap().push(request);
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Err(ProviderError::RequestFailed("no scripted response".to_string()));
        }
        responses.remove(0)
    }
}
