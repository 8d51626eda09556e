//! Tool-calling LLM classifier

use std::sync::Arc;

use async_trait::async_trait;

use super::Classifier;
use crate::{
    brain::{ChatMessage, ChatRequest, LLMConfig, LLMProviderTrait, ProviderResponse},
    capability::{tools_for_scope, Capability, CapabilityScope},
    Result, TaskverseError,
};

/// Lets the model pick a tool from the scope's tool set. The first tool call
/// becomes the capability; a plain answer becomes a chat reply.
pub struct LlmClassifier {
    provider: Arc<dyn LLMProviderTrait>,
    config: LLMConfig,
}

impl LlmClassifier {
    pub fn new(provider: Arc<dyn LLMProviderTrait>, config: LLMConfig) -> Self {
        Self { provider, config }
    }

    fn build_request(&self, scope: CapabilityScope, utterance: &str, history: &str) -> ChatRequest {
        let now = chrono::Local::now().format("%Y-%m-%d %H:%M (%A)");
        let mut messages = vec![ChatMessage::system(format!(
            "{}\nCurrent date and time: {}",
            self.config.system_prompt, now
        ))];

        if !history.trim().is_empty() {
            messages.push(ChatMessage::system(format!(
                "Recent conversation:\n{}",
                history
            )));
        }
        messages.push(ChatMessage::user(utterance));

        let tools = tools_for_scope(scope);
        ChatRequest {
            messages,
            tools: if tools.is_empty() { None } else { Some(tools) },
            config: self.config.chat_config(),
        }
    }
}

#[async_trait]
impl Classifier for LlmClassifier {
    fn name(&self) -> &'static str {
        "llm"
    }

    async fn classify(
        &self,
        scope: CapabilityScope,
        utterance: &str,
        history: &str,
    ) -> Result<Capability> {
        let request = self.build_request(scope, utterance, history);

        let response = self.provider.chat(request).await?;

        if let Some(usage) = response.usage() {
            tracing::debug!(
                provider = self.provider.name(),
                total_tokens = usage.total_tokens,
                "LLM classification complete"
            );
        }

        match response {
            ProviderResponse::ToolCalls { calls, .. } => {
                if calls.len() > 1 {
                    tracing::debug!("LLM requested {} tool calls, using the first", calls.len());
                }
                let call = calls.first().ok_or_else(|| {
                    TaskverseError::ClassificationError("empty tool call list".to_string())
                })?;
                Capability::from_tool_call(call).map_err(TaskverseError::ClassificationError)
            }
            ProviderResponse::Text { content, .. } if content.trim().is_empty() => Err(
                TaskverseError::ClassificationError("LLM returned an empty reply".to_string()),
            ),
            ProviderResponse::Text { content, .. } => Ok(Capability::Chat { reply: content }),
        }
    }
}
