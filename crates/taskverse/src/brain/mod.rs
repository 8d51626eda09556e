use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub mod providers;
pub use providers::{
    ChatConfig, ChatMessage, ChatRequest, LLMProviderTrait, MessageRole, OpenAIProvider,
    ProviderError, ProviderResponse, ProviderType, TokenUsage, ToolCallRequest, ToolDefinition,
};

/// Configuration for the tool-calling classifier's model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LLMConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub system_prompt: String,
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.2,
            max_tokens: 600,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            endpoint: None,
        }
    }
}

impl LLMConfig {
    pub fn chat_config(&self) -> ChatConfig {
        ChatConfig {
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are TaskVerse, a concise personal assistant. \
You keep the user's schedule of tasks and can send emails for them. \
When a tool fits the request, call exactly one tool with arguments taken from the user's words. \
Resolve relative dates such as 'tomorrow' against the current date and time given below. \
When no tool fits, answer the user directly in one or two sentences.";

/// Build the provider described by the configuration
pub fn create_provider(config: &LLMConfig, api_key: Option<String>) -> Arc<dyn LLMProviderTrait> {
    match config.endpoint.as_deref() {
        Some(endpoint) => Arc::new(OpenAIProvider::with_endpoint(api_key, endpoint)),
        None => Arc::new(OpenAIProvider::new(api_key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_config_default() {
        let config = LLMConfig::default();

        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.temperature, 0.2);
        assert_eq!(config.max_tokens, 600);
        assert!(config.system_prompt.contains("TaskVerse"));
        assert!(config.endpoint.is_none());
    }

    #[test]
    fn test_llm_config_serialization() {
        let config = LLMConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("maxTokens"));

        let deserialized: LLMConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.model, config.model);
        assert_eq!(deserialized.max_tokens, config.max_tokens);
    }

    #[test]
    fn test_create_provider_honours_endpoint() {
        let mut config = LLMConfig::default();
        let provider = create_provider(&config, None);
        assert_eq!(provider.provider_type(), ProviderType::OpenAI);
        assert!(!provider.is_configured());

        config.endpoint = Some("http://localhost:11434/v1/chat/completions".to_string());
        let provider = create_provider(&config, None);
        assert_eq!(provider.provider_type(), ProviderType::Compatible);
        assert!(provider.is_configured());
    }
}
