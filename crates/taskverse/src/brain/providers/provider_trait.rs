//! Provider trait and common types for LLM tool calling

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Supported LLM provider types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    #[default]
    OpenAI,
    /// Ollama or any other OpenAI-compatible server
    Compatible,
}

impl std::fmt::Display for ProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderType::OpenAI => write!(f, "openai"),
            ProviderType::Compatible => write!(f, "compatible"),
        }
    }
}

/// Error type for provider operations
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Response parse error: {0}")]
    ParseError(String),

    #[error("Authentication failed: {0}")]
    AuthError(String),
}

/// Role of a message in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
}

/// A message in the conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// A tool call requested by the LLM
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRequest {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

/// Tool definition for function calling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Configuration for a chat request
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.2,
            max_tokens: 600,
        }
    }
}

/// A complete chat request
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub tools: Option<Vec<ToolDefinition>>,
    pub config: ChatConfig,
}

/// Response from an LLM provider
#[derive(Debug, Clone)]
pub enum ProviderResponse {
    /// Text response from the LLM
    Text {
        content: String,
        usage: Option<TokenUsage>,
    },
    /// LLM wants to call tools
    ToolCalls {
        calls: Vec<ToolCallRequest>,
        usage: Option<TokenUsage>,
    },
}

impl ProviderResponse {
    /// Get the text content if this is a text response
    pub fn text(&self) -> Option<&str> {
        match self {
            ProviderResponse::Text { content, .. } => Some(content),
            ProviderResponse::ToolCalls { .. } => None,
        }
    }

    /// Get the tool calls if this is a tool call response
    pub fn tool_calls(&self) -> Option<&[ToolCallRequest]> {
        match self {
            ProviderResponse::Text { .. } => None,
            ProviderResponse::ToolCalls { calls, .. } => Some(calls),
        }
    }

    pub fn usage(&self) -> Option<&TokenUsage> {
        match self {
            ProviderResponse::Text { usage, .. } => usage.as_ref(),
            ProviderResponse::ToolCalls { usage, .. } => usage.as_ref(),
        }
    }
}

/// Token usage information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
}

/// Trait that all LLM providers must implement
#[async_trait]
pub trait LLMProviderTrait: Send + Sync {
    fn provider_type(&self) -> ProviderType;

    /// Provider name for logging
    fn name(&self) -> &'static str;

    /// Check if this provider is properly configured and ready
    fn is_configured(&self) -> bool;

    /// Send a chat request and get a response
    async fn chat(&self, request: ChatRequest) -> Result<ProviderResponse, ProviderError>;
}
