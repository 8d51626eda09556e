//! LLM provider abstraction used by the tool-calling classifier

mod openai;
mod provider_trait;

pub use openai::OpenAIProvider;
pub use provider_trait::{
    ChatConfig, ChatMessage, ChatRequest, LLMProviderTrait, MessageRole, ProviderError,
    ProviderResponse, ProviderType, TokenUsage, ToolCallRequest, ToolDefinition,
};
