//! OpenAI chat-completions provider (also serves OpenAI-compatible servers)

use async_trait::async_trait;
use reqwest::Client;

use super::provider_trait::{
    ChatMessage, ChatRequest, LLMProviderTrait, MessageRole, ProviderError, ProviderResponse,
    ProviderType, TokenUsage, ToolCallRequest, ToolDefinition,
};

const OPENAI_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// OpenAI API provider
pub struct OpenAIProvider {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
    provider_type: ProviderType,
}

impl OpenAIProvider {
    pub fn new(api_key: Option<String>) -> Self {
        if api_key.is_some() {
            tracing::info!("OpenAI provider initialized with API key");
        } else {
            tracing::warn!("OpenAI provider created without API key - OPENAI_API_KEY not set");
        }

        Self {
            client: Client::new(),
            api_key,
            endpoint: OPENAI_ENDPOINT.to_string(),
            provider_type: ProviderType::OpenAI,
        }
    }

    /// Point at an OpenAI-compatible server (e.g. a local Ollama)
    pub fn with_endpoint(api_key: Option<String>, endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        tracing::info!("Using OpenAI-compatible endpoint {}", endpoint);
        Self {
            client: Client::new(),
            api_key,
            endpoint,
            provider_type: ProviderType::Compatible,
        }
    }

    fn message_to_openai(&self, msg: &ChatMessage) -> serde_json::Value {
        let role = match msg.role {
            MessageRole::System => "system",
            MessageRole::User => "user",
        };

        serde_json::json!({
            "role": role,
            "content": msg.content
        })
    }

    fn tool_to_openai(&self, tool: &ToolDefinition) -> serde_json::Value {
        serde_json::json!({
            "type": "function",
            "function": {
                "name": tool.name,
                "description": tool.description,
                "parameters": tool.parameters
            }
        })
    }

    fn build_payload(&self, request: &ChatRequest) -> serde_json::Value {
        let messages: Vec<serde_json::Value> = request
            .messages
            .iter()
            .map(|m| self.message_to_openai(m))
            .collect();

        let mut payload = serde_json::json!({
            "model": request.config.model,
            "temperature": request.config.temperature,
            "max_tokens": request.config.max_tokens,
            "messages": messages
        });

        if let Some(ref tools) = request.tools {
            if !tools.is_empty() {
                let openai_tools: Vec<serde_json::Value> =
                    tools.iter().map(|t| self.tool_to_openai(t)).collect();
                payload["tools"] = serde_json::json!(openai_tools);

                payload["tool_choice"] = serde_json::json!("auto");
            }
        }

        payload
    }

    /// Parse OpenAI response into ProviderResponse
    fn parse_response(&self, json: &serde_json::Value) -> Result<ProviderResponse, ProviderError> {
        let message = json
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .ok_or_else(|| ProviderError::ParseError("response has no choices".to_string()))?;

        let usage = json.get("usage").and_then(|u| {
            Some(TokenUsage {
                input_tokens: u["prompt_tokens"].as_u64()? as u32,
                output_tokens: u["completion_tokens"].as_u64()? as u32,
                total_tokens: u["total_tokens"].as_u64()? as u32,
            })
        });

        if let Some(tool_calls) = message["tool_calls"].as_array() {
            let calls: Vec<ToolCallRequest> = tool_calls
                .iter()
                .filter_map(|tc| {
                    let id = tc["id"].as_str()?.to_string();
                    let name = tc["function"]["name"].as_str()?.to_string();
                    let args_str = tc["function"]["arguments"].as_str().unwrap_or("{}");
                    let arguments: serde_json::Value =
                        serde_json::from_str(args_str).unwrap_or(serde_json::json!({}));

                    Some(ToolCallRequest {
                        id,
                        name,
                        arguments,
                    })
                })
                .collect();

            if !calls.is_empty() {
                return Ok(ProviderResponse::ToolCalls { calls, usage });
            }
        }

        let content = message["content"]
            .as_str()
            .unwrap_or("")
            .trim()
            .to_string();

        Ok(ProviderResponse::Text { content, usage })
    }
}

#[async_trait]
impl LLMProviderTrait for OpenAIProvider {
    fn provider_type(&self) -> ProviderType {
        self.provider_type
    }

    fn name(&self) -> &'static str {
        match self.provider_type {
            ProviderType::OpenAI => "OpenAI",
            ProviderType::Compatible => "OpenAI-compatible",
        }
    }

    fn is_configured(&self) -> bool {
        // Self-hosted compatible servers usually run without a key
        self.api_key.is_some() || self.provider_type == ProviderType::Compatible
    }

    async fn chat(&self, request: ChatRequest) -> Result<ProviderResponse, ProviderError> {
        let payload = self.build_payload(&request);

        tracing::debug!(
            "[{}] Sending request: model={}, messages={}, tools={}",
            self.name(),
            request.config.model,
            request.messages.len(),
            request.tools.as_ref().map(|t| t.len()).unwrap_or(0)
        );

        let mut builder = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(&payload);

        match (&self.api_key, self.provider_type) {
            (Some(key), _) => builder = builder.header("Authorization", format!("Bearer {}", key)),
            (None, ProviderType::OpenAI) => {
                return Err(ProviderError::AuthError(
                    "No OpenAI API key configured".to_string(),
                ));
            }
            (None, ProviderType::Compatible) => {}
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        self.parse_response(&json)
    }
}
