//! Environment-driven configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{brain::LLMConfig, email::SmtpConfig};

/// Default timeout for classifier and mail-submission calls
pub const DEFAULT_EXTERNAL_TIMEOUT_SECS: u64 = 25;

/// Which classifier picks capabilities for utterances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    /// Tool-calling LLM
    #[default]
    Llm,
    /// Deterministic keyword matcher
    Keyword,
}

impl std::fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClassifierKind::Llm => write!(f, "llm"),
            ClassifierKind::Keyword => write!(f, "keyword"),
        }
    }
}

impl std::str::FromStr for ClassifierKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "llm" | "openai" => Ok(ClassifierKind::Llm),
            "keyword" | "keywords" => Ok(ClassifierKind::Keyword),
            other => Err(format!("Unknown classifier: {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TaskverseConfig {
    pub smtp: SmtpConfig,
    pub llm: LLMConfig,
    pub openai_api_key: Option<String>,
    pub classifier: ClassifierKind,
    pub external_timeout: Duration,
}

impl Default for TaskverseConfig {
    fn default() -> Self {
        Self {
            smtp: SmtpConfig::default(),
            llm: LLMConfig::default(),
            openai_api_key: None,
            classifier: ClassifierKind::Keyword,
            external_timeout: Duration::from_secs(DEFAULT_EXTERNAL_TIMEOUT_SECS),
        }
    }
}

impl TaskverseConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or blank values fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let smtp = SmtpConfig {
            host: get("SMTP_HOST").unwrap_or_else(|| "smtp.gmail.com".to_string()),
            port: get("SMTP_PORT")
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(587),
            sender_email: get("SENDER_EMAIL"),
            sender_password: get("SENDER_PASSWORD"),
        };

        let mut llm = LLMConfig::default();
        if let Some(model) = get("TASKVERSE_LLM_MODEL") {
            llm.model = model;
        }
        if let Some(temperature) = get("TASKVERSE_LLM_TEMPERATURE").and_then(|t| t.parse().ok()) {
            llm.temperature = temperature;
        }
        if let Some(max_tokens) = get("TASKVERSE_LLM_MAX_TOKENS").and_then(|t| t.parse().ok()) {
            llm.max_tokens = max_tokens;
        }
        llm.endpoint = get("TASKVERSE_LLM_ENDPOINT");

        let openai_api_key = get("OPENAI_API_KEY");

        let requested = match get("TASKVERSE_CLASSIFIER").map(|v| v.parse::<ClassifierKind>()) {
            Some(Ok(kind)) => kind,
            Some(Err(e)) => {
                tracing::warn!("{}; using the default classifier", e);
                ClassifierKind::default()
            }
            None => ClassifierKind::default(),
        };

        let classifier = if requested == ClassifierKind::Llm
            && openai_api_key.is_none()
            && llm.endpoint.is_none()
        {
            tracing::warn!(
                "No OPENAI_API_KEY or TASKVERSE_LLM_ENDPOINT set - falling back to keyword classifier"
            );
            ClassifierKind::Keyword
        } else {
            requested
        };

        let external_timeout = Duration::from_secs(
            get("TASKVERSE_EXTERNAL_TIMEOUT_SECS")
                .and_then(|s| s.trim().parse().ok())
                .filter(|secs: &u64| *secs > 0)
                .unwrap_or(DEFAULT_EXTERNAL_TIMEOUT_SECS),
        );

        Self {
            smtp,
            llm,
            openai_api_key,
            classifier,
            external_timeout,
        }
    }
}
