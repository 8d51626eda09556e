//! The fixed set of things the assistant can do for an utterance

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::brain::{ToolCallRequest, ToolDefinition};

/// Machine-readable failure kind carried next to the user-facing text.
/// Domain failures never become transport-level errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A required credential is not configured
    ValidationAbsent,
    /// Task lookup missed
    NotFound,
    /// Mail submission failed
    TransportFailure,
    /// Mail submission exceeded the external-call timeout
    TransportTimeout,
    /// Classifier call failed or gave nothing actionable
    UpstreamFailure,
    /// Classifier call exceeded the external-call timeout
    UpstreamTimeout,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::ValidationAbsent => write!(f, "validation_absent"),
            ErrorKind::NotFound => write!(f, "not_found"),
            ErrorKind::TransportFailure => write!(f, "transport_failure"),
            ErrorKind::TransportTimeout => write!(f, "transport_timeout"),
            ErrorKind::UpstreamFailure => write!(f, "upstream_failure"),
            ErrorKind::UpstreamTimeout => write!(f, "upstream_timeout"),
        }
    }
}

/// Text produced by a capability, plus the failure kind if it did not succeed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityOutcome {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl CapabilityOutcome {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            error_kind: None,
        }
    }

    pub fn failed(kind: ErrorKind, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            error_kind: Some(kind),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error_kind.is_none()
    }
}

/// Which group of capabilities an entry point exposes to the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityScope {
    Tasks,
    Email,
    Chat,
    /// Every capability; used by the single walker-style entry point
    All,
}

impl std::fmt::Display for CapabilityScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CapabilityScope::Tasks => write!(f, "tasks"),
            CapabilityScope::Email => write!(f, "email"),
            CapabilityScope::Chat => write!(f, "chat"),
            CapabilityScope::All => write!(f, "all"),
        }
    }
}

pub const ADD_TASK_TOOL: &str = "add_task";
pub const DELETE_TASK_TOOL: &str = "delete_task";
pub const UPDATE_TASK_TOOL: &str = "update_task";
pub const SUMMARIZE_TASKS_TOOL: &str = "summarize_tasks";
pub const SEND_EMAIL_TOOL: &str = "send_email";

/// A classified utterance with its extracted arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "capability", rename_all = "snake_case")]
pub enum Capability {
    AddTask {
        description: String,
        date: String,
        time: String,
    },
    DeleteTask {
        description: String,
    },
    UpdateTask {
        description: String,
        new_description: String,
        new_date: String,
        new_time: String,
    },
    Summarize,
    SendEmail {
        content: String,
        subject: String,
        recipient: String,
    },
    Chat {
        reply: String,
    },
}

impl Capability {
    pub fn name(&self) -> &'static str {
        match self {
            Capability::AddTask { .. } => ADD_TASK_TOOL,
            Capability::DeleteTask { .. } => DELETE_TASK_TOOL,
            Capability::UpdateTask { .. } => UPDATE_TASK_TOOL,
            Capability::Summarize => SUMMARIZE_TASKS_TOOL,
            Capability::SendEmail { .. } => SEND_EMAIL_TOOL,
            Capability::Chat { .. } => "chat",
        }
    }

    /// Whether an entry point of the given scope may run this capability.
    /// A plain chat reply is always eligible.
    pub fn allowed_in(&self, scope: CapabilityScope) -> bool {
        match (self, scope) {
            (Capability::Chat { .. }, _) | (_, CapabilityScope::All) => true,
            (
                Capability::AddTask { .. }
                | Capability::DeleteTask { .. }
                | Capability::UpdateTask { .. }
                | Capability::Summarize,
                CapabilityScope::Tasks,
            ) => true,
            (Capability::SendEmail { .. }, CapabilityScope::Email) => true,
            _ => false,
        }
    }

    /// Decode a tool call issued by the LLM into a capability
    pub fn from_tool_call(call: &ToolCallRequest) -> Result<Self, String> {
        let decode = |e: serde_json::Error| format!("invalid arguments for {}: {}", call.name, e);
        let args = call.arguments.clone();

        match call.name.as_str() {
            ADD_TASK_TOOL => {
                let a: AddTaskArgs = serde_json::from_value(args).map_err(decode)?;
                Ok(Capability::AddTask {
                    description: a.task,
                    date: a.date,
                    time: a.time,
                })
            }
            DELETE_TASK_TOOL => {
                let a: DeleteTaskArgs = serde_json::from_value(args).map_err(decode)?;
                Ok(Capability::DeleteTask {
                    description: a.task_name,
                })
            }
            UPDATE_TASK_TOOL => {
                let a: UpdateTaskArgs = serde_json::from_value(args).map_err(decode)?;
                Ok(Capability::UpdateTask {
                    description: a.task_name,
                    new_description: a.new_task,
                    new_date: a.new_date,
                    new_time: a.new_time,
                })
            }
            SUMMARIZE_TASKS_TOOL => Ok(Capability::Summarize),
            SEND_EMAIL_TOOL => {
                let a: SendEmailArgs = serde_json::from_value(args).map_err(decode)?;
                Ok(Capability::SendEmail {
                    content: a.email_content,
                    subject: a.email_subject,
                    recipient: a.email_to,
                })
            }
            other => Err(format!("unknown tool: {other}")),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AddTaskArgs {
    task: String,
    date: String,
    time: String,
}

#[derive(Debug, Deserialize)]
struct DeleteTaskArgs {
    task_name: String,
}

#[derive(Debug, Deserialize)]
struct UpdateTaskArgs {
    task_name: String,
    new_task: String,
    new_date: String,
    new_time: String,
}

#[derive(Debug, Deserialize)]
struct SendEmailArgs {
    email_content: String,
    email_subject: String,
    email_to: String,
}

/// Tool definitions handed to the LLM for a scope
pub fn tools_for_scope(scope: CapabilityScope) -> Vec<ToolDefinition> {
    match scope {
        CapabilityScope::Tasks => task_tools(),
        CapabilityScope::Email => vec![email_tool()],
        CapabilityScope::Chat => Vec::new(),
        CapabilityScope::All => {
            let mut tools = task_tools();
            tools.push(email_tool());
            tools
        }
    }
}

fn task_tools() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: ADD_TASK_TOOL.to_string(),
            description: "Schedule a new task for the user".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "task": { "type": "string", "description": "What needs doing" },
                    "date": { "type": "string", "description": "Calendar date, e.g. 2025-01-05" },
                    "time": { "type": "string", "description": "Time of day, e.g. 09:00" }
                },
                "required": ["task", "date", "time"]
            }),
        },
        ToolDefinition {
            name: DELETE_TASK_TOOL.to_string(),
            description: "Delete a scheduled task by its exact description".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "task_name": { "type": "string" }
                },
                "required": ["task_name"]
            }),
        },
        ToolDefinition {
            name: UPDATE_TASK_TOOL.to_string(),
            description: "Replace the description, date and time of a scheduled task".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "task_name": { "type": "string", "description": "Current exact description" },
                    "new_task": { "type": "string" },
                    "new_date": { "type": "string" },
                    "new_time": { "type": "string" }
                },
                "required": ["task_name", "new_task", "new_date", "new_time"]
            }),
        },
        ToolDefinition {
            name: SUMMARIZE_TASKS_TOOL.to_string(),
            description: "Summarize every active scheduled task".to_string(),
            parameters: json!({ "type": "object", "properties": {} }),
        },
    ]
}

fn email_tool() -> ToolDefinition {
    ToolDefinition {
        name: SEND_EMAIL_TOOL.to_string(),
        description: "Send a plain-text email on the user's behalf".to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "email_content": { "type": "string" },
                "email_subject": { "type": "string" },
                "email_to": { "type": "string", "description": "Recipient address" }
            },
            "required": ["email_content", "email_subject", "email_to"]
        }),
    }
}
