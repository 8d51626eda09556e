//! Deterministic keyword classifier used when no LLM is configured

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use super::Classifier;
use crate::{
    capability::{Capability, CapabilityScope},
    Result,
};

static ADD_TASK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(?:please\s+)?(?:add|create|schedule|remind me to)\s+(?:a\s+)?(?:new\s+)?(?:task\s*:?\s+)?(?:to\s+)?(?P<task>.+?)\s+on\s+(?P<date>.+?)\s+at\s+(?P<time>.+?)\s*[.!]?\s*$",
    )
    .expect("add-task pattern")
});

static UPDATE_TASK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(?:please\s+)?(?:update|change|reschedule|move)\s+(?:the\s+)?(?:task\s*:?\s+)?(?P<task>.+?)\s+to\s+(?P<new>.+?)\s+on\s+(?P<date>.+?)\s+at\s+(?P<time>.+?)\s*[.!]?\s*$",
    )
    .expect("update-task pattern")
});

static DELETE_TASK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(?:please\s+)?(?:delete|remove|cancel)\s+(?:the\s+)?(?:task\s*:?\s+)?(?P<task>.+?)\s*[.!]?\s*$",
    )
    .expect("delete-task pattern")
});

static SUMMARIZE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:list|show|summari[sz]e|summary|what are)\b.*\btasks?\b|\bmy tasks\b")
        .expect("summarize pattern")
});

static SEND_EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?is)^\s*(?:please\s+)?(?:send\s+)?(?:an\s+)?e-?mail\s+(?:to\s+)?(?P<to>[^\s,;]+@[^\s,;]+?)[,.]?\s+(?:with\s+)?subject\s*:?\s+(?P<subject>.+?)\s*(?:\bsaying\b|\bbody\b|:)\s*(?P<body>.+?)\s*$",
    )
    .expect("send-email pattern")
});

static GREETING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:hi|hello|hey)\b").expect("greeting pattern"));

static MENTIONS_EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\be-?mail\b").expect("email mention pattern"));

static MENTIONS_TASK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\btasks?\b").expect("task mention pattern"));

static MENTIONS_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:time|date|today)\b").expect("time mention pattern"));

const GREETING_REPLY: &str =
    "Hello! I'm TaskVerse. I can schedule, update, delete and list your tasks, or send an email for you.";

const STORY_REPLY: &str = "Once upon a time, a very busy person wrote every plan on a sticky note. \
The notes piled up until one day an assistant arrived, read them all, and put each one in its place. \
From then on, nothing was ever forgotten.";

const TASK_HINT: &str = "To manage tasks, try 'add task Submit report on 2025-01-05 at 09:00', \
'update task Submit report to Send report on 2025-01-06 at 10:00', \
'delete task Submit report' or 'list my tasks'.";

const EMAIL_HINT: &str =
    "To send an email, try 'email alex@example.com subject Lunch: see you at noon'.";

const FALLBACK_REPLY: &str = "I'm not sure how to help with that yet. \
Ask me to add, update, delete or list tasks, or to send an email.";

/// Regex/keyword matcher that needs no network access
#[derive(Debug, Default, Clone)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Synchronous core of the classifier
    pub fn classify_text(&self, scope: CapabilityScope, utterance: &str) -> Capability {
        let text = utterance.trim();
        let tasks_allowed = matches!(scope, CapabilityScope::Tasks | CapabilityScope::All);
        let email_allowed = matches!(scope, CapabilityScope::Email | CapabilityScope::All);

        if email_allowed {
            if let Some(caps) = SEND_EMAIL.captures(text) {
                return Capability::SendEmail {
                    content: caps["body"].trim().to_string(),
                    subject: clean(&caps["subject"]),
                    recipient: caps["to"].to_string(),
                };
            }
        }

        if tasks_allowed {
            if let Some(caps) = UPDATE_TASK.captures(text) {
                return Capability::UpdateTask {
                    description: clean(&caps["task"]),
                    new_description: clean(&caps["new"]),
                    new_date: clean(&caps["date"]),
                    new_time: clean(&caps["time"]),
                };
            }
            if let Some(caps) = ADD_TASK.captures(text) {
                return Capability::AddTask {
                    description: clean(&caps["task"]),
                    date: clean(&caps["date"]),
                    time: clean(&caps["time"]),
                };
            }
            if let Some(caps) = DELETE_TASK.captures(text) {
                return Capability::DeleteTask {
                    description: clean(&caps["task"]),
                };
            }
            if SUMMARIZE.is_match(text) {
                return Capability::Summarize;
            }
        }

        let reply = if email_allowed && MENTIONS_EMAIL.is_match(text) {
            EMAIL_HINT.to_string()
        } else if MENTIONS_TASK.is_match(text) {
            TASK_HINT.to_string()
        } else if GREETING.is_match(text) {
            GREETING_REPLY.to_string()
        } else if text.to_lowercase().contains("story") {
            STORY_REPLY.to_string()
        } else if MENTIONS_TIME.is_match(text) {
            chrono::Local::now()
                .format("It is %H:%M on %A, %d %B %Y.")
                .to_string()
        } else {
            FALLBACK_REPLY.to_string()
        };

        Capability::Chat { reply }
    }
}

/// Trim whitespace, trailing punctuation and wrapping quotes
fn clean(raw: &str) -> String {
    raw.trim()
        .trim_end_matches(['.', '!', ','])
        .trim_matches(|c| c == '\'' || c == '"')
        .trim()
        .to_string()
}

#[async_trait]
impl Classifier for KeywordClassifier {
    fn name(&self) -> &'static str {
        "keyword"
    }

    async fn classify(
        &self,
        scope: CapabilityScope,
        utterance: &str,
        _history: &str,
    ) -> Result<Capability> {
        Ok(self.classify_text(scope, utterance))
    }
}
