//! Session transcripts fed back to the router as conversational context

use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

/// Number of most recent turns exposed to the router
pub const HISTORY_WINDOW: usize = 10;

/// One conversation. The transcript grows without bound; only the window
/// handed to the router is capped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub created_at: DateTime<Utc>,
    history: Vec<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4().to_string())
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            created_at: Utc::now(),
            history: Vec::new(),
        }
    }

    pub fn append(&mut self, entry: impl Into<String>) {
        self.history.push(entry.into());
    }

    /// Record a routed exchange in the transcript
    pub fn record_turn(&mut self, utterance: &str, response: &str) {
        self.append(format_turn(utterance, response));
    }

    /// The last [`HISTORY_WINDOW`] entries, oldest first, newline-joined
    pub fn recent_text(&self) -> String {
        self.recent().join("\n")
    }

    pub fn recent(&self) -> &[String] {
        let start = self.history.len().saturating_sub(HISTORY_WINDOW);
        &self.history[start..]
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

pub fn format_turn(utterance: &str, response: &str) -> String {
    format!("user: {utterance}\nai: {response}")
}

/// Sessions keyed by client-visible identifier.
///
/// The map lock is only held to look up or insert a handle; each session
/// carries its own lock for transcript access.
#[derive(Debug, Default)]
pub struct SessionLedger {
    sessions: RwLock<HashMap<String, Arc<Mutex<Session>>>>,
}

impl SessionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh session and return its handle
    pub async fn create(&self) -> Arc<Mutex<Session>> {
        let session = Session::new();
        let id = session.id.clone();
        let handle = Arc::new(Mutex::new(session));
        self.sessions.write().await.insert(id.clone(), handle.clone());
        tracing::debug!(session_id = %id, "Session created");
        handle
    }

    pub async fn get(&self, id: &str) -> Option<Arc<Mutex<Session>>> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Look up the caller's session. A missing, empty or unknown identifier
    /// starts a new session under a freshly minted id.
    pub async fn resolve(&self, id: Option<&str>) -> Arc<Mutex<Session>> {
        match id.map(str::trim).filter(|s| !s.is_empty()) {
            Some(id) => match self.get(id).await {
                Some(handle) => handle,
                None => {
                    tracing::debug!(session_id = %id, "Unknown session id, starting a new session");
                    self.create().await
                }
            },
            None => self.create().await,
        }
    }

    /// Discard a session's transcript and restart it under the same id
    pub async fn reset(&self, id: &str) -> Option<Arc<Mutex<Session>>> {
        let handle = self.get(id).await?;
        {
            let mut session = handle.lock().await;
            *session = Session::with_id(id);
        }
        tracing::info!(session_id = %id, "Session reset");
        Some(handle)
    }

    pub async fn remove(&self, id: &str) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    /// Snapshot of a session's full transcript
    pub async fn transcript(&self, id: &str) -> Option<Session> {
        let handle = self.get(id).await?;
        let session = handle.lock().await;
        Some(session.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_text_windows_last_ten_in_order() {
        let mut session = Session::new();
        for i in 1..=15 {
            session.append(format!("entry {i}"));
        }

        let expected: Vec<String> = (6..=15).map(|i| format!("entry {i}")).collect();
        assert_eq!(session.recent(), expected.as_slice());
        assert_eq!(session.recent_text(), expected.join("\n"));
        // Storage itself is not trimmed
        assert_eq!(session.len(), 15);
    }

    #[test]
    fn test_recent_text_short_history() {
        let mut session = Session::new();
        assert_eq!(session.recent_text(), "");

        session.append("one");
        session.append("two");
        assert_eq!(session.recent_text(), "one\ntwo");
    }

    #[test]
    fn test_turn_format() {
        let mut session = Session::new();
        session.record_turn("add a task", "Task added successfully.");
        assert_eq!(
            session.history(),
            &["user: add a task\nai: Task added successfully.".to_string()]
        );
    }

    #[test]
    fn test_created_at_is_fixed() {
        let mut session = Session::new();
        let created = session.created_at;
        session.append("x");
        assert_eq!(session.created_at, created);
    }

    #[tokio::test]
    async fn test_resolve_reuses_known_sessions() {
        let ledger = SessionLedger::new();
        let handle = ledger.resolve(None).await;
        let id = handle.lock().await.id.clone();

        let again = ledger.resolve(Some(&id)).await;
        assert!(Arc::ptr_eq(&handle, &again));
        assert_eq!(ledger.sessions.read().await.len(), 1);
    }

    #[tokio::test]
    async fn test_resolve_mints_new_id_for_empty_or_unknown() {
        let ledger = SessionLedger::new();

        let empty = ledger.resolve(Some("")).await;
        let unknown = ledger.resolve(Some("no-such-session")).await;

        let empty_id = empty.lock().await.id.clone();
        let unknown_id = unknown.lock().await.id.clone();
        assert_ne!(empty_id, unknown_id);
        assert_ne!(unknown_id, "no-such-session");
        assert_eq!(ledger.sessions.read().await.len(), 2);
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let ledger = SessionLedger::new();
        let a = ledger.create().await;
        let b = ledger.create().await;

        a.lock().await.append("only in a");

        assert_eq!(a.lock().await.recent_text(), "only in a");
        assert!(b.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_reset_and_remove() {
        let ledger = SessionLedger::new();
        let handle = ledger.create().await;
        let id = handle.lock().await.id.clone();
        handle.lock().await.append("hello");

        ledger.reset(&id).await.unwrap();
        let snapshot = ledger.transcript(&id).await.unwrap();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.id, id);

        assert!(ledger.remove(&id).await);
        assert!(!ledger.remove(&id).await);
        assert!(ledger.transcript(&id).await.is_none());
        assert!(ledger.reset(&id).await.is_none());
    }
}
