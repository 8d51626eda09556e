//! Tests for the assistant service object

#[cfg(test)]
mod tests {
    use std::{
        sync::{Arc, atomic::Ordering},
        time::Duration,
    };

    use async_trait::async_trait;
    use tokio::sync::{Mutex, Notify};

    use crate::{
        capability::{Capability, CapabilityScope, ErrorKind},
        email::{EmailCapability, SenderCredentials},
        router::{Classifier, KeywordClassifier},
        session::HISTORY_WINDOW,
        test_support::RecordingTransport,
        Assistant, Result,
    };

    fn assistant_with(classifier: Arc<dyn Classifier>) -> Assistant {
        let email = EmailCapability::new(
            None,
            Arc::new(RecordingTransport::default()),
            Duration::from_secs(1),
        );
        Assistant::new(classifier, email, Duration::from_secs(1))
    }

    fn keyword_assistant() -> Assistant {
        assistant_with(Arc::new(KeywordClassifier::new()))
    }

    /// Chat classifier that remembers every history string it was given
    #[derive(Default)]
    struct HistoryCapture {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Classifier for HistoryCapture {
        fn name(&self) -> &'static str {
            "capture"
        }

        async fn classify(&self, _: CapabilityScope, utterance: &str, history: &str) -> Result<Capability> {
            self.seen.lock().await.push(history.to_string());
            Ok(Capability::Chat {
                reply: format!("echo {utterance}"),
            })
        }
    }

    /// Chat classifier that parks until released
    #[derive(Default)]
    struct GatedClassifier {
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl Classifier for GatedClassifier {
        fn name(&self) -> &'static str {
            "gated"
        }

        async fn classify(&self, _: CapabilityScope, _: &str, _: &str) -> Result<Capability> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(Capability::Chat {
                reply: "released".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_handle_adds_task_and_mints_session() {
        let assistant = keyword_assistant();

        let reply = assistant
            .handle(
                CapabilityScope::Tasks,
                "add task Submit report on 2025-01-05 at 09:00",
                None,
            )
            .await;

        assert_eq!(reply.response, "Task added successfully.");
        assert!(reply.error_kind.is_none());
        assert!(!reply.session_id.is_empty());

        let tasks = assistant.active_tasks().await;
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].description, "Submit report");
        assert_eq!(tasks[0].date, "2025-01-05");
        assert_eq!(tasks[0].time, "09:00");
    }

    #[tokio::test]
    async fn test_session_is_reused_across_calls() {
        let assistant = keyword_assistant();

        let first = assistant.handle(CapabilityScope::Chat, "hello", None).await;
        let second = assistant
            .handle(CapabilityScope::Chat, "hello again", Some(&first.session_id))
            .await;

        assert_eq!(first.session_id, second.session_id);
        assert_eq!(first.created_at, second.created_at);

        let transcript = assistant.transcript(&first.session_id).await.unwrap();
        assert_eq!(transcript.len(), 2);
        assert!(transcript.history()[0].starts_with("user: hello\nai: "));
    }

    #[tokio::test]
    async fn test_unknown_session_id_gets_fresh_session() {
        let assistant = keyword_assistant();

        let reply = assistant
            .handle(CapabilityScope::Chat, "hello", Some("no-such-session"))
            .await;

        assert_ne!(reply.session_id, "no-such-session");
        assert!(assistant.transcript(&reply.session_id).await.is_some());
    }

    #[tokio::test]
    async fn test_classifier_sees_bounded_history() {
        let capture = Arc::new(HistoryCapture::default());
        let assistant = assistant_with(capture.clone());

        let session_id = assistant.new_session().await.id;
        for i in 0..12 {
            assistant
                .handle(CapabilityScope::Chat, &format!("turn {i}"), Some(&session_id))
                .await;
        }

        let seen = capture.seen.lock().await;
        assert_eq!(seen.len(), 12);
        assert!(seen[0].is_empty());

        let last = &seen[11];
        assert_eq!(last.matches("user: ").count(), HISTORY_WINDOW);
        assert!(!last.contains("user: turn 0\n"));
        assert!(last.contains("user: turn 1\n"));
        assert!(last.contains("ai: echo turn 10"));

        // The full transcript keeps everything
        let transcript = assistant.transcript(&session_id).await.unwrap();
        assert_eq!(transcript.len(), 12);
    }

    #[tokio::test]
    async fn test_concurrent_adds_are_not_lost() {
        let assistant = keyword_assistant();

        let handles: Vec<_> = (0..50)
            .map(|i| {
                let assistant = assistant.clone();
                tokio::spawn(async move {
                    assistant
                        .handle(
                            CapabilityScope::Tasks,
                            &format!("add task Job {i} on 2025-02-01 at 10:00"),
                            None,
                        )
                        .await
                })
            })
            .collect();

        for handle in handles {
            let reply = handle.await.unwrap();
            assert_eq!(reply.response, "Task added successfully.");
        }

        let tasks = assistant.all_tasks().await;
        assert_eq!(tasks.len(), 50);
        let mut ids: Vec<_> = tasks.iter().map(|t| t.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 50);
    }

    #[tokio::test]
    async fn test_task_handlers_by_id() {
        let assistant = keyword_assistant();
        assistant.add_task("Gym", "2025-01-06", "07:00").await;
        assistant.add_task("Dentist", "2025-01-07", "15:00").await;

        let gym = assistant.active_tasks().await[0].id;

        let outcome = assistant
            .update_task_by_id(gym, "Swim", "2025-01-08", "06:30")
            .await;
        assert!(outcome.is_success());
        assert_eq!(assistant.get_task(gym).await.unwrap().description, "Swim");

        let outcome = assistant.delete_task_by_id(gym).await;
        assert!(outcome.is_success());
        assert_eq!(assistant.active_tasks().await.len(), 1);
        assert_eq!(assistant.all_tasks().await.len(), 2);
        assert_eq!(assistant.get_task(gym).await.unwrap().status(), "deleted");

        let outcome = assistant.delete_task_by_id(999).await;
        assert_eq!(outcome.error_kind, Some(ErrorKind::NotFound));

        assert_eq!(
            assistant.summarize_tasks().await,
            "- Dentist on 2025-01-07 at 15:00"
        );
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let assistant = keyword_assistant();
        let reply = assistant.handle(CapabilityScope::Chat, "hi", None).await;

        let reset = assistant.reset_session(&reply.session_id).await.unwrap();
        assert!(reset.is_empty());
        assert_eq!(reset.id, reply.session_id);

        assert!(assistant.remove_session(&reply.session_id).await);
        assert!(!assistant.remove_session(&reply.session_id).await);
        assert!(assistant.transcript(&reply.session_id).await.is_none());
        assert!(assistant.reset_session(&reply.session_id).await.is_none());
    }

    #[tokio::test]
    async fn test_email_without_credentials_through_assistant() {
        let assistant = keyword_assistant();

        let reply = assistant
            .handle(
                CapabilityScope::Email,
                "email alex@example.com subject Lunch: noon works",
                None,
            )
            .await;

        assert_eq!(reply.response, "❌ Missing sender credentials.");
        assert_eq!(reply.error_kind, Some(ErrorKind::ValidationAbsent));
    }

    #[tokio::test]
    async fn test_slow_classification_does_not_block_other_handlers() {
        let gate = Arc::new(GatedClassifier::default());
        let email = EmailCapability::new(
            None,
            Arc::new(RecordingTransport::default()),
            Duration::from_secs(1),
        );
        let assistant = Assistant::new(gate.clone(), email, Duration::from_secs(5));
        let session = assistant.new_session().await;

        let pending = tokio::spawn({
            let assistant = assistant.clone();
            let id = session.id.clone();
            async move { assistant.handle(CapabilityScope::Chat, "hello", Some(&id)).await }
        });
        gate.entered.notified().await;

        let wait = Duration::from_secs(1);
        let transcript = tokio::time::timeout(wait, assistant.transcript(&session.id))
            .await
            .expect("transcript blocked behind classification")
            .unwrap();
        assert!(transcript.history().is_empty());

        let summary = tokio::time::timeout(wait, assistant.summarize_tasks())
            .await
            .expect("summary blocked behind classification");
        assert_eq!(summary, "No active tasks.");

        let added = tokio::time::timeout(wait, assistant.add_task("Gym", "2025-01-06", "07:00"))
            .await
            .expect("add blocked behind classification");
        assert!(added.error_kind.is_none());

        gate.release.notify_one();
        let reply = pending.await.unwrap();
        assert_eq!(reply.response, "released");
        assert_eq!(reply.session_id, session.id);
        assert!(!assistant.transcript(&session.id).await.unwrap().history().is_empty());
    }

    #[tokio::test]
    async fn test_slow_mail_submission_does_not_block_other_handlers() {
        let transport = Arc::new(RecordingTransport {
            delay: Some(Duration::from_secs(30)),
            ..Default::default()
        });
        let email = EmailCapability::new(
            Some(SenderCredentials {
                email: "me@example.com".into(),
                password: "secret".into(),
            }),
            transport.clone(),
            Duration::from_secs(60),
        );
        let assistant = Assistant::new(Arc::new(KeywordClassifier::new()), email, Duration::from_secs(5));
        let session = assistant.new_session().await;

        let pending = tokio::spawn({
            let assistant = assistant.clone();
            let id = session.id.clone();
            async move {
                assistant
                    .handle(
                        CapabilityScope::Email,
                        "email alex@example.com subject Lunch: noon works",
                        Some(&id),
                    )
                    .await
            }
        });
        while transport.calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        let wait = Duration::from_secs(1);
        let summary = tokio::time::timeout(wait, assistant.summarize_tasks())
            .await
            .expect("summary blocked behind mail submission");
        assert_eq!(summary, "No active tasks.");
        assert!(
            tokio::time::timeout(wait, assistant.transcript(&session.id))
                .await
                .expect("transcript blocked behind mail submission")
                .is_some()
        );

        pending.abort();
    }
}
