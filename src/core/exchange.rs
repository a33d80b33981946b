//! One request/response cycle per accepted submission.
//!
//! Every accepted submission ends with exactly one assistant message in the
//! transcript: the endpoint's reply, or [`APOLOGY_MESSAGE`] when the call
//! failed. Submissions that are blank or arrive while another cycle is
//! pending are dropped without touching the transcript.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::core::constants::APOLOGY_MESSAGE;
use crate::core::endpoint::ChatEndpoint;
use crate::core::message::Message;
use crate::core::transcript::{PendingGuard, TranscriptStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank text or another exchange already pending; nothing happened.
    Rejected,
    /// The endpoint replied and its text was appended.
    Answered,
    /// The endpoint failed and the apology was appended.
    Failed,
}

#[derive(Clone)]
pub struct ExchangeController {
    store: Arc<TranscriptStore>,
    endpoint: Arc<dyn ChatEndpoint>,
}

impl ExchangeController {
    pub fn new(store: Arc<TranscriptStore>, endpoint: Arc<dyn ChatEndpoint>) -> Self {
        Self { store, endpoint }
    }

    pub fn store(&self) -> &Arc<TranscriptStore> {
        &self.store
    }

    /// Check preconditions, record the user message and take the pending flag.
    ///
    /// Returns `None` when the submission is rejected. The caller should clear
    /// its draft as soon as this returns `Some`.
    pub fn accept(&self, text: &str) -> Option<PendingExchange> {
        if text.trim().is_empty() {
            debug!("Ignoring blank submission");
            return None;
        }

        let Some(guard) = self.store.try_begin_exchange() else {
            debug!("Ignoring submission while an exchange is pending");
            return None;
        };

        guard.store().append(Message::user(text));
        info!(chars = text.chars().count(), "Exchange started");

        Some(PendingExchange {
            guard,
            endpoint: Arc::clone(&self.endpoint),
            text: text.to_string(),
        })
    }

    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        match self.accept(text) {
            Some(exchange) => exchange.complete().await,
            None => SubmitOutcome::Rejected,
        }
    }
}

/// An accepted submission whose request has not been issued yet.
///
/// Holds the pending flag; it is released when this value is consumed by
/// [`PendingExchange::complete`] or dropped.
pub struct PendingExchange {
    guard: PendingGuard,
    endpoint: Arc<dyn ChatEndpoint>,
    text: String,
}

impl PendingExchange {
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Issue the single outbound request and append the resulting reply.
    pub async fn complete(self) -> SubmitOutcome {
        let PendingExchange {
            guard,
            endpoint,
            text,
        } = self;

        let outcome = match endpoint.send(&text).await {
            Ok(reply) => {
                info!(chars = reply.chars().count(), "Exchange answered");
                guard.store().append(Message::assistant(reply));
                SubmitOutcome::Answered
            }
            Err(err) => {
                warn!(error = %err, "Exchange failed");
                guard.store().append(Message::assistant(APOLOGY_MESSAGE));
                SubmitOutcome::Failed
            }
        };

        drop(guard);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::endpoint::test_server::{closed_url, serve_once};
    use crate::core::endpoint::{ExchangeError, HttpEndpoint};
    use crate::core::message::Role;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::{oneshot, Mutex};

    /// Replies with a fixed result and counts calls.
    struct ScriptedEndpoint {
        reply: Option<String>,
        calls: AtomicUsize,
        seen: std::sync::Mutex<Vec<String>>,
    }

    impl ScriptedEndpoint {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Some(reply.to_string()),
                calls: AtomicUsize::new(0),
                seen: std::sync::Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: None,
                calls: AtomicUsize::new(0),
                seen: std::sync::Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ChatEndpoint for ScriptedEndpoint {
        async fn send(&self, message: &str) -> Result<String, ExchangeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().expect("seen").push(message.to_string());
            match &self.reply {
                Some(reply) => Ok(reply.clone()),
                None => Err(ExchangeError::Timeout(Duration::from_secs(1))),
            }
        }
    }

    /// Blocks until the test releases it, so pending can be observed.
    struct GatedEndpoint {
        gate: Mutex<Option<oneshot::Receiver<String>>>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ChatEndpoint for GatedEndpoint {
        async fn send(&self, _message: &str) -> Result<String, ExchangeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let rx = self.gate.lock().await.take().expect("gate used once");
            Ok(rx.await.unwrap_or_default())
        }
    }

    /// Panics while the request is outstanding.
    struct PanickingEndpoint;

    #[async_trait]
    impl ChatEndpoint for PanickingEndpoint {
        async fn send(&self, _message: &str) -> Result<String, ExchangeError> {
            panic!("endpoint exploded");
        }
    }

    fn controller(endpoint: Arc<dyn ChatEndpoint>) -> ExchangeController {
        ExchangeController::new(TranscriptStore::shared(), endpoint)
    }

    #[tokio::test]
    async fn successful_exchange_records_both_messages() {
        let endpoint = ScriptedEndpoint::replying("Hi there");
        let controller = controller(endpoint.clone());

        let outcome = controller.submit("Hello").await;

        assert_eq!(outcome, SubmitOutcome::Answered);
        assert_eq!(
            controller.store().get_all(),
            vec![Message::user("Hello"), Message::assistant("Hi there")]
        );
        assert!(!controller.store().is_pending());
        assert_eq!(endpoint.calls(), 1);
        assert_eq!(*endpoint.seen.lock().expect("seen"), vec!["Hello".to_string()]);
    }

    #[tokio::test]
    async fn failed_exchange_appends_apology() {
        let endpoint = ScriptedEndpoint::failing();
        let controller = controller(endpoint.clone());

        let outcome = controller.submit("Hello").await;

        assert_eq!(outcome, SubmitOutcome::Failed);
        assert_eq!(
            controller.store().get_all(),
            vec![
                Message::user("Hello"),
                Message::assistant("Sorry, an error occurred. Please try again.")
            ]
        );
        assert!(!controller.store().is_pending());
    }

    #[tokio::test]
    async fn blank_submissions_never_touch_the_transcript() {
        let endpoint = ScriptedEndpoint::replying("unused");
        let controller = controller(endpoint.clone());

        for text in ["", "   ", "\n\t ", ""] {
            assert_eq!(controller.submit(text).await, SubmitOutcome::Rejected);
        }

        assert!(controller.store().is_empty());
        assert!(!controller.store().is_pending());
        assert_eq!(endpoint.calls(), 0);
    }

    #[tokio::test]
    async fn user_text_is_recorded_untrimmed() {
        let controller = controller(ScriptedEndpoint::replying("ok"));
        controller.submit("  padded  ").await;

        assert_eq!(controller.store().get_all()[0], Message::user("  padded  "));
    }

    #[tokio::test]
    async fn reply_is_recorded_verbatim() {
        let reply = "  line one\n\n**bold** — ünïcödé  \n";
        let controller = controller(ScriptedEndpoint::replying(reply));
        controller.submit("Hello").await;

        let messages = controller.store().get_all();
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[1].content.as_bytes(), reply.as_bytes());
    }

    #[tokio::test]
    async fn user_message_is_visible_before_reply_and_second_submit_is_dropped() {
        let (release, gate) = oneshot::channel();
        let endpoint = Arc::new(GatedEndpoint {
            gate: Mutex::new(Some(gate)),
            calls: AtomicUsize::new(0),
        });
        let controller = controller(endpoint.clone());

        let exchange = controller.accept("Hello").expect("accepted");
        assert!(controller.store().is_pending());
        assert_eq!(controller.store().get_all(), vec![Message::user("Hello")]);

        let task = tokio::spawn(exchange.complete());
        tokio::task::yield_now().await;

        assert!(controller.accept("Again").is_none());
        assert_eq!(controller.submit("Again").await, SubmitOutcome::Rejected);
        assert_eq!(controller.store().len(), 1);

        release.send("Hi there".to_string()).expect("release");
        assert_eq!(task.await.expect("join"), SubmitOutcome::Answered);

        assert!(!controller.store().is_pending());
        assert_eq!(endpoint.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            controller.store().get_all(),
            vec![Message::user("Hello"), Message::assistant("Hi there")]
        );
    }

    #[tokio::test]
    async fn pending_cycles_once_per_accepted_submission() {
        let controller = controller(ScriptedEndpoint::replying("pong"));

        for round in 1..=3 {
            assert!(!controller.store().is_pending());
            let exchange = controller.accept("ping").expect("accepted");
            assert!(controller.store().is_pending());
            exchange.complete().await;
            assert!(!controller.store().is_pending());
            assert_eq!(controller.store().len(), round * 2);
        }
    }

    #[tokio::test]
    async fn dropping_an_accepted_exchange_releases_pending() {
        let controller = controller(ScriptedEndpoint::replying("unused"));
        let exchange = controller.accept("Hello").expect("accepted");
        assert_eq!(exchange.text(), "Hello");
        drop(exchange);

        assert!(!controller.store().is_pending());
        assert!(controller.accept("Next").is_some());
    }

    #[tokio::test]
    async fn pending_is_released_when_the_cycle_panics() {
        let controller = controller(Arc::new(PanickingEndpoint));
        let exchange = controller.accept("Hello").expect("accepted");

        let joined = tokio::spawn(exchange.complete()).await;

        assert!(joined.is_err());
        assert!(!controller.store().is_pending());
        assert_eq!(controller.store().get_all(), vec![Message::user("Hello")]);
    }

    #[tokio::test]
    async fn http_success_scenario() {
        let (url, _) = serve_once("200 OK", r#"{"response":"Hi there"}"#).await;
        let controller = controller(Arc::new(HttpEndpoint::new(reqwest::Client::new(), url)));

        assert_eq!(controller.submit("Hello").await, SubmitOutcome::Answered);
        assert_eq!(
            controller.store().get_all(),
            vec![Message::user("Hello"), Message::assistant("Hi there")]
        );
        assert!(!controller.store().is_pending());
    }

    #[tokio::test]
    async fn http_network_error_scenario() {
        let url = closed_url().await;
        let controller = controller(Arc::new(HttpEndpoint::new(reqwest::Client::new(), url)));

        assert_eq!(controller.submit("Hello").await, SubmitOutcome::Failed);
        assert_eq!(
            controller.store().get_all(),
            vec![
                Message::user("Hello"),
                Message::assistant("Sorry, an error occurred. Please try again.")
            ]
        );
        assert!(!controller.store().is_pending());
    }

    #[tokio::test]
    async fn http_server_error_scenario() {
        let (url, _) = serve_once("500 Internal Server Error", r#"{"error":"boom"}"#).await;
        let controller = controller(Arc::new(HttpEndpoint::new(reqwest::Client::new(), url)));

        assert_eq!(controller.submit("Hello").await, SubmitOutcome::Failed);
        let messages = controller.store().get_all();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1], Message::assistant(APOLOGY_MESSAGE));
        assert!(!controller.store().is_pending());
    }

    #[tokio::test]
    async fn http_malformed_body_scenario() {
        let (url, _) = serve_once("200 OK", "{\"response\": ").await;
        let controller = controller(Arc::new(HttpEndpoint::new(reqwest::Client::new(), url)));

        assert_eq!(controller.submit("Hello").await, SubmitOutcome::Failed);
        let messages = controller.store().get_all();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1], Message::assistant(APOLOGY_MESSAGE));
        assert!(!controller.store().is_pending());
    }
}
