//! TUI-less "say" command

use std::error::Error;
use std::sync::Arc;

use tracing::info;

use crate::core::config::Config;
use crate::core::endpoint::{ChatEndpoint, HttpEndpoint};
use crate::core::exchange::{ExchangeController, SubmitOutcome};
use crate::core::transcript::TranscriptStore;

pub async fn run_say(words: Vec<String>, config: Config) -> Result<(), Box<dyn Error>> {
    let endpoint = HttpEndpoint::from_config(&config);
    info!(endpoint = endpoint.url(), "Sending one-shot message");

    let (outcome, reply) = say_once(&words.join(" "), Arc::new(endpoint)).await;
    match outcome {
        SubmitOutcome::Rejected => {
            eprintln!("Usage: agentchat say <message>");
            std::process::exit(2);
        }
        SubmitOutcome::Answered => {
            println!("{}", reply.unwrap_or_default());
            Ok(())
        }
        SubmitOutcome::Failed => {
            println!("{}", reply.unwrap_or_default());
            std::process::exit(1);
        }
    }
}

/// Run a single exchange cycle and return the assistant message it produced.
async fn say_once(
    message: &str,
    endpoint: Arc<dyn ChatEndpoint>,
) -> (SubmitOutcome, Option<String>) {
    let controller = ExchangeController::new(TranscriptStore::shared(), endpoint);
    let outcome = controller.submit(message).await;
    let reply = controller
        .store()
        .with_messages(|messages| messages.last().filter(|m| m.is_assistant()).cloned())
        .map(|message| message.content);
    (outcome, reply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::APOLOGY_MESSAGE;
    use crate::core::endpoint::test_server::{closed_url, serve_once};

    #[tokio::test]
    async fn prints_the_endpoint_reply() {
        let (url, captured) = serve_once("200 OK", r#"{"response":"Hi there"}"#).await;
        let endpoint = HttpEndpoint::new(reqwest::Client::new(), url);

        let (outcome, reply) = say_once("Hello", Arc::new(endpoint)).await;

        assert_eq!(outcome, SubmitOutcome::Answered);
        assert_eq!(reply.as_deref(), Some("Hi there"));
        let bodies = captured.lock().await;
        assert_eq!(bodies.as_slice(), &[serde_json::json!({ "message": "Hello" })]);
    }

    #[tokio::test]
    async fn unreachable_endpoint_yields_the_apology() {
        let endpoint = HttpEndpoint::new(reqwest::Client::new(), closed_url().await);

        let (outcome, reply) = say_once("Hello", Arc::new(endpoint)).await;

        assert_eq!(outcome, SubmitOutcome::Failed);
        assert_eq!(reply.as_deref(), Some(APOLOGY_MESSAGE));
    }

    #[tokio::test]
    async fn blank_message_is_rejected_without_a_reply() {
        let endpoint = HttpEndpoint::new(reqwest::Client::new(), closed_url().await);

        let (outcome, reply) = say_once("   ", Arc::new(endpoint)).await;

        assert_eq!(outcome, SubmitOutcome::Rejected);
        assert_eq!(reply, None);
    }
}
