//! Outbound collaborator for one exchange cycle.
//!
//! [`ChatEndpoint`] is the seam the exchange controller talks to; the
//! production [`HttpEndpoint`] POSTs `{"message": ...}` and expects
//! `{"response": ...}` back.

use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use crate::api::{ChatRequest, ChatResponse};
use crate::core::config::Config;

/// Why an exchange produced no usable reply.
#[derive(Debug)]
pub enum ExchangeError {
    /// The request never produced an HTTP response (connect, DNS, reset).
    Transport(reqwest::Error),
    /// The endpoint answered with a non-2xx status.
    Status { status: StatusCode, body: String },
    /// The body was not `{"response": string}`.
    Decode(serde_json::Error),
    /// No answer within the configured request timeout.
    Timeout(Duration),
}

impl fmt::Display for ExchangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExchangeError::Transport(err) => write!(f, "request failed: {err}"),
            ExchangeError::Status { status, body } => match summarize_body(body) {
                Some(summary) => write!(f, "endpoint returned {status}: {summary}"),
                None => write!(f, "endpoint returned {status}"),
            },
            ExchangeError::Decode(err) => write!(f, "malformed response body: {err}"),
            ExchangeError::Timeout(after) => {
                write!(f, "no response after {}s", after.as_secs_f32())
            }
        }
    }
}

impl StdError for ExchangeError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ExchangeError::Transport(err) => Some(err),
            ExchangeError::Decode(err) => Some(err),
            ExchangeError::Status { .. } | ExchangeError::Timeout(_) => None,
        }
    }
}

impl From<reqwest::Error> for ExchangeError {
    fn from(err: reqwest::Error) -> Self {
        ExchangeError::Transport(err)
    }
}

impl From<serde_json::Error> for ExchangeError {
    fn from(err: serde_json::Error) -> Self {
        ExchangeError::Decode(err)
    }
}

#[async_trait]
pub trait ChatEndpoint: Send + Sync {
    /// Send one user message and wait for the single reply string.
    async fn send(&self, message: &str) -> Result<String, ExchangeError>;
}

#[derive(Clone, Debug)]
pub struct HttpEndpoint {
    client: reqwest::Client,
    url: String,
    timeout: Option<Duration>,
}

impl HttpEndpoint {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            timeout: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(reqwest::Client::new(), config.endpoint_url())
            .with_timeout(config.request_timeout())
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn post(&self, message: &str) -> Result<String, ExchangeError> {
        let request = ChatRequest {
            message: message.to_string(),
        };

        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!(url = %self.url, %status, bytes = body.len(), "Endpoint responded");

        if !status.is_success() {
            return Err(ExchangeError::Status { status, body });
        }

        let parsed: ChatResponse = serde_json::from_str(&body)?;
        Ok(parsed.response)
    }
}

#[async_trait]
impl ChatEndpoint for HttpEndpoint {
    async fn send(&self, message: &str) -> Result<String, ExchangeError> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.post(message))
                .await
                .map_err(|_| ExchangeError::Timeout(limit))?,
            None => self.post(message).await,
        }
    }
}

/// Pull a one-line human summary out of an error body for diagnostics.
fn summarize_body(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    let summary = serde_json::from_str::<serde_json::Value>(trimmed)
        .ok()
        .and_then(|value| {
            value
                .pointer("/error/message")
                .and_then(|v| v.as_str())
                .or_else(|| value.get("error").and_then(|v| v.as_str()))
                .or_else(|| value.get("message").and_then(|v| v.as_str()))
                .map(str::to_owned)
        })
        .unwrap_or_else(|| trimmed.to_string());

    let collapsed = summary.split_whitespace().collect::<Vec<_>>().join(" ");
    const MAX_SUMMARY: usize = 200;
    if collapsed.chars().count() > MAX_SUMMARY {
        let cut: String = collapsed.chars().take(MAX_SUMMARY).collect();
        Some(format!("{cut}…"))
    } else {
        Some(collapsed)
    }
}
