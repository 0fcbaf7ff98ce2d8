//! Rate-limited JSON fetching against the upstream catalog.
//!
//! Every request is preceded by a fixed courtesy delay, and a 429 response
//! triggers a further backoff before the request is retried. The network
//! itself sits behind [`HttpTransport`] so tests can script responses.

use crate::config::JikanConfig;
use crate::domain::MalId;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Body characters kept in a [`FetchError::ResponseFormat`] snippet.
pub const SNIPPET_LEN: usize = 200;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Anime with ID {mal_id} not found on MyAnimeList")]
    NotFound { mal_id: MalId },

    #[error("Rate limit exceeded after {attempts} attempts. Please try again later.")]
    RateLimitExceeded { attempts: u32 },

    #[error("MyAnimeList API error: {status}")]
    Upstream { status: u16 },

    #[error("Expected JSON response but got {content_type}")]
    UnexpectedContentType { content_type: String },

    #[error("Invalid JSON response from API: {message}{}", body_suffix(.snippet))]
    ResponseFormat { message: String, snippet: String },

    #[error("Transport error: {0}")]
    Transport(String),
}

impl FetchError {
    /// Builds a format error carrying a bounded excerpt of the offending body.
    pub fn response_format(message: impl Into<String>, body: &str) -> Self {
        Self::ResponseFormat {
            message: message.into(),
            snippet: snippet(body),
        }
    }

    #[must_use]
    pub const fn metric_label(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::RateLimitExceeded { .. } => "rate_limited",
            Self::Upstream { .. } | Self::UnexpectedContentType { .. } => "upstream_error",
            Self::ResponseFormat { .. } => "format_error",
            Self::Transport(_) => "transport_error",
        }
    }
}

fn snippet(body: &str) -> String {
    let mut chars = body.chars();
    let head: String = chars.by_ref().take(SNIPPET_LEN).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

fn body_suffix(snippet: &str) -> String {
    if snippet.is_empty() {
        String::new()
    } else {
        format!(" (body: {snippet})")
    }
}

/// Status line, content type and body of one HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl RawResponse {
    #[must_use]
    pub fn json(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: Some("application/json".to_string()),
            body: body.into(),
        }
    }

    fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("json"))
    }
}

#[async_trait::async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str) -> Result<RawResponse, FetchError>;
}

/// Production transport backed by a shared `reqwest` client.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(config: &JikanConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<RawResponse, FetchError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(RawResponse {
            status,
            content_type,
            body,
        })
    }
}

/// Timing rules applied to every upstream request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPolicy {
    pub request_delay: Duration,
    pub retry_backoff: Duration,
    pub max_attempts: u32,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self::from_config(&JikanConfig::default())
    }
}

impl FetchPolicy {
    #[must_use]
    pub fn from_config(config: &JikanConfig) -> Self {
        Self {
            request_delay: config.request_delay(),
            retry_backoff: config.retry_backoff(),
            max_attempts: config.max_attempts.max(1),
        }
    }
}

pub struct FetchClient {
    transport: Box<dyn HttpTransport>,
    policy: FetchPolicy,
}

impl FetchClient {
    pub fn new(transport: impl HttpTransport + 'static, policy: FetchPolicy) -> Self {
        Self {
            transport: Box::new(transport),
            policy,
        }
    }

    /// GETs `url` and decodes the JSON body as `T`.
    ///
    /// `mal_id` is only used to label a 404.
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        url: &str,
        mal_id: MalId,
    ) -> Result<T, FetchError> {
        let result = self.fetch_with_retries(url, mal_id).await.and_then(|body| {
            serde_json::from_str::<T>(&body)
                .map_err(|e| FetchError::response_format(e.to_string(), &body))
        });

        let outcome = match &result {
            Ok(_) => "ok",
            Err(FetchError::ResponseFormat { message, snippet }) => {
                warn!(url = %url, error = %message, body = %snippet, "Failed to parse upstream response");
                "format_error"
            }
            Err(e) => e.metric_label(),
        };
        metrics::counter!("jikan_requests_total", "outcome" => outcome).increment(1);

        result
    }

    async fn fetch_with_retries(&self, url: &str, mal_id: MalId) -> Result<String, FetchError> {
        let max_attempts = self.policy.max_attempts;

        for attempt in 1..=max_attempts {
            tokio::time::sleep(self.policy.request_delay).await;

            debug!(url = %url, attempt, max_attempts, "Requesting upstream");
            let response = self.transport.get(url).await?;

            match response.status {
                429 => {
                    warn!(
                        url = %url,
                        attempt,
                        max_attempts,
                        backoff_ms = u64::try_from(self.policy.retry_backoff.as_millis())
                            .unwrap_or(u64::MAX),
                        "Upstream rate limited request"
                    );
                    if attempt < max_attempts {
                        tokio::time::sleep(self.policy.retry_backoff).await;
                    }
                }
                404 => return Err(FetchError::NotFound { mal_id }),
                status if !(200..300).contains(&status) => {
                    return Err(FetchError::Upstream { status });
                }
                _ if !response.is_json() => {
                    return Err(FetchError::UnexpectedContentType {
                        content_type: response
                            .content_type
                            .unwrap_or_else(|| "<missing>".to_string()),
                    });
                }
                _ => return Ok(response.body),
            }
        }

        Err(FetchError::RateLimitExceeded {
            attempts: max_attempts,
        })
    }
}
