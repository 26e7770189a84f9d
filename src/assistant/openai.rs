use super::{Assistant, ServiceError};
use crate::config::AssistantConfig;
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::RETRY_AFTER;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

// ── Wire types ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

// ── Client ────────────────────────────────────────────────────────────────────

/// Chat-completions client for OpenAI-compatible endpoints.
pub struct OpenAiAssistant {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    timeout_secs: u64,
}

impl OpenAiAssistant {
    /// Fails with `MissingCredential` when no key is configured, so the
    /// caller can disable Q&A while keeping the dashboard.
    pub fn new(config: &AssistantConfig) -> Result<Self, ServiceError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ServiceError::MissingCredential)?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            timeout_secs: config.timeout_secs,
        })
    }

    fn map_transport(&self, e: reqwest::Error) -> ServiceError {
        if e.is_timeout() {
            ServiceError::Timeout(self.timeout_secs)
        } else {
            ServiceError::Network(e.to_string())
        }
    }
}

/// Map a non-success status to the matching error.
fn status_error(status: StatusCode, retry_after: Option<u64>, body: String) -> ServiceError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ServiceError::Auth(status.as_u16()),
        StatusCode::TOO_MANY_REQUESTS => ServiceError::RateLimited {
            retry_after_secs: retry_after,
        },
        _ => ServiceError::Api {
            status: status.as_u16(),
            body,
        },
    }
}

/// Pull the first non-blank reply out of a response body.
fn extract_reply(resp: ChatResponse) -> Result<String, ServiceError> {
    resp.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|s| !s.trim().is_empty())
        .ok_or(ServiceError::EmptyReply)
}

#[async_trait]
impl Assistant for OpenAiAssistant {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, ServiceError> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        debug!("POST {} (model {})", self.endpoint, self.model);
        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let status = resp.status();
        if !status.is_success() {
            let retry_after = resp
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok());
            let text = resp.text().await.unwrap_or_default();
            warn!("Assistant request failed with {}", status);
            return Err(status_error(status, retry_after, text));
        }

        let parsed: ChatResponse = resp.json().await.map_err(|e| self.map_transport(e))?;
        extract_reply(parsed)
    }
}
