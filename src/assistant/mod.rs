//! Q&A over a hosted language model.
//!
//! The dashboard only depends on the `Assistant` trait: a system persona and
//! a user prompt go in, reply text comes out. Failures are `ServiceError`s and
//! never affect the ratio views.

mod openai;

pub use openai::OpenAiAssistant;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_PERSONA: &str = "You are a financial analyst working for an insurance company and an \
expert in solvency. Answer every question from the insurer's perspective, in at most 50 words. \
Always answer in Spanish.";

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ServiceError {
    #[error("no API key configured (set OPENAI_API_KEY)")]
    MissingCredential,

    #[error("authentication failed (HTTP {0})")]
    Auth(u16),

    #[error("rate limited{}", .retry_after_secs.map(|s| format!(", retry after {}s", s)).unwrap_or_default())]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("no reply within {0}s")]
    Timeout(u64),

    #[error("network error: {0}")]
    Network(String),

    #[error("service returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("service returned an empty reply")]
    EmptyReply,
}

#[async_trait]
pub trait Assistant: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, ServiceError>;
}

/// Send `prompt` under `persona`. A blank prompt is a no-op: nothing is sent
/// and `Ok(None)` comes back.
pub async fn ask(
    assistant: &dyn Assistant,
    persona: &str,
    prompt: &str,
) -> Result<Option<String>, ServiceError> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        debug!("Empty prompt, not calling the assistant");
        return Ok(None);
    }

    let reply = assistant.complete(persona, prompt).await?;
    Ok(Some(reply.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl Assistant for Recorder {
        async fn complete(&self, system: &str, prompt: &str) -> Result<String, ServiceError> {
            self.calls
                .lock()
                .unwrap()
                .push((system.to_string(), prompt.to_string()));
            Ok("  Solvency looks adequate.\n".to_string())
        }
    }

    struct Failing;

    #[async_trait]
    impl Assistant for Failing {
        async fn complete(&self, _system: &str, _prompt: &str) -> Result<String, ServiceError> {
            Err(ServiceError::RateLimited {
                retry_after_secs: Some(20),
            })
        }
    }

    #[test]
    fn test_blank_prompt_dispatches_nothing() {
        let rec = Recorder::default();
        let out = tokio_test::block_on(ask(&rec, DEFAULT_PERSONA, "   \n")).unwrap();
        assert_eq!(out, None);
        assert!(rec.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_prompt_is_sent_with_persona() {
        let rec = Recorder::default();
        let out = tokio_test::block_on(ask(&rec, "persona", "  Is sector X solvent? ")).unwrap();
        assert_eq!(out.as_deref(), Some("Solvency looks adequate."));
        let calls = rec.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], ("persona".to_string(), "Is sector X solvent?".to_string()));
    }

    #[test]
    fn test_default_persona_fixes_reply_language() {
        assert!(DEFAULT_PERSONA.contains("insurance company"));
        assert!(DEFAULT_PERSONA.ends_with("Always answer in Spanish."));
    }

    #[test]
    fn test_service_errors_propagate() {
        let err = tokio_test::block_on(ask(&Failing, DEFAULT_PERSONA, "hello")).unwrap_err();
        assert_eq!(err.to_string(), "rate limited, retry after 20s");
    }
}
