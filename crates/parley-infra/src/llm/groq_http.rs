//! GroqHttpClient -- secondary delivery tier as a direct HTTPS POST.
//!
//! Talks to `{base_url}/chat/completions` with `reqwest` and reads the
//! response as untyped JSON, so a schema drift on the provider side still
//! yields a (degraded) answer rather than an error.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and only exposed
//! when building the `Authorization` header.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;

use parley_core::llm::provider::ProviderClient;
use parley_types::config::ProviderConfig;
use parley_types::llm::{LlmError, TierReply};

/// Secondary tier: raw HTTP against the OpenAI-compatible endpoint.
pub struct GroqHttpClient {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
    max_tokens: u32,
    timeout_secs: u64,
}

impl GroqHttpClient {
    pub fn new(api_key: SecretString, config: &ProviderConfig) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.secondary_timeout_secs))
            .build()
            .map_err(|e| LlmError::Provider {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            timeout_secs: config.secondary_timeout_secs,
        })
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn map_transport_error(&self, e: reqwest::Error) -> LlmError {
        if e.is_timeout() {
            LlmError::Timeout(self.timeout_secs)
        } else {
            LlmError::Provider {
                message: format!("HTTP request failed: {e}"),
            }
        }
    }
}

impl ProviderClient for GroqHttpClient {
    fn name(&self) -> &str {
        "groq-http"
    }

    async fn complete(&self, prompt: &str) -> Result<TierReply, LlmError> {
        let body = json!({
            "messages": [{ "role": "user", "content": prompt }],
            "model": self.model,
            "max_tokens": self.max_tokens,
        });

        let response = self
            .client
            .post(self.url())
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 => LlmError::AuthenticationFailed,
                429 => LlmError::RateLimited,
                _ => LlmError::Provider {
                    message: format!("HTTP {status}: {error_body}"),
                },
            });
        }

        let value: serde_json::Value = response.json().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout(self.timeout_secs)
            } else {
                LlmError::Deserialization(format!("failed to parse response: {e}"))
            }
        })?;

        Ok(extract_reply(value))
    }
}

/// `choices[0].message.content` if it is a non-empty string, else the whole body.
fn extract_reply(value: serde_json::Value) -> TierReply {
    match value.pointer("/choices/0/message/content") {
        Some(serde_json::Value::String(text)) if !text.is_empty() => {
            TierReply::Content(text.clone())
        }
        _ => TierReply::UnexpectedShape {
            raw: value.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::test_server::{serve_json, serve_slow, serve_text};
    use axum::http::StatusCode;

    fn client_for(base_url: &str) -> GroqHttpClient {
        let config = ProviderConfig {
            base_url: base_url.to_string(),
            secondary_timeout_secs: 1,
            ..Default::default()
        };
        GroqHttpClient::new(SecretString::from("gsk-test"), &config).unwrap()
    }

    #[test]
    fn test_extract_reply_content() {
        let value = json!({ "choices": [{ "message": { "content": "Four." } }] });
        assert_eq!(extract_reply(value), TierReply::Content("Four.".into()));
    }

    #[test]
    fn test_extract_reply_unexpected_shape() {
        for value in [
            json!({ "choices": [] }),
            json!({ "choices": [{ "message": { "content": "" } }] }),
            json!({ "choices": [{ "message": { "content": 42 } }] }),
            json!({ "output": "text" }),
        ] {
            let reply = extract_reply(value.clone());
            assert_eq!(
                reply,
                TierReply::UnexpectedShape {
                    raw: value.to_string()
                }
            );
        }
    }

    #[test]
    fn test_url_strips_trailing_slash() {
        let client = client_for("https://api.groq.com/openai/v1/");
        assert_eq!(client.url(), "https://api.groq.com/openai/v1/chat/completions");
    }

    #[tokio::test]
    async fn test_complete_success() {
        let body = json!({ "choices": [{ "message": { "role": "assistant", "content": "hi there" } }] });
        let base = serve_json(StatusCode::OK, body).await;

        let reply = client_for(&base).complete("hi").await.unwrap();

        assert_eq!(reply, TierReply::Content("hi there".into()));
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let base = serve_json(StatusCode::UNAUTHORIZED, json!({ "error": "nope" })).await;
        let err = client_for(&base).complete("hi").await.unwrap_err();
        assert!(matches!(err, LlmError::AuthenticationFailed));

        let base = serve_json(StatusCode::TOO_MANY_REQUESTS, json!({})).await;
        let err = client_for(&base).complete("hi").await.unwrap_err();
        assert!(matches!(err, LlmError::RateLimited));

        let base = serve_json(StatusCode::INTERNAL_SERVER_ERROR, json!({})).await;
        let err = client_for(&base).complete("hi").await.unwrap_err();
        assert!(matches!(err, LlmError::Provider { .. }));
    }

    #[tokio::test]
    async fn test_non_json_body_is_an_error() {
        let base = serve_text(StatusCode::OK, "<html>gateway</html>").await;
        let err = client_for(&base).complete("hi").await.unwrap_err();
        assert!(matches!(err, LlmError::Deserialization(_)));
    }

    #[tokio::test]
    async fn test_timeout() {
        let base = serve_slow(Duration::from_secs(10)).await;
        let err = client_for(&base).complete("hi").await.unwrap_err();
        assert!(matches!(err, LlmError::Timeout(1)));
    }
}
