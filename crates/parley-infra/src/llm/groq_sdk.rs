//! GroqSdkClient -- primary delivery tier over the `async-openai` client.
//!
//! Groq exposes an OpenAI-compatible chat completions API, so the typed
//! `async_openai::Client` is pointed at the Groq base URL. A response whose
//! first choice carries no text, or a JSON body that does not decode as a
//! completion at all, is handed back whole as a degraded reply.

use std::time::Duration;

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::error::OpenAIError;
use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest,
};
use reqwest::header::HeaderValue;
use tracing::debug;

use parley_core::llm::provider::ProviderClient;
use parley_types::config::ProviderConfig;
use parley_types::llm::{LlmError, TierReply};

/// Primary tier: the OpenAI-compatible SDK client aimed at Groq.
///
/// Does NOT derive Debug; the `async_openai::Client` holds the API key.
pub struct GroqSdkClient {
    client: Client<OpenAIConfig>,
    model: String,
    max_tokens: u32,
    timeout: Duration,
}

impl GroqSdkClient {
    /// Build the client, verifying the key can be sent as a bearer header.
    pub fn new(api_key: &str, config: &ProviderConfig) -> Result<Self, LlmError> {
        HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|_| {
            LlmError::InvalidRequest("API key is not a valid header value".to_string())
        })?;

        let openai_config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(&config.base_url);

        Ok(Self {
            client: Client::with_config(openai_config),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            timeout: Duration::from_secs(config.primary_timeout_secs),
        })
    }

    fn build_request(&self, prompt: &str) -> CreateChatCompletionRequest {
        CreateChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessage {
                    content: ChatCompletionRequestUserMessageContent::Text(prompt.to_string()),
                    name: None,
                },
            )],
            max_completion_tokens: Some(self.max_tokens),
            ..Default::default()
        }
    }
}

impl ProviderClient for GroqSdkClient {
    fn name(&self) -> &str {
        "groq-sdk"
    }

    async fn complete(&self, prompt: &str) -> Result<TierReply, LlmError> {
        let request = self.build_request(prompt);

        let result = tokio::time::timeout(self.timeout, self.client.chat().create(request))
            .await
            .map_err(|_| LlmError::Timeout(self.timeout.as_secs()))?;

        let response = match result {
            Ok(response) => response,
            // A JSON body off the completion schema still counts as a reply
            Err(OpenAIError::JSONDeserialize(e, content)) if is_json_reply(&content) => {
                debug!(error = %e, "Response did not match the completion schema");
                return Ok(TierReply::UnexpectedShape { raw: content });
            }
            Err(e) => return Err(map_openai_error(e)),
        };

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .filter(|text| !text.is_empty());

        match content {
            Some(text) => Ok(TierReply::Content(text)),
            None => {
                debug!(model = %response.model, "Completion had no text content");
                let raw = serde_json::to_string(&response)
                    .map_err(|e| LlmError::Deserialization(e.to_string()))?;
                Ok(TierReply::UnexpectedShape { raw })
            }
        }
    }
}

/// Whether an undecodable body is still a JSON reply rather than garbage or
/// an error envelope.
fn is_json_reply(content: &str) -> bool {
    match serde_json::from_str::<serde_json::Value>(content) {
        Ok(serde_json::Value::Object(map)) => !map.contains_key("error"),
        Ok(_) => true,
        Err(_) => false,
    }
}

/// Map an `async_openai::error::OpenAIError` to an [`LlmError`].
fn map_openai_error(err: OpenAIError) -> LlmError {
    match &err {
        OpenAIError::ApiError(api_err) => {
            let code = api_err.code.as_deref().unwrap_or("");
            let error_type = api_err.r#type.as_deref().unwrap_or("");

            if code == "invalid_api_key"
                || error_type == "authentication_error"
                || api_err.message.contains("Invalid API Key")
                || api_err.message.contains("Invalid API key")
            {
                LlmError::AuthenticationFailed
            } else if code == "rate_limit_exceeded" || error_type == "rate_limit_error" {
                LlmError::RateLimited
            } else {
                LlmError::Provider {
                    message: err.to_string(),
                }
            }
        }
        OpenAIError::Reqwest(reqwest_err) => match reqwest_err.status().map(|s| s.as_u16()) {
            Some(401) => LlmError::AuthenticationFailed,
            Some(429) => LlmError::RateLimited,
            _ => LlmError::Provider {
                message: err.to_string(),
            },
        },
        OpenAIError::JSONDeserialize(_, content) => {
            LlmError::Deserialization(format!("failed to parse response: {content}"))
        }
        OpenAIError::InvalidArgument(msg) => LlmError::InvalidRequest(msg.clone()),
        _ => LlmError::Provider {
            message: err.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::test_server::{serve_json, serve_text};
    use axum::http::StatusCode;
    use serde_json::json;

    fn config_for(base_url: &str) -> ProviderConfig {
        ProviderConfig {
            api_key: Some("gsk-test".into()),
            base_url: base_url.to_string(),
            primary_timeout_secs: 5,
            ..Default::default()
        }
    }

    fn completion(content: serde_json::Value) -> serde_json::Value {
        json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "created": 1_700_000_000,
            "model": "llama-3.3-70b-versatile",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop",
                "logprobs": null
            }],
            "usage": { "prompt_tokens": 5, "completion_tokens": 2, "total_tokens": 7 }
        })
    }

    #[test]
    fn test_rejects_key_that_cannot_be_a_header() {
        let result = GroqSdkClient::new("bad\nkey", &ProviderConfig::default());
        assert!(matches!(result, Err(LlmError::InvalidRequest(_))));
    }

    #[test]
    fn test_request_is_single_user_turn() {
        let client = GroqSdkClient::new("gsk-test", &ProviderConfig::default()).unwrap();
        let request = client.build_request("2+2?");

        assert_eq!(request.model, "llama-3.3-70b-versatile");
        assert_eq!(request.max_completion_tokens, Some(1024));
        assert_eq!(request.messages.len(), 1);
        assert!(matches!(
            &request.messages[0],
            ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                content: ChatCompletionRequestUserMessageContent::Text(text),
                ..
            }) if text == "2+2?"
        ));
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice() {
        let base = serve_json(StatusCode::OK, completion(json!("Four."))).await;
        let client = GroqSdkClient::new("gsk-test", &config_for(&base)).unwrap();

        let reply = client.complete("2+2?").await.unwrap();

        assert_eq!(reply, TierReply::Content("Four.".into()));
    }

    #[tokio::test]
    async fn test_empty_content_is_degraded() {
        let base = serve_json(StatusCode::OK, completion(json!(""))).await;
        let client = GroqSdkClient::new("gsk-test", &config_for(&base)).unwrap();

        let reply = client.complete("2+2?").await.unwrap();

        assert!(reply.is_degraded());
        assert!(reply.into_text().contains("chatcmpl-1"));
    }

    #[tokio::test]
    async fn test_off_schema_body_is_degraded() {
        for body in [json!({ "choices": [] }), json!({ "output": "text" })] {
            let base = serve_json(StatusCode::OK, body.clone()).await;
            let client = GroqSdkClient::new("gsk-test", &config_for(&base)).unwrap();

            let reply = client.complete("2+2?").await.unwrap();

            assert!(reply.is_degraded(), "{body} should be degraded");
            let raw: serde_json::Value = serde_json::from_str(&reply.into_text()).unwrap();
            assert_eq!(raw, body);
        }
    }

    #[tokio::test]
    async fn test_non_json_body_is_an_error() {
        let base = serve_text(StatusCode::OK, "<html>gateway</html>").await;
        let client = GroqSdkClient::new("gsk-test", &config_for(&base)).unwrap();

        let err = client.complete("2+2?").await.unwrap_err();

        assert!(matches!(err, LlmError::Deserialization(_)));
    }

    #[test]
    fn test_error_envelope_is_not_a_reply() {
        assert!(!is_json_reply(r#"{"error":{"message":"boom"}}"#));
        assert!(!is_json_reply("not json"));
        assert!(is_json_reply(r#"{"choices":[]}"#));
    }

    #[tokio::test]
    async fn test_auth_failure_is_an_error() {
        let body = json!({
            "error": {
                "message": "Invalid API Key",
                "type": "invalid_request_error",
                "code": "invalid_api_key"
            }
        });
        let base = serve_json(StatusCode::UNAUTHORIZED, body).await;
        let client = GroqSdkClient::new("gsk-test", &config_for(&base)).unwrap();

        let err = client.complete("hello").await.unwrap_err();

        assert!(matches!(err, LlmError::AuthenticationFailed));
    }
}
