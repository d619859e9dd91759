// OpenAI-compatible chat-completions client

use crate::error::{LlmError, Result};
use crate::traits::{ByteStream, ChatClient, ChatOptions, ChatRequest, ChatResponse};
use crate::types::Message;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Client for any endpoint speaking the `/chat/completions` dialect (HTTP direct, no SDK)
///
/// Base URL and key are optional so a missing deployment setting turns into a
/// per-call error instead of a startup failure.
#[derive(Clone)]
pub struct CompletionsClient {
    http_client: reqwest::Client,
    base_url: Option<String>,
    api_key: Option<String>,
}

impl CompletionsClient {
    pub fn new(base_url: Option<String>, api_key: Option<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: base_url
                .filter(|url| !url.trim().is_empty())
                .map(|url| url.trim_end_matches('/').to_string()),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        }
    }

    fn endpoint(&self) -> Result<(String, &str)> {
        let base_url = self
            .base_url
            .as_deref()
            .ok_or(LlmError::MissingCredentials("upstream base URL"))?;
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(LlmError::MissingCredentials("upstream API key"))?;
        Ok((format!("{}/chat/completions", base_url), api_key))
    }

    /// Build chat completion request payload
    fn build_chat_request(
        &self,
        model: &str,
        messages: &[Message],
        options: &ChatOptions,
        stream: bool,
    ) -> Value {
        let mut request = serde_json::json!({
            "model": model,
            "messages": messages,
            "stream": stream,
        });

        if let (Some(temp), Some(obj)) = (options.temperature, request.as_object_mut()) {
            obj.insert("temperature".to_string(), serde_json::json!(temp));
        }

        request
    }

    async fn send(&self, payload: &Value, stream: bool) -> Result<reqwest::Response> {
        let (url, api_key) = self.endpoint()?;

        let accept = if stream {
            "text/event-stream"
        } else {
            "application/json"
        };

        let response = self
            .http_client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, accept)
            .bearer_auth(api_key)
            .json(payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status, body = %body, "Upstream API error");
            return Err(LlmError::Upstream { status, body });
        }

        Ok(response)
    }
}

// ============================================================================
// TRAIT IMPLEMENTATIONS
// ============================================================================

#[async_trait]
impl ChatClient for CompletionsClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let payload =
            self.build_chat_request(&request.model, &request.messages, &request.options, false);

        let raw: Value = self
            .send(&payload, false)
            .await?
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let parsed: CompletionResponse = serde_json::from_value(raw.clone())
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse("response has no choices".to_string()))?;

        Ok(ChatResponse {
            message: choice.message,
            signature: parsed.signature,
            raw,
        })
    }

    async fn chat_stream(&self, request: ChatRequest) -> Result<ByteStream> {
        let payload =
            self.build_chat_request(&request.model, &request.messages, &request.options, true);

        let response = self.send(&payload, true).await?;

        Ok(Box::pin(
            response.bytes_stream().map(|chunk| chunk.map_err(LlmError::from)),
        ))
    }

    fn is_configured(&self) -> bool {
        self.base_url.is_some() && self.api_key.is_some()
    }
}

// ============================================================================
// RESPONSE TYPES
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub choices: Vec<CompletionChoice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionChoice {
    pub message: Message,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_shape() {
        let client = CompletionsClient::new(Some("http://x/v1/".into()), Some("k".into()));
        let payload = client.build_chat_request(
            "llama",
            &[Message::user("Hello")],
            &ChatOptions::new().temperature(0.5),
            false,
        );

        assert_eq!(payload["model"], "llama");
        assert_eq!(payload["stream"], false);
        assert_eq!(payload["temperature"], 0.5);
        assert_eq!(payload["messages"][0]["role"], "user");
        assert_eq!(client.endpoint().unwrap().0, "http://x/v1/chat/completions");
    }

    #[test]
    fn test_blank_settings_are_unconfigured() {
        let client = CompletionsClient::new(Some("  ".into()), Some("k".into()));
        assert!(!client.is_configured());
        assert!(matches!(
            client.endpoint(),
            Err(LlmError::MissingCredentials(_))
        ));
    }
}
