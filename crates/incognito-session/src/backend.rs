use async_trait::async_trait;
use incognito_llm::{ProxyReply, ProxyRequest};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Deserialize;

use crate::error::{Result, SessionError};

/// Where a session sends its conversation for the next assistant turn
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, request: ProxyRequest) -> Result<ProxyReply>;
}

/// Calls the proxy's non-streaming `POST /chat` route
#[derive(Clone)]
pub struct ProxyBackend {
    http_client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl ProxyBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl CompletionBackend for ProxyBackend {
    async fn complete(&self, request: ProxyRequest) -> Result<ProxyReply> {
        let url = format!("{}/chat", self.base_url);

        let response = self
            .http_client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or(body);
            tracing::warn!(status, message = %message, "Proxy returned an error");
            return Err(SessionError::Proxy { status, message });
        }

        response
            .json()
            .await
            .map_err(|e| SessionError::InvalidReply(e.to_string()))
    }
}
