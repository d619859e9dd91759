use reqwest::header::ACCEPT;
use serde_json::Value;

use crate::error::{LlmError, Result};

/// Fetches the upstream attestation report
///
/// The report (`verifying_key`, `cpu_attestation`, `gpu_attestation`) is
/// returned exactly as received. Nothing is cached or verified.
#[derive(Clone)]
pub struct AttestationClient {
    http_client: reqwest::Client,
    url: Option<String>,
    token: Option<String>,
}

impl AttestationClient {
    pub fn new(url: Option<String>, token: Option<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            url: url.filter(|u| !u.trim().is_empty()),
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.url.is_some() && self.token.is_some()
    }

    pub async fn fetch_report(&self) -> Result<Value> {
        let url = self
            .url
            .as_deref()
            .ok_or(LlmError::MissingCredentials("attestation URL"))?;
        let token = self
            .token
            .as_deref()
            .ok_or(LlmError::MissingCredentials("attestation token"))?;

        tracing::info!("Fetching attestation report");

        let response = self
            .http_client
            .get(url)
            .header(ACCEPT, "application/json")
            .bearer_auth(token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status, "Attestation API error");
            return Err(LlmError::Upstream { status, body });
        }

        let report = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        tracing::info!("Attestation report fetched successfully");
        Ok(report)
    }
}
