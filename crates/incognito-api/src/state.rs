use std::sync::Arc;
use incognito_llm::{AttestationClient, ChatClient, CompletionsClient};
use crate::config::Config;

/// Shared application state passed to all handlers
///
/// The upstream clients are created once at startup and shared across requests.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub chat_client: Arc<dyn ChatClient>,
    pub inference_client: Arc<dyn ChatClient>,
    pub attestation: Arc<AttestationClient>,
}

impl AppState {
    pub fn new(
        config: Config,
        chat_client: Arc<dyn ChatClient>,
        inference_client: Arc<dyn ChatClient>,
        attestation: AttestationClient,
    ) -> Self {
        Self {
            config: Arc::new(config),
            chat_client,
            inference_client,
            attestation: Arc::new(attestation),
        }
    }

    /// Wire the upstream clients from the loaded configuration
    pub fn from_config(config: Config) -> Self {
        let chat_client = Arc::new(CompletionsClient::new(
            config.chat.base_url.clone(),
            config.chat_api_key.clone(),
        ));
        let inference_client = Arc::new(CompletionsClient::new(
            config.inference.base_url.clone(),
            config.inference_api_key.clone(),
        ));
        let attestation = AttestationClient::new(
            config.attestation.url.clone(),
            config.attestation_token.clone(),
        );

        Self::new(config, chat_client, inference_client, attestation)
    }
}
