use config::{Config as ConfigLoader, ConfigError, Environment, File};
use incognito_llm::ChatMode;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default = "UpstreamConfig::chat")]
    pub chat: UpstreamConfig,
    #[serde(default = "UpstreamConfig::inference")]
    pub inference: UpstreamConfig,
    #[serde(default)]
    pub attestation: AttestationConfig,
    #[serde(default)]
    pub prompts: PromptConfig,
    #[serde(default)]
    pub logging: LoggingConfig,

    // Secrets (from ENV only)
    #[serde(default)]
    pub chat_api_key: Option<String>,
    #[serde(default)]
    pub inference_api_key: Option<String>,
    #[serde(default)]
    pub attestation_token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            cors: CorsConfig::default(),
            chat: UpstreamConfig::chat(),
            inference: UpstreamConfig::inference(),
            attestation: AttestationConfig::default(),
            prompts: PromptConfig::default(),
            logging: LoggingConfig::default(),
            chat_api_key: None,
            inference_api_key: None,
            attestation_token: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorsConfig {
    pub enabled: bool,
    #[serde(default)]
    pub origins: Vec<String>,
}

/// One upstream chat-completions deployment
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL; `/chat/completions` is appended
    #[serde(default)]
    pub base_url: Option<String>,
    pub model: String,
    pub temperature: f32,
}

impl UpstreamConfig {
    pub fn chat() -> Self {
        Self {
            base_url: None,
            model: "meta-llama/Llama-3.1-8B-Instruct".to_string(),
            temperature: 0.7,
        }
    }

    pub fn inference() -> Self {
        Self {
            base_url: Some("https://anura-testnet.lilypad.tech/api/v1".to_string()),
            model: "llama3.1:8b".to_string(),
            temperature: 0.6,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttestationConfig {
    pub url: Option<String>,
}

impl Default for AttestationConfig {
    fn default() -> Self {
        Self {
            url: Some("https://nilai-a779.nillion.network/v1/attestation/report".to_string()),
        }
    }
}

/// System preamble per interface mode; an empty string sends none
#[derive(Debug, Clone, Deserialize)]
pub struct PromptConfig {
    pub chat: String,
    pub agent: String,
    pub mcp: String,
}

impl PromptConfig {
    pub fn for_mode(&self, mode: ChatMode) -> &str {
        match mode {
            ChatMode::Chat => &self.chat,
            ChatMode::Agent => &self.agent,
            ChatMode::Mcp => &self.mcp,
        }
    }
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            chat: "You are a helpful AI assistant".to_string(),
            agent: "You are an autonomous AI agent. Break the user's task into clear steps, \
                    work through them in order and finish with a concise summary of the result."
                .to_string(),
            mcp: "You are an AI assistant with access to external tools through the Model \
                  Context Protocol. Say which tool you would call and why before answering."
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. Environment variables (`INCOGNITO_SERVER__PORT`, `INCOGNITO_CHAT__MODEL`, ...)
    ///
    /// Upstream credentials are never read from files. A missing credential is
    /// not a startup error; every call to that upstream fails instead.
    ///
    /// Credentials are read once, here. The clients built from this config keep
    /// them for the life of the process, so rotating a key takes a restart.
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let builder = ConfigLoader::builder()
            // 1. Load default config
            .add_source(File::with_name("config/default").required(false))
            // 2. Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            // 3. Environment variables override everything
            .add_source(
                Environment::with_prefix("INCOGNITO")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut cfg: Config = builder.build()?.try_deserialize()?;
        cfg.apply_env_secrets();

        Ok(cfg)
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = ConfigLoader::builder().add_source(File::from(path.as_ref()));

        builder.build()?.try_deserialize()
    }

    fn apply_env_secrets(&mut self) {
        if let Some(url) = env_secret("CHAT_API_URL") {
            self.chat.base_url = Some(url);
        }
        if let Some(url) = env_secret("INFERENCE_API_URL") {
            self.inference.base_url = Some(url);
        }
        self.chat_api_key = env_secret("CHAT_API_KEY");
        self.inference_api_key = env_secret("INFERENCE_API_KEY");
        self.attestation_token = env_secret("ATTESTATION_TOKEN");
    }

    /// Names of upstream settings that are absent
    pub fn missing_secrets(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.chat.base_url.is_none() {
            missing.push("CHAT_API_URL");
        }
        if self.chat_api_key.is_none() {
            missing.push("CHAT_API_KEY");
        }
        if self.inference_api_key.is_none() {
            missing.push("INFERENCE_API_KEY");
        }
        if self.attestation_token.is_none() {
            missing.push("ATTESTATION_TOKEN");
        }
        missing
    }
}

fn env_secret(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
