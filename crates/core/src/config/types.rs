use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use crate::orchestrator::OrchestratorConfig;
use crate::processor::ProcessorConfig;
use crate::session::SessionConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub processor: ProcessorConfig,
    #[serde(default)]
    pub sessions: SessionConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Externally reachable base URL used in pop-up links.
    #[serde(default)]
    pub public_url: Option<String>,
}

impl ServerConfig {
    /// Base URL handed to the vendor in launch responses.
    pub fn public_base(&self) -> String {
        match &self.public_url {
            Some(url) if !url.is_empty() => url.trim_end_matches('/').to_string(),
            _ => format!("http://localhost:{}", self.port),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_url: None,
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    3000
}

/// Which document service backs the pipeline.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SourceMode {
    #[default]
    Simulated,
    Live,
}

/// Document service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub mode: SourceMode,
    /// Base domain of the document service (e.g., "https://playrunner.mortgage.meridianlink.com")
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// OAuth token endpoint
    #[serde(default = "default_oauth_url")]
    pub oauth_url: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    /// Timeout for token and listing calls in seconds (default: 15)
    #[serde(default = "default_metadata_timeout")]
    pub metadata_timeout_secs: u64,
    /// Timeout for document download/upload calls in seconds (default: 30)
    #[serde(default = "default_transfer_timeout")]
    pub transfer_timeout_secs: u64,
    /// Whether the simulated service sleeps to mimic network latency
    #[serde(default = "default_simulated_latency")]
    pub simulated_latency: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            mode: SourceMode::default(),
            base_url: default_base_url(),
            oauth_url: default_oauth_url(),
            client_id: String::new(),
            client_secret: String::new(),
            metadata_timeout_secs: default_metadata_timeout(),
            transfer_timeout_secs: default_transfer_timeout(),
            simulated_latency: default_simulated_latency(),
        }
    }
}

fn default_base_url() -> String {
    "https://playrunner.mortgage.meridianlink.com".to_string()
}

fn default_oauth_url() -> String {
    "https://playrunner.mortgage.meridianlink.com/oauth/token".to_string()
}

fn default_metadata_timeout() -> u64 {
    15
}

fn default_transfer_timeout() -> u64 {
    30
}

fn default_simulated_latency() -> bool {
    true
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub source: SanitizedSourceConfig,
    pub processor: ProcessorConfig,
    pub sessions: SessionConfig,
    pub orchestrator: OrchestratorConfig,
}

/// Sanitized source config (client credentials hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedSourceConfig {
    pub mode: SourceMode,
    pub base_url: String,
    pub oauth_url: String,
    pub client_id_configured: bool,
    pub client_secret_configured: bool,
    pub metadata_timeout_secs: u64,
    pub transfer_timeout_secs: u64,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            source: SanitizedSourceConfig {
                mode: config.source.mode,
                base_url: config.source.base_url.clone(),
                oauth_url: config.source.oauth_url.clone(),
                client_id_configured: !config.source.client_id.is_empty(),
                client_secret_configured: !config.source.client_secret.is_empty(),
                metadata_timeout_secs: config.source.metadata_timeout_secs,
                transfer_timeout_secs: config.source.transfer_timeout_secs,
            },
            processor: config.processor.clone(),
            sessions: config.sessions.clone(),
            orchestrator: config.orchestrator.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_with_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.source.mode, SourceMode::Simulated);
        assert_eq!(config.source.metadata_timeout_secs, 15);
        assert_eq!(config.source.transfer_timeout_secs, 30);
        assert_eq!(config.sessions.ttl_secs, 1800);
        assert_eq!(config.processor.delay_ms, 2000);
    }

    #[test]
    fn test_public_base_defaults_to_localhost() {
        let server = ServerConfig {
            port: 4100,
            ..Default::default()
        };
        assert_eq!(server.public_base(), "http://localhost:4100");
    }

    #[test]
    fn test_public_base_strips_trailing_slash() {
        let server = ServerConfig {
            public_url: Some("https://bridge.example.com/".to_string()),
            ..Default::default()
        };
        assert_eq!(server.public_base(), "https://bridge.example.com");
    }

    #[test]
    fn test_deserialize_live_source() {
        let toml = r#"
[source]
mode = "live"
base_url = "https://lender.example.com"
oauth_url = "https://lender.example.com/oauth/token"
client_id = "client"
client_secret = "secret"
transfer_timeout_secs = 90
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.source.mode, SourceMode::Live);
        assert_eq!(config.source.base_url, "https://lender.example.com");
        assert_eq!(config.source.transfer_timeout_secs, 90);
        assert_eq!(config.source.metadata_timeout_secs, 15); // default
    }

    #[test]
    fn test_sanitized_config_hides_secrets() {
        let mut config = Config::default();
        config.source.client_id = "client".to_string();
        config.source.client_secret = "very-secret".to_string();

        let sanitized = SanitizedConfig::from(&config);
        assert!(sanitized.source.client_id_configured);
        assert!(sanitized.source.client_secret_configured);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("very-secret"));
    }
}
