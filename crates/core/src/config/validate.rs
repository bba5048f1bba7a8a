use super::{types::Config, ConfigError, SourceMode};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - public_url, if set, is an http(s) URL
/// - Upstream timeouts and session TTL are non-zero
/// - Live mode has both service URLs
///
/// Missing OAuth client credentials are tolerated here; they fail the
/// authenticate step of a job instead.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if let Some(url) = &config.server.public_url {
        if !url.is_empty() && !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::ValidationError(format!(
                "server.public_url must start with http:// or https://, got {}",
                url
            )));
        }
    }

    if config.source.metadata_timeout_secs == 0 || config.source.transfer_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "source timeouts must be greater than 0".to_string(),
        ));
    }

    if config.sessions.ttl_secs == 0 {
        return Err(ConfigError::ValidationError(
            "sessions.ttl_secs cannot be 0".to_string(),
        ));
    }

    if config.source.mode == SourceMode::Live
        && (config.source.base_url.is_empty() || config.source.oauth_url.is_empty())
    {
        return Err(ConfigError::ValidationError(
            "source.base_url and source.oauth_url are required in live mode".to_string(),
        ));
    }

    Ok(())
}
