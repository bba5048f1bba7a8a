//! OAuth 2.0 client-credentials authentication.

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use reqwest::Client;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::metrics::UPSTREAM_REQUEST_DURATION;

use super::{AuthError, AuthOutcome, CredentialProvider, TokenResponse};

/// Tokens are refreshed this many seconds before their declared expiry.
pub const TOKEN_REFRESH_MARGIN_SECS: u64 = 300;

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    refresh_at: DateTime<Utc>,
}

/// Exchanges a client id/secret for a bearer token and caches it.
///
/// The cache sits behind an async mutex so concurrent callers share a
/// single refresh instead of racing the token endpoint.
pub struct OAuthCredential {
    client: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    timeout: Duration,
    cache: Mutex<Option<CachedToken>>,
}

impl OAuthCredential {
    pub fn new(
        client: Client,
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            token_url: token_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            timeout,
            cache: Mutex::new(None),
        }
    }

    async fn request_token(&self) -> Result<(CachedToken, AuthOutcome), AuthError> {
        if self.client_id.is_empty() || self.client_secret.is_empty() {
            return Err(AuthError::ConfigurationError(
                "source.client_id and source.client_secret must be set for OAuth \
                 (generate them from the vendor portal)"
                    .to_string(),
            ));
        }

        info!(token_url = %self.token_url, "Requesting OAuth token");
        let start = Instant::now();

        let response = self
            .client
            .post(&self.token_url)
            .timeout(self.timeout)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AuthError::Timeout(self.timeout.as_secs())
                } else {
                    AuthError::ServiceUnavailable(e.to_string())
                }
            })?;

        UPSTREAM_REQUEST_DURATION
            .with_label_values(&["oauth_token"])
            .observe(start.elapsed().as_secs_f64());

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::InvalidCredentials(format!(
                "token endpoint returned HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::ServiceUnavailable(format!("invalid token response: {}", e)))?;

        let Some(access_token) = token.access_token.filter(|t| !t.is_empty()) else {
            warn!("OAuth response did not include an access_token");
            return Err(AuthError::InvalidCredentials(
                "OAuth authentication failed - no access_token returned".to_string(),
            ));
        };

        let expires_in = token.expires_in.unwrap_or(0);
        info!(expires_in, "OAuth token obtained");

        let cached = CachedToken {
            access_token,
            refresh_at: refresh_deadline(Utc::now(), expires_in),
        };
        let outcome = AuthOutcome::new(
            token.token_type.unwrap_or_else(|| "Bearer".to_string()),
            Some(expires_in),
        );
        Ok((cached, outcome))
    }
}

/// Point after which a token issued at `issued_at` must be refreshed.
fn refresh_deadline(issued_at: DateTime<Utc>, expires_in: u64) -> DateTime<Utc> {
    let usable = expires_in.saturating_sub(TOKEN_REFRESH_MARGIN_SECS);
    issued_at + ChronoDuration::seconds(usable as i64)
}

#[async_trait]
impl CredentialProvider for OAuthCredential {
    async fn authenticate(&self) -> Result<AuthOutcome, AuthError> {
        let mut cache = self.cache.lock().await;
        let (token, outcome) = self.request_token().await?;
        *cache = Some(token);
        Ok(outcome)
    }

    async fn ensure_credential(&self) -> Result<String, AuthError> {
        let mut cache = self.cache.lock().await;

        if let Some(token) = cache.as_ref() {
            if Utc::now() < token.refresh_at {
                return Ok(format!("Bearer {}", token.access_token));
            }
            debug!("Cached OAuth token is near expiry, refreshing");
        }

        let (token, _) = self.request_token().await?;
        let credential = format!("Bearer {}", token.access_token);
        *cache = Some(token);
        Ok(credential)
    }

    fn method_name(&self) -> &'static str {
        "oauth"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential(id: &str, secret: &str) -> OAuthCredential {
        OAuthCredential::new(
            Client::new(),
            "http://127.0.0.1:9/oauth/token",
            id,
            secret,
            Duration::from_secs(1),
        )
    }

    #[test]
    fn test_refresh_deadline_applies_margin() {
        let issued = Utc::now();
        let deadline = refresh_deadline(issued, 14400);
        assert_eq!((deadline - issued).num_seconds(), 14100);
    }

    #[test]
    fn test_refresh_deadline_short_lifetime_is_immediate() {
        let issued = Utc::now();
        assert_eq!(refresh_deadline(issued, 120), issued);
        assert_eq!(refresh_deadline(issued, 0), issued);
    }

    #[tokio::test]
    async fn test_missing_client_id_fails_fast() {
        let result = credential("", "secret").authenticate().await;
        assert!(matches!(result, Err(AuthError::ConfigurationError(_))));
    }

    #[tokio::test]
    async fn test_missing_secret_fails_fast_on_ensure() {
        let result = credential("client", "").ensure_credential().await;
        assert!(matches!(result, Err(AuthError::ConfigurationError(_))));
    }

    #[test]
    fn test_method_name() {
        assert_eq!(credential("a", "b").method_name(), "oauth");
    }
}
