mod oauth;
mod slot;
mod ticket;
mod traits;
mod types;

pub use oauth::*;
pub use slot::*;
pub use ticket::*;
pub use traits::*;
pub use types::*;

use std::time::Duration;

use crate::config::SourceConfig;

/// Factory function to create the default (OAuth) credential provider from config.
///
/// Client credentials are not checked here; an empty id or secret surfaces as
/// a configuration error on the first authenticate call.
pub fn create_credential_provider(
    config: &SourceConfig,
    http: reqwest::Client,
) -> OAuthCredential {
    OAuthCredential::new(
        http,
        config.oauth_url.clone(),
        config.client_id.clone(),
        config.client_secret.clone(),
        Duration::from_secs(config.metadata_timeout_secs),
    )
}
