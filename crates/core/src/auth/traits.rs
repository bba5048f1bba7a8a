use async_trait::async_trait;
use thiserror::Error;

use super::types::AuthOutcome;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Authentication service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Authentication request timed out after {0}s")]
    Timeout(u64),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

/// Source of the `sTicket` value sent with every document service call.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Establish a credential with the issuer (no-op for pre-issued tickets)
    async fn authenticate(&self) -> Result<AuthOutcome, AuthError>;

    /// Return a usable credential, re-authenticating first if needed
    async fn ensure_credential(&self) -> Result<String, AuthError>;

    /// Name of this credential method
    fn method_name(&self) -> &'static str;
}
