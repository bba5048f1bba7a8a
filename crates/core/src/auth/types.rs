use serde::{Deserialize, Serialize};

/// Result of a successful authenticate call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthOutcome {
    pub token_type: String,
    /// Declared lifetime in seconds, when the issuer reports one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
}

impl AuthOutcome {
    pub fn new(token_type: impl Into<String>, expires_in: Option<u64>) -> Self {
        Self {
            token_type: token_type.into(),
            expires_in,
        }
    }
}

/// Body returned by the OAuth token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}
