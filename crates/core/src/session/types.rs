use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Launch session configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Session lifetime in seconds (default: 1800).
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    /// How often expired sessions are swept, in seconds (default: 300).
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

fn default_ttl_secs() -> u64 {
    30 * 60
}

fn default_sweep_interval_secs() -> u64 {
    5 * 60
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(String),

    #[error("Session expired: {0}")]
    Expired(String),

    #[error("Session storage error: {0}")]
    Storage(String),
}

/// Everything captured from a validated launch request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateSessionRequest {
    pub loan_number: String,
    pub user_login: String,
    pub encrypted_ticket: String,
    pub vendor_username: String,
    pub vendor_account_id: String,
}

/// A pending launch, keyed by an unguessable id.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub loan_number: String,
    pub user_login: String,
    /// Launch ticket, possibly empty
    pub encrypted_ticket: String,
    pub vendor_username: String,
    pub vendor_account_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn has_ticket(&self) -> bool {
        !self.encrypted_ticket.is_empty()
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            loan_number: self.loan_number.clone(),
            user_login: self.user_login.clone(),
            has_ticket: self.has_ticket(),
            created_at: self.created_at,
            expires_at: self.expires_at,
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("loan_number", &self.loan_number)
            .field("user_login", &self.user_login)
            .field("has_ticket", &self.has_ticket())
            .field("created_at", &self.created_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Session view returned to the pop-up page. Never includes the ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub loan_number: String,
    pub user_login: String,
    pub has_ticket: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
