//! Orchestrator configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the integration orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Pause standing in for authentication when documents are supplied
    /// directly (milliseconds).
    #[serde(default = "default_upload_auth_delay")]
    pub upload_auth_delay_ms: u64,

    /// Pause standing in for receipt when documents are supplied directly
    /// (milliseconds).
    #[serde(default = "default_upload_receive_delay")]
    pub upload_receive_delay_ms: u64,

    /// Maximum finished jobs kept in history (0 = unlimited).
    #[serde(default)]
    pub history_limit: usize,
}

fn default_upload_auth_delay() -> u64 {
    300
}

fn default_upload_receive_delay() -> u64 {
    500
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            upload_auth_delay_ms: default_upload_auth_delay(),
            upload_receive_delay_ms: default_upload_receive_delay(),
            history_limit: 0,
        }
    }
}
