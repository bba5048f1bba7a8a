//! Configuration for the document processor.

use serde::{Deserialize, Serialize};

/// Configuration for the processing engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Simulated work per document in milliseconds (default: 2000).
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Engine name recorded in metadata and upload notes.
    #[serde(default = "default_engine_name")]
    pub engine_name: String,

    /// Engine version recorded in metadata and the content stamp.
    #[serde(default = "default_engine_version")]
    pub engine_version: String,
}

fn default_delay_ms() -> u64 {
    2000
}

fn default_engine_name() -> String {
    "DocBridge-DocumentEngine".to_string()
}

fn default_engine_version() -> String {
    "1.0.0".to_string()
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            engine_name: default_engine_name(),
            engine_version: default_engine_version(),
        }
    }
}
