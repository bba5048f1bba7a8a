//! Types for processed documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Outcome of an individual quality check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CheckResult {
    Pass,
    Clear,
}

/// Quality checks attached to every processed document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingChecks {
    pub format_validation: CheckResult,
    pub content_integrity: CheckResult,
    pub compliance_flag: CheckResult,
}

impl Default for ProcessingChecks {
    fn default() -> Self {
        Self {
            format_validation: CheckResult::Pass,
            content_integrity: CheckResult::Pass,
            compliance_flag: CheckResult::Clear,
        }
    }
}

/// Processing metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingMetadata {
    pub processor: String,
    pub version: String,
    pub processed_at: DateTime<Utc>,
    pub processing_time_ms: u64,
    /// SHA-256 of the incoming payload, hex-encoded.
    pub source_digest: String,
    pub checks: ProcessingChecks,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessedStatus {
    Processed,
}

/// A document after the processing stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedDocument {
    pub original_guid: String,
    pub processed_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    /// Stamped, base64-encoded payload
    pub content: String,
    pub metadata: ProcessingMetadata,
    pub status: ProcessedStatus,
}

/// Header prepended to processed content, base64-encoded as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ProcessingStamp {
    pub stamp: String,
    pub timestamp: String,
    pub engine: String,
}

#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("Failed to process document {name}: {reason}")]
    Stamp { name: String, reason: String },
}
