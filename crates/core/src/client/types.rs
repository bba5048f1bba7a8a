use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::AuthError;

/// Which document service a client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientMode {
    Simulated,
    Live,
}

impl ClientMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientMode::Simulated => "simulated",
            ClientMode::Live => "live",
        }
    }
}

/// Errors from document client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("{operation} timed out after {secs}s")]
    Timeout { operation: &'static str, secs: u64 },

    #[error("Connection to document service failed: {0}")]
    ConnectionFailed(String),

    #[error("Document service error: {0}")]
    Upstream(String),

    #[error("Invalid response from document service: {0}")]
    Parse(String),

    #[error("Client configuration error: {0}")]
    Configuration(String),
}

/// Document metadata as listed by the document service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRef {
    pub guid: String,
    pub name: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    #[serde(default)]
    pub folder: String,
    #[serde(default)]
    pub date_modified: String,
    #[serde(default)]
    pub size: u64,
}

/// Content returned by a download.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadedDocument {
    pub guid: String,
    /// Base64-encoded payload
    pub content: String,
    pub format: String,
}

/// A document with its content, ready for processing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub guid: String,
    pub name: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    #[serde(default)]
    pub folder: String,
    #[serde(default)]
    pub date_modified: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default = "default_format")]
    pub format: String,
    /// Base64-encoded payload
    #[serde(default)]
    pub content: String,
}

fn default_format() -> String {
    "pdf".to_string()
}

impl Document {
    pub fn from_download(reference: DocumentRef, download: DownloadedDocument) -> Self {
        Self {
            guid: reference.guid,
            name: reference.name,
            doc_type: reference.doc_type,
            folder: reference.folder,
            date_modified: reference.date_modified,
            size: reference.size,
            format: download.format,
            content: download.content,
        }
    }
}

/// A processed document sent back to the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    pub loan_number: String,
    pub document_type: String,
    /// Base64-encoded payload
    pub content: String,
    pub notes: String,
}

/// Acknowledgement of an upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    pub success: bool,
    pub loan_number: String,
    pub document_type: String,
    /// Raw result reported by the service
    pub result: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<DateTime<Utc>>,
}
