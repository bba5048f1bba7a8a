use std::time::{Duration, Instant};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, SecondsFormat, Utc};
use sha2::{Digest, Sha256};
use tracing::{debug, info};
use uuid::Uuid;

use crate::client::Document;

use super::config::ProcessorConfig;
use super::types::{
    ProcessedDocument, ProcessedStatus, ProcessingChecks, ProcessingMetadata, ProcessingStamp,
    ProcessorError,
};

/// Name prefix given to every processed document.
pub const PROCESSED_PREFIX: &str = "PROCESSED_";

/// Used when a document arrives without a name.
const FALLBACK_NAME: &str = "document.pdf";

/// Used when a document arrives without a type.
const FALLBACK_TYPE: &str = "Unknown";

/// Stamps documents and attaches processing metadata.
///
/// Processing is deterministic apart from the timestamp and generated id:
/// the same content processed at the same instant yields the same output.
pub struct DocumentProcessor {
    config: ProcessorConfig,
}

impl DocumentProcessor {
    pub fn new(config: ProcessorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Process a single document.
    pub async fn process(&self, document: &Document) -> Result<ProcessedDocument, ProcessorError> {
        let start = Instant::now();
        debug!(name = %document.name, doc_type = %document.doc_type, "Processing document");

        if self.config.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.delay_ms)).await;
        }

        let processed_at = Utc::now();
        let content = self.stamp_content(document, processed_at)?;

        Ok(ProcessedDocument {
            original_guid: document.guid.clone(),
            processed_id: Uuid::new_v4().to_string(),
            name: format!("{}{}", PROCESSED_PREFIX, or_fallback(&document.name, FALLBACK_NAME)),
            doc_type: or_fallback(&document.doc_type, FALLBACK_TYPE).to_string(),
            content,
            metadata: ProcessingMetadata {
                processor: self.config.engine_name.clone(),
                version: self.config.engine_version.clone(),
                processed_at,
                processing_time_ms: start.elapsed().as_millis() as u64,
                source_digest: digest(&document.content),
                checks: ProcessingChecks::default(),
            },
            status: ProcessedStatus::Processed,
        })
    }

    /// Process documents in input order.
    pub async fn process_all(
        &self,
        documents: &[Document],
    ) -> Result<Vec<ProcessedDocument>, ProcessorError> {
        let mut processed = Vec::with_capacity(documents.len());
        for document in documents {
            processed.push(self.process(document).await?);
        }
        info!(count = processed.len(), "Documents processed");
        Ok(processed)
    }

    /// Prepend the base64 JSON stamp to the (already base64) payload.
    fn stamp_content(
        &self,
        document: &Document,
        at: DateTime<Utc>,
    ) -> Result<String, ProcessorError> {
        let stamp = ProcessingStamp {
            stamp: format!("{}-Processed", self.config.engine_name),
            timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
            engine: format!("v{}", self.config.engine_version),
        };
        let header = serde_json::to_vec(&stamp).map_err(|e| ProcessorError::Stamp {
            name: document.name.clone(),
            reason: e.to_string(),
        })?;
        Ok(format!("{}{}", STANDARD.encode(header), document.content))
    }
}

fn or_fallback<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

fn digest(content: &str) -> String {
    let hash = Sha256::digest(content.as_bytes());
    hash.iter().map(|b| format!("{:02x}", b)).collect()
}
