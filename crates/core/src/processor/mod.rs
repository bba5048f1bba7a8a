//! Document processing stage.
//!
//! `DocumentProcessor` stamps each received document, records a digest of
//! the incoming payload and attaches quality-check metadata. Processing is
//! simulated: the configured delay stands in for real analysis work.

mod config;
mod engine;
mod types;

pub use config::ProcessorConfig;
pub use engine::{DocumentProcessor, PROCESSED_PREFIX};
pub use types::{
    CheckResult, ProcessedDocument, ProcessedStatus, ProcessingChecks, ProcessingMetadata,
    ProcessorError,
};
