//! Integration orchestrator.
//!
//! Runs the four-step pipeline for one loan at a time:
//! - **Authenticate**: obtain a credential from the document service
//! - **Receive**: list and download the loan's documents (or accept supplied ones)
//! - **Process**: stamp each document and attach quality checks
//! - **Return**: upload the processed documents back to the loan
//!
//! A second run requested while one is in flight is rejected with a
//! conflict. Finished jobs are kept in an in-memory history.

mod config;
mod runner;
mod types;

pub use config::OrchestratorConfig;
pub use runner::Orchestrator;
pub use types::{
    AuthTestResult, Job, JobMode, JobStatus, OrchestratorError, OrchestratorStatus,
    ProcessingResult, Step, StepError, StepLog, StepName, StepStatus, UploadedFile,
};
