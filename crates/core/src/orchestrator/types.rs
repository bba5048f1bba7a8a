//! Types for the integration orchestrator.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;
use uuid::Uuid;

use crate::auth::{AuthError, AuthOutcome};
use crate::client::{ClientError, Document};
use crate::processor::{ProcessedDocument, ProcessingChecks, ProcessorError};

/// Errors returned when a job cannot be started.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// The request is missing or has invalid input.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Another job holds the single run slot.
    #[error("An integration job is already running: {job_id}")]
    Conflict { job_id: String },
}

/// Failure inside a running pipeline. Recorded on the job, never returned
/// to the caller.
#[derive(Debug, Error)]
pub enum StepError {
    #[error("{0}")]
    Credential(AuthError),

    #[error("{0}")]
    Upstream(ClientError),

    #[error("{0}")]
    Processing(#[from] ProcessorError),
}

impl From<ClientError> for StepError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::Auth(auth) => StepError::Credential(auth),
            other => StepError::Upstream(other),
        }
    }
}

/// How a job was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobMode {
    Simulated,
    Live,
    /// Live run authenticated with a launch ticket.
    TicketLaunched,
    /// Documents supplied directly instead of fetched.
    DocumentUpload,
}

impl JobMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobMode::Simulated => "simulated",
            JobMode::Live => "live",
            JobMode::TicketLaunched => "ticket-launched",
            JobMode::DocumentUpload => "document-upload",
        }
    }
}

/// Pipeline steps, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepName {
    Authenticate,
    Receive,
    Process,
    Return,
}

impl StepName {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepName::Authenticate => "authenticate",
            StepName::Receive => "receive",
            StepName::Process => "process",
            StepName::Return => "return",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    InProgress,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Starting,
    Authenticate,
    Receive,
    Process,
    Return,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl From<StepName> for JobStatus {
    fn from(step: StepName) -> Self {
        match step {
            StepName::Authenticate => JobStatus::Authenticate,
            StepName::Receive => JobStatus::Receive,
            StepName::Process => JobStatus::Process,
            StepName::Return => JobStatus::Return,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub name: StepName,
    pub status: StepStatus,
    pub message: String,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A job's steps, at most one entry per step name, kept in pipeline order.
///
/// Serialized as a list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepLog(BTreeMap<StepName, Step>);

impl StepLog {
    /// Insert a step or update the existing entry for that name.
    pub fn upsert(
        &mut self,
        name: StepName,
        status: StepStatus,
        message: String,
        now: DateTime<Utc>,
    ) {
        self.0
            .entry(name)
            .and_modify(|step| {
                step.status = status;
                step.message = message.clone();
                step.updated_at = now;
            })
            .or_insert_with(|| Step {
                name,
                status,
                message,
                started_at: now,
                updated_at: now,
            });
    }

    pub fn get(&self, name: StepName) -> Option<&Step> {
        self.0.get(&name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Step> {
        self.0.values()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The step currently in progress, if any.
    pub fn in_progress_mut(&mut self) -> Option<&mut Step> {
        self.0
            .values_mut()
            .find(|s| s.status == StepStatus::InProgress)
    }
}

impl Serialize for StepLog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.values())
    }
}

/// A supplied document, as recorded on a document-upload job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub name: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub size: u64,
    pub format: String,
}

impl From<&Document> for UploadedFile {
    fn from(document: &Document) -> Self {
        Self {
            name: document.name.clone(),
            doc_type: document.doc_type.clone(),
            size: document.size,
            format: document.format.clone(),
        }
    }
}

/// Per-document processing summary, recorded on document-upload jobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingResult {
    pub name: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub original_guid: String,
    pub processed_id: String,
    pub checks: ProcessingChecks,
    pub processing_time_ms: u64,
}

impl From<&ProcessedDocument> for ProcessingResult {
    fn from(document: &ProcessedDocument) -> Self {
        Self {
            name: document.name.clone(),
            doc_type: document.doc_type.clone(),
            original_guid: document.original_guid.clone(),
            processed_id: document.processed_id.clone(),
            checks: document.metadata.checks.clone(),
            processing_time_ms: document.metadata.processing_time_ms,
        }
    }
}

/// One execution of the pipeline for a loan.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub loan_number: String,
    pub mode: JobMode,
    pub status: JobStatus,
    pub steps: StepLog,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documents_received: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documents_processed: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documents_returned: Option<usize>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Wall-clock duration in milliseconds, set once the job is terminal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub uploaded_files: Vec<UploadedFile>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub processing_results: Vec<ProcessingResult>,
}

impl Job {
    pub fn new(loan_number: impl Into<String>, mode: JobMode) -> Self {
        Self {
            id: format!("job-{}", Uuid::new_v4()),
            loan_number: loan_number.into(),
            mode,
            status: JobStatus::Starting,
            steps: StepLog::default(),
            documents_received: None,
            documents_processed: None,
            documents_returned: None,
            started_at: Utc::now(),
            completed_at: None,
            duration: None,
            error: None,
            uploaded_files: Vec::new(),
            processing_results: Vec::new(),
        }
    }

    pub fn set_step(&mut self, name: StepName, status: StepStatus, message: String) {
        self.steps.upsert(name, status, message, Utc::now());
        self.status = JobStatus::from(name);
    }

    pub fn complete(&mut self) {
        self.status = JobStatus::Completed;
        self.stop_clock();
    }

    /// Mark the job failed, attaching the message to the step in progress.
    pub fn fail(&mut self, message: String) {
        let now = Utc::now();
        if let Some(step) = self.steps.in_progress_mut() {
            step.status = StepStatus::Failed;
            step.message = message.clone();
            step.updated_at = now;
        }
        self.status = JobStatus::Failed;
        self.error = Some(message);
        self.stop_clock();
    }

    fn stop_clock(&mut self) {
        let now = Utc::now();
        self.completed_at = Some(now);
        self.duration = Some((now - self.started_at).num_milliseconds().max(0));
    }
}

/// Snapshot returned by the status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct OrchestratorStatus {
    pub running: bool,
    /// Job in flight, or the most recently finished job when idle.
    pub job: Option<Job>,
}

/// Result of a credential check against the document service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTestResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuthTestResult {
    pub fn success(outcome: AuthOutcome) -> Self {
        Self {
            success: true,
            token_type: Some(outcome.token_type),
            expires_in: outcome.expires_in,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            token_type: None,
            expires_in: None,
            error: Some(error.into()),
        }
    }
}
