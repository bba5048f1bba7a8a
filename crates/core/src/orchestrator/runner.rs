//! Integration orchestrator: authenticate, receive, process, return.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::client::{ClientMode, Document, DocumentClient, UploadRequest};
use crate::metrics::{DOCUMENTS_TOTAL, JOBS_FINISHED, JOBS_STARTED, JOB_DURATION, STEP_FAILURES};
use crate::processor::DocumentProcessor;

use super::config::OrchestratorConfig;
use super::types::{
    AuthTestResult, Job, JobMode, JobStatus, OrchestratorError, OrchestratorStatus,
    ProcessingResult, StepError, StepName, StepStatus, UploadedFile,
};

type JobHandle = Arc<RwLock<Job>>;

/// Where a job's documents come from.
enum Intake {
    /// List and download them from the document service.
    Fetch,
    /// Use documents supplied by the caller.
    Supplied(Vec<Document>),
}

/// Clears the client's credential override when dropped.
struct CredentialOverrideGuard {
    client: Arc<dyn DocumentClient>,
}

impl Drop for CredentialOverrideGuard {
    fn drop(&mut self) {
        self.client.clear_credential_override();
    }
}

/// Runs at most one integration job at a time and keeps a history of
/// finished jobs.
pub struct Orchestrator {
    config: OrchestratorConfig,
    client: Arc<dyn DocumentClient>,
    processor: DocumentProcessor,
    current: RwLock<Option<JobHandle>>,
    history: RwLock<Vec<Job>>,
}

impl Orchestrator {
    pub fn new(
        config: OrchestratorConfig,
        client: Arc<dyn DocumentClient>,
        processor: DocumentProcessor,
    ) -> Self {
        Self {
            config,
            client,
            processor,
            current: RwLock::new(None),
            history: RwLock::new(Vec::new()),
        }
    }

    pub fn client(&self) -> &Arc<dyn DocumentClient> {
        &self.client
    }

    /// Mode for jobs that fetch with the default credential.
    pub fn default_mode(&self) -> JobMode {
        match self.client.mode() {
            ClientMode::Simulated => JobMode::Simulated,
            ClientMode::Live => JobMode::Live,
        }
    }

    /// Run the full pipeline for a loan and return the finished job.
    ///
    /// Pipeline failures are recorded on the returned job; only validation
    /// and conflicts are errors.
    pub async fn run(&self, loan_number: &str) -> Result<Job, OrchestratorError> {
        let mode = self.default_mode();
        let job = self.reserve(loan_number, || mode).await?;
        Ok(self.execute(job, Intake::Fetch, None).await)
    }

    /// Run the pipeline on caller-supplied documents instead of fetching.
    pub async fn run_with_documents(
        &self,
        loan_number: &str,
        documents: Vec<Document>,
    ) -> Result<Job, OrchestratorError> {
        if documents.is_empty() {
            return Err(OrchestratorError::Validation(
                "At least one document is required".to_string(),
            ));
        }
        let job = self
            .reserve(loan_number, || JobMode::DocumentUpload)
            .await?;
        Ok(self
            .execute(job, Intake::Supplied(documents), None)
            .await)
    }

    /// Run the full pipeline, using `credential` in place of the default
    /// credential for this job only.
    pub async fn run_with_credential(
        &self,
        loan_number: &str,
        credential: Option<String>,
    ) -> Result<Job, OrchestratorError> {
        let (job, guard) = self.reserve_with_credential(loan_number, credential).await?;
        Ok(self.execute(job, Intake::Fetch, Some(guard)).await)
    }

    /// Reserve the run slot and execute the pipeline in the background.
    ///
    /// Returns the new job's id as soon as the slot is held.
    pub async fn start_with_credential(
        self: &Arc<Self>,
        loan_number: &str,
        credential: Option<String>,
    ) -> Result<String, OrchestratorError> {
        let (job, guard) = self.reserve_with_credential(loan_number, credential).await?;
        let job_id = job.read().await.id.clone();

        let orchestrator = Arc::clone(self);
        tokio::spawn(async move {
            let job = orchestrator.execute(job, Intake::Fetch, Some(guard)).await;
            debug!(job_id = %job.id, status = ?job.status, "Background job finished");
        });

        Ok(job_id)
    }

    /// Current job if one is running, otherwise the most recent one.
    pub async fn status(&self) -> OrchestratorStatus {
        let current = self.current.read().await.clone();
        if let Some(handle) = current {
            return OrchestratorStatus {
                running: true,
                job: Some(handle.read().await.clone()),
            };
        }

        OrchestratorStatus {
            running: false,
            job: self.history.read().await.last().cloned(),
        }
    }

    /// Finished jobs, most recent first.
    pub async fn history(&self) -> Vec<Job> {
        self.history.read().await.iter().rev().cloned().collect()
    }

    /// Check the default credential without starting a job.
    pub async fn test_auth(&self) -> AuthTestResult {
        match self.client.authenticate().await {
            Ok(outcome) => AuthTestResult::success(outcome),
            Err(e) => AuthTestResult::failure(e.to_string()),
        }
    }

    /// Take the run slot for a new job. `mode` is evaluated while the slot
    /// is held, after the conflict check.
    async fn reserve(
        &self,
        loan_number: &str,
        mode: impl FnOnce() -> JobMode,
    ) -> Result<JobHandle, OrchestratorError> {
        let loan_number = loan_number.trim();
        if loan_number.is_empty() {
            return Err(OrchestratorError::Validation(
                "Missing required field: loanNumber".to_string(),
            ));
        }

        let mut current = self.current.write().await;
        if let Some(running) = current.as_ref() {
            let job_id = running.read().await.id.clone();
            return Err(OrchestratorError::Conflict { job_id });
        }

        let job = Job::new(loan_number, mode());
        info!(job_id = %job.id, loan_number, mode = job.mode.as_str(), "Starting integration job");
        JOBS_STARTED.with_label_values(&[job.mode.as_str()]).inc();

        let handle = Arc::new(RwLock::new(job));
        *current = Some(Arc::clone(&handle));
        Ok(handle)
    }

    /// Reserve the slot and, only then, route the client through `credential`.
    async fn reserve_with_credential(
        &self,
        loan_number: &str,
        credential: Option<String>,
    ) -> Result<(JobHandle, CredentialOverrideGuard), OrchestratorError> {
        let default_mode = self.default_mode();
        let client = Arc::clone(&self.client);

        let job = self
            .reserve(loan_number, || match credential.as_deref() {
                Some(c) if !c.is_empty() && client.install_credential_override(c) => {
                    JobMode::TicketLaunched
                }
                _ => default_mode,
            })
            .await?;

        Ok((
            job,
            CredentialOverrideGuard {
                client: Arc::clone(&self.client),
            },
        ))
    }

    async fn execute(
        &self,
        job: JobHandle,
        intake: Intake,
        credential_override: Option<CredentialOverrideGuard>,
    ) -> Job {
        let loan_number = job.read().await.loan_number.clone();

        let result = match intake {
            Intake::Fetch => self.fetch_pipeline(&job, &loan_number).await,
            Intake::Supplied(documents) => {
                self.supplied_pipeline(&job, &loan_number, documents).await
            }
        };

        self.finish(job, result, credential_override).await
    }

    async fn fetch_pipeline(&self, job: &JobHandle, loan_number: &str) -> Result<(), StepError> {
        use StepName::{Authenticate, Receive};
        use StepStatus::{Completed, InProgress};

        update_step(job, Authenticate, InProgress, "Authenticating with the document service...")
            .await;
        let outcome = self.client.authenticate().await?;
        update_step(
            job,
            Authenticate,
            Completed,
            format!("Authenticated - {} credential obtained", outcome.token_type),
        )
        .await;

        update_step(
            job,
            Receive,
            InProgress,
            format!("Fetching document list for loan {}...", loan_number),
        )
        .await;
        let references = self.client.list_documents(loan_number).await?;
        let count = references.len();
        if count == 0 {
            update_step(
                job,
                Receive,
                InProgress,
                format!("No documents found for loan {}", loan_number),
            )
            .await;
        } else {
            update_step(
                job,
                Receive,
                InProgress,
                format!("Found {} documents. Downloading...", count),
            )
            .await;
        }

        let mut documents = Vec::with_capacity(count);
        for reference in references {
            let download = self.client.download_document(&reference).await?;
            documents.push(Document::from_download(reference, download));
        }

        update_step(
            job,
            Receive,
            Completed,
            format!("Received {} documents from the document service", count),
        )
        .await;
        job.write().await.documents_received = Some(count);
        DOCUMENTS_TOTAL
            .with_label_values(&["received"])
            .inc_by(count as u64);

        self.process_and_return(job, loan_number, &documents, false)
            .await
    }

    async fn supplied_pipeline(
        &self,
        job: &JobHandle,
        loan_number: &str,
        documents: Vec<Document>,
    ) -> Result<(), StepError> {
        use StepName::{Authenticate, Receive};
        use StepStatus::{Completed, InProgress};

        update_step(job, Authenticate, InProgress, "Authenticating (document upload mode)...")
            .await;
        pause(self.config.upload_auth_delay_ms).await;
        update_step(job, Authenticate, Completed, "Authenticated - document upload mode").await;

        let count = documents.len();
        update_step(
            job,
            Receive,
            InProgress,
            format!("Receiving {} uploaded document(s)...", count),
        )
        .await;
        pause(self.config.upload_receive_delay_ms).await;

        let names = documents
            .iter()
            .map(|d| d.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        update_step(
            job,
            Receive,
            Completed,
            format!("Received {} document(s): {}", count, names),
        )
        .await;
        {
            let mut job = job.write().await;
            job.documents_received = Some(count);
            job.uploaded_files = documents.iter().map(UploadedFile::from).collect();
        }
        DOCUMENTS_TOTAL
            .with_label_values(&["received"])
            .inc_by(count as u64);

        self.process_and_return(job, loan_number, &documents, true)
            .await
    }

    async fn process_and_return(
        &self,
        job: &JobHandle,
        loan_number: &str,
        documents: &[Document],
        record_results: bool,
    ) -> Result<(), StepError> {
        use StepName::{Process, Return};
        use StepStatus::{Completed, InProgress};

        update_step(
            job,
            Process,
            InProgress,
            format!("Processing {} documents...", documents.len()),
        )
        .await;
        let processed = self.processor.process_all(documents).await?;
        update_step(
            job,
            Process,
            Completed,
            format!("Processed {} documents successfully", processed.len()),
        )
        .await;
        {
            let mut job = job.write().await;
            job.documents_processed = Some(processed.len());
            if record_results {
                job.processing_results = processed.iter().map(ProcessingResult::from).collect();
            }
        }
        DOCUMENTS_TOTAL
            .with_label_values(&["processed"])
            .inc_by(processed.len() as u64);

        update_step(
            job,
            Return,
            InProgress,
            format!("Uploading {} processed documents...", processed.len()),
        )
        .await;
        let mut returned = 0;
        for document in &processed {
            let request = UploadRequest {
                loan_number: loan_number.to_string(),
                document_type: format!("Processed - {}", document.doc_type),
                content: document.content.clone(),
                notes: format!(
                    "Processed by {} at {}",
                    document.metadata.processor,
                    document.metadata.processed_at.to_rfc3339()
                ),
            };
            self.client.upload_document(&request).await?;
            returned += 1;
        }
        update_step(
            job,
            Return,
            Completed,
            format!(
                "Returned {} processed documents to the document service",
                returned
            ),
        )
        .await;
        job.write().await.documents_returned = Some(returned);
        DOCUMENTS_TOTAL
            .with_label_values(&["returned"])
            .inc_by(returned as u64);

        Ok(())
    }

    /// Record the terminal status, archive the job and release the slot.
    async fn finish(
        &self,
        job: JobHandle,
        result: Result<(), StepError>,
        credential_override: Option<CredentialOverrideGuard>,
    ) -> Job {
        let snapshot = {
            let mut job = job.write().await;
            match &result {
                Ok(()) => job.complete(),
                Err(e) => {
                    if let Some(step) = job.steps.iter().find(|s| s.status == StepStatus::InProgress)
                    {
                        STEP_FAILURES.with_label_values(&[step.name.as_str()]).inc();
                    }
                    job.fail(e.to_string());
                }
            }
            job.clone()
        };

        let outcome = if snapshot.status == JobStatus::Completed {
            info!(
                job_id = %snapshot.id,
                duration_ms = snapshot.duration.unwrap_or_default(),
                received = snapshot.documents_received.unwrap_or_default(),
                processed = snapshot.documents_processed.unwrap_or_default(),
                returned = snapshot.documents_returned.unwrap_or_default(),
                "Integration job completed"
            );
            "completed"
        } else {
            error!(
                job_id = %snapshot.id,
                error = snapshot.error.as_deref().unwrap_or_default(),
                "Integration job failed"
            );
            "failed"
        };
        JOBS_FINISHED
            .with_label_values(&[snapshot.mode.as_str(), outcome])
            .inc();
        JOB_DURATION
            .with_label_values(&[outcome])
            .observe(snapshot.duration.unwrap_or_default() as f64 / 1000.0);

        // The override and the history entry must both be settled before
        // the slot opens for the next job.
        let mut current = self.current.write().await;
        drop(credential_override);
        {
            let mut history = self.history.write().await;
            history.push(snapshot.clone());
            let limit = self.config.history_limit;
            if limit > 0 && history.len() > limit {
                let excess = history.len() - limit;
                history.drain(..excess);
            }
        }
        *current = None;

        snapshot
    }
}

async fn update_step(
    job: &JobHandle,
    name: StepName,
    status: StepStatus,
    message: impl Into<String>,
) {
    let message = message.into();
    info!(step = name.as_str(), status = ?status, "{}", message);
    job.write().await.set_step(name, status, message);
}

async fn pause(ms: u64) {
    if ms > 0 {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}
