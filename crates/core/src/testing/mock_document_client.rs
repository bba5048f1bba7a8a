//! Mock document client for testing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::auth::{AuthError, AuthOutcome};
use crate::client::{
    ClientError, ClientMode, DocumentClient, DocumentRef, DownloadedDocument, UploadReceipt,
    UploadRequest,
};

use super::fixtures;

/// Credential the mock hands out when no override is installed.
pub const MOCK_DEFAULT_CREDENTIAL: &str = "Bearer mock-token";

/// Operations that can be scripted to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOperation {
    Authenticate,
    ListDocuments,
    DownloadDocument,
    UploadDocument,
}

/// A scripted failure. Turned into a fresh [`ClientError`] on every call.
#[derive(Debug, Clone)]
pub enum MockFailure {
    Credential(String),
    Upstream(String),
    Timeout,
}

impl MockFailure {
    fn to_error(&self, operation: MockOperation) -> ClientError {
        match self {
            MockFailure::Credential(msg) => {
                ClientError::Auth(AuthError::InvalidCredentials(msg.clone()))
            }
            MockFailure::Upstream(msg) => ClientError::Upstream(msg.clone()),
            MockFailure::Timeout => ClientError::Timeout {
                operation: match operation {
                    MockOperation::Authenticate => "authenticate",
                    MockOperation::ListDocuments => "ListEdocsByLoanNumber",
                    MockOperation::DownloadDocument => "DownloadEdocsPdfById",
                    MockOperation::UploadDocument => "UploadPDFDocument",
                },
                secs: 1,
            },
        }
    }
}

/// A recorded call for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub operation: MockOperation,
    /// Credential in effect when the call was made.
    pub credential: String,
}

/// Mock implementation of the DocumentClient trait.
///
/// Provides controllable behavior for testing:
/// - Return a configurable document list
/// - Record every call with the credential in effect
/// - Simulate failures per operation and add latency
///
/// # Example
///
/// ```rust,ignore
/// use docbridge_core::testing::{MockDocumentClient, MockOperation, MockFailure};
///
/// let client = MockDocumentClient::new();
/// client.fail_on(MockOperation::UploadDocument, MockFailure::Upstream("down".into())).await;
///
/// // Run a job, then inspect what happened
/// let uploads = client.uploads().await;
/// ```
pub struct MockDocumentClient {
    mode: ClientMode,
    honors_overrides: bool,
    documents: Arc<RwLock<Vec<DocumentRef>>>,
    failures: Arc<RwLock<HashMap<MockOperation, MockFailure>>>,
    delay: Arc<RwLock<Duration>>,
    calls: Arc<RwLock<Vec<RecordedCall>>>,
    uploads: Arc<RwLock<Vec<UploadRequest>>>,
    credential_override: Mutex<Option<String>>,
    override_history: Mutex<Vec<String>>,
}

impl Default for MockDocumentClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDocumentClient {
    /// A live-mode mock that honours credential overrides and lists two
    /// sample documents.
    pub fn new() -> Self {
        Self {
            mode: ClientMode::Live,
            honors_overrides: true,
            documents: Arc::new(RwLock::new(vec![
                fixtures::document_ref("doc-1", "Appraisal.pdf", "Appraisal"),
                fixtures::document_ref("doc-2", "Credit_Report.pdf", "Credit Report"),
            ])),
            failures: Arc::new(RwLock::new(HashMap::new())),
            delay: Arc::new(RwLock::new(Duration::ZERO)),
            calls: Arc::new(RwLock::new(Vec::new())),
            uploads: Arc::new(RwLock::new(Vec::new())),
            credential_override: Mutex::new(None),
            override_history: Mutex::new(Vec::new()),
        }
    }

    /// A simulated-mode mock that ignores credential overrides.
    pub fn simulated() -> Self {
        Self {
            mode: ClientMode::Simulated,
            honors_overrides: false,
            ..Self::new()
        }
    }

    pub async fn set_documents(&self, documents: Vec<DocumentRef>) {
        *self.documents.write().await = documents;
    }

    pub async fn fail_on(&self, operation: MockOperation, failure: MockFailure) {
        self.failures.write().await.insert(operation, failure);
    }

    pub async fn clear_failures(&self) {
        self.failures.write().await.clear();
    }

    /// Latency added to every call.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }

    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.read().await.clone()
    }

    pub async fn calls_for(&self, operation: MockOperation) -> Vec<RecordedCall> {
        self.calls
            .read()
            .await
            .iter()
            .filter(|c| c.operation == operation)
            .cloned()
            .collect()
    }

    pub async fn uploads(&self) -> Vec<UploadRequest> {
        self.uploads.read().await.clone()
    }

    /// Override currently installed, if any.
    pub fn active_override(&self) -> Option<String> {
        self.credential_override
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Every override ever installed, in order.
    pub fn override_history(&self) -> Vec<String> {
        self.override_history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn enter(&self, operation: MockOperation) -> Result<(), ClientError> {
        let delay = *self.delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let credential = self
            .active_override()
            .unwrap_or_else(|| MOCK_DEFAULT_CREDENTIAL.to_string());
        self.calls.write().await.push(RecordedCall {
            operation,
            credential,
        });

        match self.failures.read().await.get(&operation) {
            Some(failure) => Err(failure.to_error(operation)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DocumentClient for MockDocumentClient {
    fn name(&self) -> &str {
        "mock"
    }

    fn mode(&self) -> ClientMode {
        self.mode
    }

    async fn authenticate(&self) -> Result<AuthOutcome, ClientError> {
        self.enter(MockOperation::Authenticate).await?;
        if self.active_override().is_some() {
            Ok(AuthOutcome::new("GenericFrameworkTicket", Some(1800)))
        } else {
            Ok(AuthOutcome::new("Bearer", Some(14400)))
        }
    }

    async fn ensure_credential(&self) -> Result<String, ClientError> {
        Ok(self
            .active_override()
            .unwrap_or_else(|| MOCK_DEFAULT_CREDENTIAL.to_string()))
    }

    async fn list_documents(&self, _loan_number: &str) -> Result<Vec<DocumentRef>, ClientError> {
        self.enter(MockOperation::ListDocuments).await?;
        Ok(self.documents.read().await.clone())
    }

    async fn download_document(
        &self,
        document: &DocumentRef,
    ) -> Result<DownloadedDocument, ClientError> {
        self.enter(MockOperation::DownloadDocument).await?;
        Ok(DownloadedDocument {
            guid: document.guid.clone(),
            content: format!("JVBERi0-{}", document.guid),
            format: "pdf".to_string(),
        })
    }

    async fn upload_document(&self, request: &UploadRequest) -> Result<UploadReceipt, ClientError> {
        self.enter(MockOperation::UploadDocument).await?;
        self.uploads.write().await.push(request.clone());
        Ok(UploadReceipt {
            success: true,
            loan_number: request.loan_number.clone(),
            document_type: request.document_type.clone(),
            result: "uploaded".to_string(),
            id: None,
            uploaded_at: None,
        })
    }

    fn install_credential_override(&self, credential: &str) -> bool {
        if !self.honors_overrides {
            return false;
        }
        *self
            .credential_override
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(credential.to_string());
        self.override_history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(credential.to_string());
        true
    }

    fn clear_credential_override(&self) {
        *self
            .credential_override
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }
}
