//! Integration pipeline API handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

use docbridge_core::{
    AuthTestResult, Document, DocumentRef, Job, OrchestratorError, OrchestratorStatus,
};

use crate::state::AppState;

/// Loan number used when an upload does not name one.
const DEFAULT_UPLOAD_LOAN: &str = "UPLOAD-TEST";

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for running the pipeline
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunBody {
    pub loan_number: Option<String>,
}

/// Request body for running the pipeline on supplied documents
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunWithDocumentsBody {
    pub loan_number: Option<String>,
    #[serde(default)]
    pub documents: Vec<UploadedDocumentBody>,
}

/// A document supplied in a request body
#[derive(Debug, Deserialize)]
pub struct UploadedDocumentBody {
    pub name: String,
    /// Base64-encoded payload
    pub content: String,
    #[serde(rename = "type")]
    pub doc_type: Option<String>,
    pub format: Option<String>,
    pub size: Option<u64>,
}

impl UploadedDocumentBody {
    fn into_document(self, index: usize) -> Document {
        let format = self.format.unwrap_or_else(|| {
            self.name
                .rsplit_once('.')
                .map(|(_, ext)| ext.to_lowercase())
                .unwrap_or_else(|| "pdf".to_string())
        });
        // Decoded size of a base64 payload, when the caller did not say
        let size = self
            .size
            .unwrap_or_else(|| (self.content.trim_end_matches('=').len() as u64 * 3) / 4);

        Document {
            guid: format!("upload-{}-{}", Utc::now().timestamp_millis(), index),
            name: self.name,
            doc_type: self.doc_type.unwrap_or_default(),
            folder: String::new(),
            date_modified: Utc::now().to_rfc3339(),
            size,
            format,
            content: self.content,
        }
    }
}

/// Documents listed for a loan
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentListResponse {
    pub loan_number: String,
    pub documents: Vec<DocumentRef>,
}

/// Error response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationErrorResponse {
    pub error: String,
    /// Job holding the run slot, on conflicts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

impl IntegrationErrorResponse {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            job_id: None,
            example: None,
        }
    }
}

/// Map a rejected start to its HTTP response.
pub fn orchestrator_error_response(
    error: OrchestratorError,
) -> (StatusCode, Json<IntegrationErrorResponse>) {
    match error {
        OrchestratorError::Validation(message) => (
            StatusCode::BAD_REQUEST,
            Json(IntegrationErrorResponse {
                example: Some(json!({ "loanNumber": "TEST-001" })),
                ..IntegrationErrorResponse::new(message)
            }),
        ),
        OrchestratorError::Conflict { job_id } => (
            StatusCode::CONFLICT,
            Json(IntegrationErrorResponse {
                job_id: Some(job_id),
                ..IntegrationErrorResponse::new("An integration job is already running")
            }),
        ),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Check the default credential against the document service
pub async fn test_auth(State(state): State<Arc<AppState>>) -> Json<AuthTestResult> {
    Json(state.orchestrator().test_auth().await)
}

/// Run the full pipeline for a loan and return the finished job
pub async fn run(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RunBody>,
) -> Result<Json<Job>, impl IntoResponse> {
    let loan_number = body.loan_number.unwrap_or_default();

    match state.orchestrator().run(&loan_number).await {
        Ok(job) => Ok(Json(job)),
        Err(e) => {
            warn!(loan_number = %loan_number, error = %e, "Integration run rejected");
            Err(orchestrator_error_response(e))
        }
    }
}

/// Run the pipeline on documents supplied in the request body
pub async fn run_with_documents(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RunWithDocumentsBody>,
) -> Result<Json<Job>, impl IntoResponse> {
    if body.documents.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(IntegrationErrorResponse::new(
                "No documents supplied. Send at least one {name, content} entry in \"documents\".",
            )),
        ));
    }

    let loan_number = body
        .loan_number
        .filter(|l| !l.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_UPLOAD_LOAN.to_string());
    let documents: Vec<Document> = body
        .documents
        .into_iter()
        .enumerate()
        .map(|(index, doc)| doc.into_document(index))
        .collect();

    info!(
        loan_number = %loan_number,
        count = documents.len(),
        "Received documents for processing"
    );

    state
        .orchestrator()
        .run_with_documents(&loan_number, documents)
        .await
        .map(Json)
        .map_err(orchestrator_error_response)
}

/// Current job if one is running, otherwise the most recent one
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<OrchestratorStatus> {
    Json(state.orchestrator().status().await)
}

/// Finished jobs, most recent first
pub async fn get_history(State(state): State<Arc<AppState>>) -> Json<Vec<Job>> {
    Json(state.orchestrator().history().await)
}

/// List a loan's documents straight from the document service
pub async fn list_documents(
    State(state): State<Arc<AppState>>,
    Path(loan_number): Path<String>,
) -> Result<Json<DocumentListResponse>, impl IntoResponse> {
    match state
        .orchestrator()
        .client()
        .list_documents(&loan_number)
        .await
    {
        Ok(documents) => Ok(Json(DocumentListResponse {
            loan_number,
            documents,
        })),
        Err(e) => {
            warn!(loan_number = %loan_number, error = %e, "Document listing failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(IntegrationErrorResponse::new(e.to_string())),
            ))
        }
    }
}
