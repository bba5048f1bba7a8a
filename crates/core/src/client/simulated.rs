//! In-process stand-in for the document service.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::AuthOutcome;

use super::traits::DocumentClient;
use super::types::{
    ClientError, ClientMode, DocumentRef, DownloadedDocument, UploadReceipt, UploadRequest,
};

/// Lifetime of a simulated ticket.
const SIMULATED_TICKET_MINUTES: i64 = 25;

const AUTH_LATENCY: Duration = Duration::from_millis(300);
const LIST_LATENCY: Duration = Duration::from_millis(500);
const DOWNLOAD_LATENCY: Duration = Duration::from_millis(400);
const UPLOAD_LATENCY: Duration = Duration::from_millis(600);

/// Base64 of a minimal one-page PDF, served for every download.
pub const SAMPLE_PDF_BASE64: &str = "JVBERi0xLjQKMSAwIG9iago8PCAvVHlwZSAvQ2F0YWxvZyAvUGFnZXMgMiAwIFIgPj4KZW5kb2JqCjIgMCBvYmoKPDwgL1R5cGUgL1BhZ2VzIC9LaWRzIFszIDAgUl0gL0NvdW50IDEgPj4KZW5kb2JqCjMgMCBvYmoKPDwgL1R5cGUgL1BhZ2UgL1BhcmVudCAyIDAgUiAvTWVkaWFCb3ggWzAgMCA2MTIgNzkyXSA+PgplbmRvYmoKdHJhaWxlcgo8PCAvUm9vdCAxIDAgUiA+PgolJUVPRgo=";

/// Sample loan file: (name, type, size in bytes).
const SAMPLE_DOCUMENTS: [(&str, &str, u64); 5] = [
    (
        "1003_Uniform_Residential_Loan_Application.pdf",
        "Loan Application",
        245_760,
    ),
    ("Property_Appraisal_Report.pdf", "Appraisal", 1_048_576),
    ("Borrower_Credit_Report.pdf", "Credit Report", 153_600),
    ("Title_Insurance_Commitment.pdf", "Title", 204_800),
    ("Employment_Verification_Letter.pdf", "VOE", 102_400),
];

struct SimulatedTicket {
    value: String,
    expires_at: DateTime<Utc>,
}

/// Simulated document service.
///
/// Serves a fixed five-document loan file for any loan number and records
/// uploads in memory. Credential overrides are ignored.
pub struct SimulatedClient {
    latency: bool,
    ticket: Mutex<Option<SimulatedTicket>>,
    uploads: RwLock<Vec<UploadReceipt>>,
}

impl SimulatedClient {
    /// Create a simulated client. With `latency` off all calls return immediately.
    pub fn new(latency: bool) -> Self {
        Self {
            latency,
            ticket: Mutex::new(None),
            uploads: RwLock::new(Vec::new()),
        }
    }

    /// Uploads received so far, in order.
    pub async fn uploaded_documents(&self) -> Vec<UploadReceipt> {
        self.uploads.read().await.clone()
    }

    async fn pause(&self, duration: Duration) {
        if self.latency {
            tokio::time::sleep(duration).await;
        }
    }

    fn issue_ticket() -> SimulatedTicket {
        let id = Uuid::new_v4().simple().to_string();
        SimulatedTicket {
            value: format!("SIM-TICKET-{}", &id[..8]),
            expires_at: Utc::now() + ChronoDuration::minutes(SIMULATED_TICKET_MINUTES),
        }
    }
}

impl Default for SimulatedClient {
    fn default() -> Self {
        Self::new(true)
    }
}

#[async_trait]
impl DocumentClient for SimulatedClient {
    fn name(&self) -> &str {
        "simulated"
    }

    fn mode(&self) -> ClientMode {
        ClientMode::Simulated
    }

    async fn authenticate(&self) -> Result<AuthOutcome, ClientError> {
        self.pause(AUTH_LATENCY).await;
        let ticket = Self::issue_ticket();
        info!(ticket = %ticket.value, "Simulated authentication succeeded");
        *self.ticket.lock().await = Some(ticket);
        Ok(AuthOutcome::new(
            "SimulatedTicket",
            Some((SIMULATED_TICKET_MINUTES * 60) as u64),
        ))
    }

    async fn ensure_credential(&self) -> Result<String, ClientError> {
        {
            let ticket = self.ticket.lock().await;
            if let Some(ticket) = ticket.as_ref() {
                if Utc::now() < ticket.expires_at {
                    return Ok(ticket.value.clone());
                }
            }
        }

        self.authenticate().await?;
        let ticket = self.ticket.lock().await;
        Ok(ticket
            .as_ref()
            .map(|t| t.value.clone())
            .unwrap_or_default())
    }

    async fn list_documents(&self, loan_number: &str) -> Result<Vec<DocumentRef>, ClientError> {
        self.ensure_credential().await?;
        self.pause(LIST_LATENCY).await;

        let modified = Utc::now().to_rfc3339();
        let documents: Vec<DocumentRef> = SAMPLE_DOCUMENTS
            .iter()
            .map(|(name, doc_type, size)| DocumentRef {
                guid: Uuid::new_v4().to_string(),
                name: name.to_string(),
                doc_type: doc_type.to_string(),
                folder: "Simulated".to_string(),
                date_modified: modified.clone(),
                size: *size,
            })
            .collect();

        info!(loan_number, count = documents.len(), "Simulated document list");
        Ok(documents)
    }

    async fn download_document(
        &self,
        document: &DocumentRef,
    ) -> Result<DownloadedDocument, ClientError> {
        self.ensure_credential().await?;
        self.pause(DOWNLOAD_LATENCY).await;
        debug!(name = %document.name, "Simulated download");

        Ok(DownloadedDocument {
            guid: document.guid.clone(),
            content: SAMPLE_PDF_BASE64.to_string(),
            format: "pdf".to_string(),
        })
    }

    async fn upload_document(&self, request: &UploadRequest) -> Result<UploadReceipt, ClientError> {
        self.ensure_credential().await?;
        self.pause(UPLOAD_LATENCY).await;

        let receipt = UploadReceipt {
            success: true,
            loan_number: request.loan_number.clone(),
            document_type: request.document_type.clone(),
            result: "uploaded".to_string(),
            id: Some(Uuid::new_v4().to_string()),
            uploaded_at: Some(Utc::now()),
        };
        info!(
            loan_number = %request.loan_number,
            document_type = %request.document_type,
            "Simulated upload"
        );
        self.uploads.write().await.push(receipt.clone());
        Ok(receipt)
    }

    fn install_credential_override(&self, _credential: &str) -> bool {
        debug!("Simulated client ignores credential overrides");
        false
    }

    fn clear_credential_override(&self) {}
}
