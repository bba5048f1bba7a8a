//! Live client for the EDocs SOAP web service.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use tracing::{debug, info};

use crate::auth::{
    create_credential_provider, AuthOutcome, CredentialProvider, CredentialSlot, TicketCredential,
};
use crate::config::SourceConfig;
use crate::metrics::{UPSTREAM_REQUESTS, UPSTREAM_REQUEST_DURATION};
use crate::xml::XmlElement;

use super::soap::{
    build_envelope, extract_result, parse_document_list, SoapOperation, SERVICE_PATH,
};
use super::traits::DocumentClient;
use super::types::{
    ClientError, ClientMode, DocumentRef, DownloadedDocument, UploadReceipt, UploadRequest,
};

/// Document client backed by the vendor's EDocs service.
///
/// Every call carries the credential from a [`CredentialSlot`]: OAuth by
/// default, or a launch ticket while an override is installed.
pub struct EDocsClient {
    http: Client,
    endpoint: String,
    credentials: CredentialSlot,
    metadata_timeout: Duration,
    transfer_timeout: Duration,
}

impl EDocsClient {
    /// Create a client with an OAuth default credential.
    pub fn new(config: &SourceConfig) -> Result<Self, ClientError> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(config.metadata_timeout_secs))
            .build()
            .map_err(|e| {
                ClientError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        let default = Arc::new(create_credential_provider(config, http.clone()));
        Ok(Self::with_credentials(config, http, default))
    }

    /// Create a client with an explicit default credential provider.
    pub fn with_credentials(
        config: &SourceConfig,
        http: Client,
        default: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            http,
            endpoint: format!("{}{}", config.base_url.trim_end_matches('/'), SERVICE_PATH),
            credentials: CredentialSlot::new(default),
            metadata_timeout: Duration::from_secs(config.metadata_timeout_secs),
            transfer_timeout: Duration::from_secs(config.transfer_timeout_secs),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn call(
        &self,
        operation: SoapOperation,
        parameters: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<Option<XmlElement>, ClientError> {
        let envelope =
            build_envelope(operation, parameters).map_err(|e| ClientError::Parse(e.to_string()))?;

        debug!(operation = operation.name(), endpoint = %self.endpoint, "Calling EDocs service");
        let start = Instant::now();

        let result = self.send(operation, envelope, timeout).await;

        UPSTREAM_REQUEST_DURATION
            .with_label_values(&[operation.label()])
            .observe(start.elapsed().as_secs_f64());
        let outcome = match &result {
            Ok(_) => "success",
            Err(ClientError::Timeout { .. }) => "timeout",
            Err(_) => "error",
        };
        UPSTREAM_REQUESTS
            .with_label_values(&[operation.label(), outcome])
            .inc();

        let body = result?;
        extract_result(&body, operation)
    }

    async fn send(
        &self,
        operation: SoapOperation,
        envelope: String,
        timeout: Duration,
    ) -> Result<String, ClientError> {
        let response = self
            .http
            .post(&self.endpoint)
            .timeout(timeout)
            .header("Content-Type", "text/xml; charset=utf-8")
            .header("SOAPAction", operation.soap_action())
            .body(envelope)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClientError::Timeout {
                        operation: operation.name(),
                        secs: timeout.as_secs(),
                    }
                } else if e.is_connect() {
                    ClientError::ConnectionFailed(e.to_string())
                } else {
                    ClientError::Upstream(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::Timeout {
                    operation: operation.name(),
                    secs: timeout.as_secs(),
                }
            } else {
                ClientError::Upstream(format!("Failed to read response: {}", e))
            }
        })?;

        // Faults arrive as HTTP 500 with a SOAP body; let the envelope parser report them.
        if !status.is_success() && !body.contains("Fault") {
            return Err(ClientError::Upstream(format!(
                "{} returned HTTP {}: {}",
                operation.name(),
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        Ok(body)
    }
}

#[async_trait]
impl DocumentClient for EDocsClient {
    fn name(&self) -> &str {
        "edocs"
    }

    fn mode(&self) -> ClientMode {
        ClientMode::Live
    }

    async fn authenticate(&self) -> Result<AuthOutcome, ClientError> {
        Ok(self.credentials.authenticate().await?)
    }

    async fn ensure_credential(&self) -> Result<String, ClientError> {
        Ok(self.credentials.ensure_credential().await?)
    }

    async fn list_documents(&self, loan_number: &str) -> Result<Vec<DocumentRef>, ClientError> {
        let ticket = self.ensure_credential().await?;
        info!(loan_number, "Listing documents");

        let result = self
            .call(
                SoapOperation::ListEdocsByLoanNumber,
                &[("sTicket", ticket.as_str()), ("sLNm", loan_number)],
                self.metadata_timeout,
            )
            .await?;

        let documents = result.as_ref().map(parse_document_list).unwrap_or_default();
        info!(loan_number, count = documents.len(), "Listed documents");
        Ok(documents)
    }

    async fn download_document(
        &self,
        document: &DocumentRef,
    ) -> Result<DownloadedDocument, ClientError> {
        let ticket = self.ensure_credential().await?;
        debug!(guid = %document.guid, name = %document.name, "Downloading document");

        let result = self
            .call(
                SoapOperation::DownloadEdocsPdfById,
                &[("sTicket", ticket.as_str()), ("docId", document.guid.as_str())],
                self.transfer_timeout,
            )
            .await?;

        let content = result
            .as_ref()
            .map(|r| r.text().to_string())
            .unwrap_or_default();
        Ok(DownloadedDocument {
            guid: document.guid.clone(),
            content,
            format: "pdf".to_string(),
        })
    }

    async fn upload_document(&self, request: &UploadRequest) -> Result<UploadReceipt, ClientError> {
        let ticket = self.ensure_credential().await?;
        info!(
            loan_number = %request.loan_number,
            document_type = %request.document_type,
            "Uploading document"
        );

        let result = self
            .call(
                SoapOperation::UploadPdfDocument,
                &[
                    ("sTicket", ticket.as_str()),
                    ("sLNm", request.loan_number.as_str()),
                    ("documentType", request.document_type.as_str()),
                    ("notes", request.notes.as_str()),
                    ("sDataContent", request.content.as_str()),
                ],
                self.transfer_timeout,
            )
            .await?;

        let result = result
            .map(|r| r.text().to_string())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| "uploaded".to_string());
        Ok(UploadReceipt {
            success: true,
            loan_number: request.loan_number.clone(),
            document_type: request.document_type.clone(),
            result,
            id: None,
            uploaded_at: Some(Utc::now()),
        })
    }

    fn install_credential_override(&self, credential: &str) -> bool {
        self.credentials
            .install_override(Arc::new(TicketCredential::new(credential)));
        true
    }

    fn clear_credential_override(&self) {
        self.credentials.clear_override();
    }
}
