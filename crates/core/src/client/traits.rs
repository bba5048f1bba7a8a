use async_trait::async_trait;

use crate::auth::AuthOutcome;

use super::types::{
    ClientError, ClientMode, DocumentRef, DownloadedDocument, UploadReceipt, UploadRequest,
};

/// Trait for document service clients.
///
/// Implemented by the live SOAP client and the simulated client; the
/// orchestrator only ever talks to this trait.
#[async_trait]
pub trait DocumentClient: Send + Sync {
    /// Human-readable client name for logs.
    fn name(&self) -> &str;

    fn mode(&self) -> ClientMode;

    /// Establish (or re-establish) a credential with the service.
    async fn authenticate(&self) -> Result<AuthOutcome, ClientError>;

    /// Return a usable credential, authenticating first if required.
    async fn ensure_credential(&self) -> Result<String, ClientError>;

    /// List documents attached to a loan. An empty list is not an error.
    async fn list_documents(&self, loan_number: &str) -> Result<Vec<DocumentRef>, ClientError>;

    /// Download a listed document's content.
    async fn download_document(
        &self,
        document: &DocumentRef,
    ) -> Result<DownloadedDocument, ClientError>;

    /// Upload processed content to a loan.
    async fn upload_document(&self, request: &UploadRequest) -> Result<UploadReceipt, ClientError>;

    /// Route subsequent calls through a pre-issued credential.
    ///
    /// Returns `false` when the client ignores overrides.
    fn install_credential_override(&self, credential: &str) -> bool;

    /// Revert to the default credential provider. Safe to call repeatedly.
    fn clear_credential_override(&self);
}
