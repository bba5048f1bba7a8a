//! Testing utilities and a mock document client.
//!
//! Lets the orchestrator, handshake and HTTP layers be exercised without a
//! real document service.
//!
//! # Example
//!
//! ```rust,ignore
//! use docbridge_core::testing::{fixtures, MockDocumentClient};
//!
//! let client = MockDocumentClient::new();
//! client.set_documents(vec![fixtures::document_ref("d1", "Title.pdf", "Title")]).await;
//!
//! // Use in an Orchestrator...
//! ```

mod mock_document_client;

pub use mock_document_client::{
    MockDocumentClient, MockFailure, MockOperation, RecordedCall, MOCK_DEFAULT_CREDENTIAL,
};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::client::{Document, DocumentRef};

    /// Create listed document metadata with reasonable defaults.
    pub fn document_ref(guid: &str, name: &str, doc_type: &str) -> DocumentRef {
        DocumentRef {
            guid: guid.to_string(),
            name: name.to_string(),
            doc_type: doc_type.to_string(),
            folder: "Test".to_string(),
            date_modified: "2024-01-01T00:00:00Z".to_string(),
            size: 1024,
        }
    }

    /// Create a document with a small base64 payload.
    pub fn document(name: &str, doc_type: &str) -> Document {
        Document {
            guid: format!("upload-{}", name),
            name: name.to_string(),
            doc_type: doc_type.to_string(),
            folder: String::new(),
            date_modified: String::new(),
            size: 8,
            format: "pdf".to_string(),
            content: "JVBERi0xLjQK".to_string(),
        }
    }

    /// Launch request body as the lending platform sends it.
    pub fn launch_request_xml(loan_number: &str, ticket: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<LQBGenericFrameworkRequest>
  <LoanNumber>{loan_number}</LoanNumber>
  <UserLogin>jdoe</UserLogin>
  <LendingQBLoanCredential>
    <GENERIC_FRAMEWORK_USER_TICKET EncryptedTicket="{ticket}" />
  </LendingQBLoanCredential>
  <CredentialXML>
    <credentials username="vendor-user" accountID="ACC-42" />
  </CredentialXML>
</LQBGenericFrameworkRequest>"#
        )
    }
}
