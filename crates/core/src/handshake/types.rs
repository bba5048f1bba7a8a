use serde::Serialize;
use thiserror::Error;

use crate::orchestrator::OrchestratorError;
use crate::session::SessionError;
use crate::xml::XmlError;

/// Errors from the launch handshake.
#[derive(Debug, Error)]
pub enum HandshakeError {
    #[error("No XML body received")]
    MissingBody,

    #[error("Invalid XML: {0}")]
    Malformed(String),

    #[error("Invalid XML - expected LQBGenericFrameworkRequest")]
    InvalidRoot,

    #[error("Missing LoanNumber in request")]
    MissingLoanNumber,

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),

    #[error("Failed to render response: {0}")]
    Render(#[from] XmlError),
}

impl HandshakeError {
    /// True when the caller sent something we cannot accept.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            HandshakeError::MissingBody
                | HandshakeError::Malformed(_)
                | HandshakeError::InvalidRoot
                | HandshakeError::MissingLoanNumber
        )
    }

    /// Short label for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            HandshakeError::MissingBody => "missing_body",
            HandshakeError::Malformed(_) => "malformed",
            HandshakeError::InvalidRoot => "invalid_root",
            HandshakeError::MissingLoanNumber => "missing_loan_number",
            HandshakeError::Session(_) => "session",
            HandshakeError::Orchestrator(_) => "orchestrator",
            HandshakeError::Render(_) => "render",
        }
    }
}

/// Fields extracted from a launch request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchRequest {
    pub loan_number: String,
    pub user_login: String,
    /// Empty when the request carried no ticket
    pub encrypted_ticket: String,
    pub vendor_username: String,
    pub vendor_account_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// A session was created and a pop-up window returned.
    Accepted,
    /// The request was invalid.
    Rejected,
    /// Something went wrong on our side.
    Failed,
}

/// XML reply to a launch request, always well-formed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchReply {
    pub outcome: LaunchOutcome,
    pub xml: String,
}

/// Acknowledgement returned when a session's job is started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStart {
    pub loan_number: String,
    pub job_id: String,
    pub status: &'static str,
    /// "ticket" when the session carried a launch ticket, otherwise "oauth"
    pub mode: &'static str,
}
