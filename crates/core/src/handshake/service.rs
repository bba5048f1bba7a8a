use std::sync::Arc;

use tracing::{error, info, warn};

use crate::metrics::{HANDSHAKE_REJECTIONS, SESSIONS_CREATED};
use crate::orchestrator::Orchestrator;
use crate::session::{CreateSessionRequest, SessionStore, SessionSummary};

use super::protocol::{
    parse_launch_request, render_error_response, render_ticket_credential,
    render_window_response, FALLBACK_ERROR_RESPONSE,
};
use super::types::{HandshakeError, LaunchOutcome, LaunchReply, SessionStart};

/// Characters of a ticket shown in logs.
const TICKET_LOG_PREVIEW: usize = 30;

/// Drives the launch handshake: launch request, pop-up session lookup and
/// session start.
pub struct HandshakeService {
    sessions: Arc<dyn SessionStore>,
    orchestrator: Arc<Orchestrator>,
    public_base: String,
}

impl HandshakeService {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        orchestrator: Arc<Orchestrator>,
        public_base: impl Into<String>,
    ) -> Self {
        Self {
            sessions,
            orchestrator,
            public_base: public_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Pop-up URL for a session.
    pub fn popup_url(&self, session_id: &str, loan_number: &str) -> String {
        format!(
            "{}/launch?sessionId={}&loanNumber={}",
            self.public_base,
            urlencoding::encode(session_id),
            urlencoding::encode(loan_number)
        )
    }

    /// Answer a launch request. Always produces a well-formed XML reply.
    pub fn handle_launch(&self, body: Option<&str>) -> LaunchReply {
        match self.accept_launch(body) {
            Ok(xml) => LaunchReply {
                outcome: LaunchOutcome::Accepted,
                xml,
            },
            Err(e) => error_reply(e),
        }
    }

    /// Answer a launch request given as raw bytes. A body that is not
    /// UTF-8 is rejected as malformed XML.
    pub fn handle_launch_bytes(&self, body: &[u8]) -> LaunchReply {
        match std::str::from_utf8(body) {
            Ok(text) => self.handle_launch(Some(text)),
            Err(e) => error_reply(HandshakeError::Malformed(e.to_string())),
        }
    }

    fn accept_launch(&self, body: Option<&str>) -> Result<String, HandshakeError> {
        let request = parse_launch_request(body)?;

        info!(
            loan_number = %request.loan_number,
            user_login = %request.user_login,
            vendor_user = %request.vendor_username,
            account_id = %request.vendor_account_id,
            ticket = %ticket_preview(&request.encrypted_ticket),
            "Launch request received"
        );

        let session = self.sessions.create(CreateSessionRequest {
            loan_number: request.loan_number,
            user_login: request.user_login,
            encrypted_ticket: request.encrypted_ticket,
            vendor_username: request.vendor_username,
            vendor_account_id: request.vendor_account_id,
        })?;
        SESSIONS_CREATED.inc();

        let url = self.popup_url(&session.id, &session.loan_number);
        info!(session_id = %session.id, url = %url, "Launch session created");
        Ok(render_window_response(&url)?)
    }

    /// Look up an unexpired session for the pop-up page.
    pub fn resolve_session(&self, session_id: &str) -> Result<SessionSummary, HandshakeError> {
        Ok(self.sessions.get(session_id)?.summary())
    }

    /// Start a job for a session, authenticated with its launch ticket when
    /// one was supplied.
    pub async fn start_session(&self, session_id: &str) -> Result<SessionStart, HandshakeError> {
        let session = self.sessions.get(session_id)?;

        let credential = session
            .has_ticket()
            .then(|| render_ticket_credential(&session.encrypted_ticket));
        let mode = if credential.is_some() { "ticket" } else { "oauth" };

        let job_id = self
            .orchestrator
            .start_with_credential(&session.loan_number, credential)
            .await?;

        info!(
            session_id,
            loan_number = %session.loan_number,
            job_id = %job_id,
            mode,
            "Launch session started a job"
        );

        Ok(SessionStart {
            loan_number: session.loan_number,
            job_id,
            status: "started",
            mode,
        })
    }
}

fn error_reply(e: HandshakeError) -> LaunchReply {
    HANDSHAKE_REJECTIONS.with_label_values(&[e.reason()]).inc();
    let (outcome, message) = if e.is_rejection() {
        warn!(error = %e, "Rejected launch request");
        (LaunchOutcome::Rejected, e.to_string())
    } else {
        error!(error = %e, "Launch request failed");
        (LaunchOutcome::Failed, format!("Server error: {}", e))
    };
    let xml =
        render_error_response(&message).unwrap_or_else(|_| FALLBACK_ERROR_RESPONSE.to_string());
    LaunchReply { outcome, xml }
}

fn ticket_preview(ticket: &str) -> String {
    if ticket.is_empty() {
        return "NONE".to_string();
    }
    let preview: String = ticket.chars().take(TICKET_LOG_PREVIEW).collect();
    if preview.len() < ticket.len() {
        format!("{}...", preview)
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_preview_truncates() {
        assert_eq!(ticket_preview(""), "NONE");
        assert_eq!(ticket_preview("short"), "short");
        let long = "x".repeat(40);
        assert_eq!(ticket_preview(&long), format!("{}...", "x".repeat(30)));
    }
}
