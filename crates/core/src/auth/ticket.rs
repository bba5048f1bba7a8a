use async_trait::async_trait;

use super::{AuthError, AuthOutcome, CredentialProvider};

/// Lifetime the vendor grants a launch ticket, in seconds.
pub const TICKET_VALIDITY_SECS: u64 = 30 * 60;

/// Pre-issued launch ticket, passed through verbatim.
///
/// Never refreshes. The ticket's validity window is tracked by the session
/// that delivered it, not here.
pub struct TicketCredential {
    ticket: String,
}

impl TicketCredential {
    pub fn new(ticket: impl Into<String>) -> Self {
        Self {
            ticket: ticket.into(),
        }
    }

    fn check(&self) -> Result<(), AuthError> {
        if self.ticket.trim().is_empty() {
            return Err(AuthError::InvalidCredentials(
                "launch ticket is empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl CredentialProvider for TicketCredential {
    async fn authenticate(&self) -> Result<AuthOutcome, AuthError> {
        self.check()?;
        Ok(AuthOutcome::new(
            "GenericFrameworkTicket",
            Some(TICKET_VALIDITY_SECS),
        ))
    }

    async fn ensure_credential(&self) -> Result<String, AuthError> {
        self.check()?;
        Ok(self.ticket.clone())
    }

    fn method_name(&self) -> &'static str {
        "ticket"
    }
}
