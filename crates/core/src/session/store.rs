use std::collections::HashMap;
use std::sync::{RwLock, RwLockWriteGuard};
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use tracing::debug;
use uuid::Uuid;

use super::types::{CreateSessionRequest, Session, SessionError};

/// Trait for launch session storage.
///
/// Sessions are short-lived and only meaningful while the process runs.
pub trait SessionStore: Send + Sync {
    /// Create a session with a fresh id.
    fn create(&self, request: CreateSessionRequest) -> Result<Session, SessionError>;

    /// Fetch a live session. An expired session is removed and reported as
    /// [`SessionError::Expired`].
    fn get(&self, id: &str) -> Result<Session, SessionError>;

    /// Remove all expired sessions, returning how many were removed.
    fn sweep(&self) -> Result<usize, SessionError>;

    /// Number of stored sessions, expired or not.
    fn len(&self) -> Result<usize, SessionError>;

    fn is_empty(&self) -> Result<bool, SessionError> {
        Ok(self.len()? == 0)
    }
}

/// In-memory session store.
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    ttl: ChronoDuration,
}

impl InMemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl: ChronoDuration::from_std(ttl).unwrap_or_else(|_| ChronoDuration::days(365)),
        }
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, Session>>, SessionError> {
        self.sessions
            .write()
            .map_err(|e| SessionError::Storage(format!("Lock poisoned: {}", e)))
    }
}

impl SessionStore for InMemorySessionStore {
    fn create(&self, request: CreateSessionRequest) -> Result<Session, SessionError> {
        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4().to_string(),
            loan_number: request.loan_number,
            user_login: request.user_login,
            encrypted_ticket: request.encrypted_ticket,
            vendor_username: request.vendor_username,
            vendor_account_id: request.vendor_account_id,
            created_at: now,
            expires_at: now + self.ttl,
        };

        self.write()?.insert(session.id.clone(), session.clone());
        debug!(session_id = %session.id, loan_number = %session.loan_number, "Session created");
        Ok(session)
    }

    fn get(&self, id: &str) -> Result<Session, SessionError> {
        let mut sessions = self.write()?;
        let session = sessions
            .get(id)
            .cloned()
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;

        if session.is_expired_at(Utc::now()) {
            sessions.remove(id);
            return Err(SessionError::Expired(id.to_string()));
        }
        Ok(session)
    }

    fn sweep(&self) -> Result<usize, SessionError> {
        let now = Utc::now();
        let mut sessions = self.write()?;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired_at(now));
        Ok(before - sessions.len())
    }

    fn len(&self) -> Result<usize, SessionError> {
        self.sessions
            .read()
            .map(|sessions| sessions.len())
            .map_err(|e| SessionError::Storage(format!("Lock poisoned: {}", e)))
    }
}
