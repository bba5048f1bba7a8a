use std::sync::Arc;
use std::time::Instant;

use docbridge_core::{
    Config, HandshakeService, Orchestrator, SanitizedConfig, SessionStore,
};

/// Shared application state
pub struct AppState {
    config: Config,
    orchestrator: Arc<Orchestrator>,
    sessions: Arc<dyn SessionStore>,
    handshake: HandshakeService,
    started_at: Instant,
}

impl AppState {
    pub fn new(
        config: Config,
        orchestrator: Arc<Orchestrator>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        let handshake = HandshakeService::new(
            Arc::clone(&sessions),
            Arc::clone(&orchestrator),
            config.server.public_base(),
        );
        Self {
            config,
            orchestrator,
            sessions,
            handshake,
            started_at: Instant::now(),
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn orchestrator(&self) -> &Arc<Orchestrator> {
        &self.orchestrator
    }

    pub fn sessions(&self) -> &dyn SessionStore {
        self.sessions.as_ref()
    }

    pub fn handshake(&self) -> &HandshakeService {
        &self.handshake
    }

    /// Seconds since the state was created.
    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
