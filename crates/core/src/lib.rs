pub mod auth;
pub mod client;
pub mod config;
pub mod handshake;
pub mod metrics;
pub mod orchestrator;
pub mod processor;
pub mod session;
pub mod testing;
pub mod xml;

pub use auth::{
    create_credential_provider, AuthError, AuthOutcome, CredentialProvider, CredentialSlot,
    OAuthCredential, TicketCredential,
};
pub use client::{
    create_document_client, ClientError, ClientMode, Document, DocumentClient, DocumentRef,
    DownloadedDocument, EDocsClient, SimulatedClient, UploadReceipt, UploadRequest,
};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
    ServerConfig, SourceConfig, SourceMode,
};
pub use handshake::{
    HandshakeError, HandshakeService, LaunchOutcome, LaunchReply, LaunchRequest, SessionStart,
};
pub use orchestrator::{
    AuthTestResult, Job, JobMode, JobStatus, Orchestrator, OrchestratorConfig, OrchestratorError,
    OrchestratorStatus, StepName, StepStatus,
};
pub use processor::{DocumentProcessor, ProcessedDocument, ProcessorConfig, ProcessorError};
pub use session::{
    spawn_sweeper, InMemorySessionStore, Session, SessionConfig, SessionError, SessionStore,
    SessionSummary, SweeperHandle,
};
