mod edocs;
pub mod soap;
mod simulated;
mod traits;
mod types;

pub use edocs::*;
pub use simulated::*;
pub use traits::*;
pub use types::*;

use std::sync::Arc;

use crate::config::{SourceConfig, SourceMode};

/// Factory function to create a document client from config.
pub fn create_document_client(
    config: &SourceConfig,
) -> Result<Arc<dyn DocumentClient>, ClientError> {
    match config.mode {
        SourceMode::Simulated => Ok(Arc::new(SimulatedClient::new(config.simulated_latency))),
        SourceMode::Live => Ok(Arc::new(EDocsClient::new(config)?)),
    }
}
