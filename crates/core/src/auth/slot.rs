use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use tracing::info;

use super::{AuthError, AuthOutcome, CredentialProvider};

/// Default credential provider with a transient, single-run override.
///
/// While an override is installed every call is routed to it; clearing it
/// restores the default provider.
pub struct CredentialSlot {
    default: Arc<dyn CredentialProvider>,
    override_provider: RwLock<Option<Arc<dyn CredentialProvider>>>,
}

impl CredentialSlot {
    pub fn new(default: Arc<dyn CredentialProvider>) -> Self {
        Self {
            default,
            override_provider: RwLock::new(None),
        }
    }

    pub fn install_override(&self, provider: Arc<dyn CredentialProvider>) {
        info!(
            method = provider.method_name(),
            "Installed credential override"
        );
        *self
            .override_provider
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(provider);
    }

    pub fn clear_override(&self) {
        let previous = self
            .override_provider
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if previous.is_some() {
            info!(
                method = self.default.method_name(),
                "Cleared credential override, reverting to default"
            );
        }
    }

    pub fn has_override(&self) -> bool {
        self.override_provider
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn active(&self) -> Arc<dyn CredentialProvider> {
        self.override_provider
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .unwrap_or_else(|| Arc::clone(&self.default))
    }
}

#[async_trait]
impl CredentialProvider for CredentialSlot {
    async fn authenticate(&self) -> Result<AuthOutcome, AuthError> {
        self.active().authenticate().await
    }

    async fn ensure_credential(&self) -> Result<String, AuthError> {
        self.active().ensure_credential().await
    }

    fn method_name(&self) -> &'static str {
        self.active().method_name()
    }
}
