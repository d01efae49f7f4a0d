use std::sync::Arc;

use super::config::GateConfig;
use super::provider::IdentityProvider;
use super::session::SessionResolver;

/// Shared, read-only state for the guard middleware and auth handlers.
pub struct Gate<P> {
    provider: Arc<P>,
    config: Arc<GateConfig>,
}

// Manual Clone: avoid derive adding a `P: Clone` bound.
impl<P> Clone for Gate<P> {
    fn clone(&self) -> Self {
        Self {
            provider: self.provider.clone(),
            config: self.config.clone(),
        }
    }
}

impl<P: IdentityProvider> Gate<P> {
    pub fn new(provider: P, config: GateConfig) -> Self {
        Self {
            provider: Arc::new(provider),
            config: Arc::new(config),
        }
    }

    #[must_use]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    #[must_use]
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Resolver bounded by the configured provider timeout.
    #[must_use]
    pub fn resolver(&self) -> SessionResolver<P> {
        SessionResolver::new(self.provider.clone(), self.config.provider_timeout())
    }
}
