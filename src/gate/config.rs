use super::routes::RouteTable;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_LOGIN_PATH: &str = "/auth/login";
pub const DEFAULT_PROVIDER_TIMEOUT_SECONDS: u64 = 5;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid environment {0:?} (expected 'production' or 'development')")]
    InvalidEnvironment(String),
}

/// Deployment environment. Cookies carry `Secure` only in production.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Production,
    Development,
}

impl Environment {
    #[must_use]
    pub fn is_production(self) -> bool {
        self == Self::Production
    }

    /// # Errors
    /// Returns [`ConfigError::InvalidEnvironment`] for unknown names.
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "development" | "dev" => Ok(Self::Development),
            other => Err(ConfigError::InvalidEnvironment(other.to_string())),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Production => f.write_str("production"),
            Self::Development => f.write_str("development"),
        }
    }
}

/// Gate settings shared by the middleware and the auth handlers.
#[derive(Debug, Clone)]
pub struct GateConfig {
    routes: RouteTable,
    login_path: String,
    provider_timeout: Duration,
    environment: Environment,
}

impl GateConfig {
    #[must_use]
    pub fn new(routes: RouteTable) -> Self {
        Self {
            routes,
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            provider_timeout: Duration::from_secs(DEFAULT_PROVIDER_TIMEOUT_SECONDS),
            environment: Environment::Production,
        }
    }

    #[must_use]
    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    #[must_use]
    pub fn with_provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    #[must_use]
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    #[must_use]
    pub fn provider_timeout(&self) -> Duration {
        self.provider_timeout
    }

    #[must_use]
    pub fn environment(&self) -> Environment {
        self.environment
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self::new(RouteTable::default())
    }
}
