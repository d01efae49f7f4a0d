use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::future::Future;
use std::time::Duration;
use utoipa::ToSchema;
use uuid::Uuid;

/// Authenticated identity as reported by the identity provider.
///
/// Inserted into request extensions by the gate for downstream handlers.
/// Provider fields without a typed counterpart are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub aud: Option<String>,
    #[serde(flatten)]
    #[schema(ignore)]
    pub extra: Map<String, Value>,
}

/// Provider session as stored in the session cookie.
///
/// Written back verbatim on refresh, so unknown fields (`provider_token`,
/// `weak_password`, ...) round-trip through `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: User,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("identity provider unavailable: {0}")]
    Unavailable(#[from] reqwest::Error),

    #[error("identity provider did not answer within {0:?}")]
    Timeout(Duration),

    #[error("identity provider rejected {operation} ({status}): {detail}")]
    Rejected {
        operation: &'static str,
        status: u16,
        detail: String,
    },

    #[error("malformed identity provider response: {0}")]
    Malformed(String),
}

impl ProviderError {
    /// True when the provider refused the credential itself, as opposed to
    /// failing to answer.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Rejected { status: 401 | 403, .. })
    }
}

/// The single identity-provider capability the gate depends on.
pub trait IdentityProvider: Send + Sync + 'static {
    /// Name of the cookie holding the provider session.
    fn session_cookie_name(&self) -> &str;

    /// Validate an access token and return its user.
    fn get_user(
        &self,
        access_token: &str,
    ) -> impl Future<Output = Result<User, ProviderError>> + Send;

    /// Exchange a refresh token for a new session.
    fn refresh(
        &self,
        refresh_token: &str,
    ) -> impl Future<Output = Result<Session, ProviderError>> + Send;

    /// Revoke the session behind an access token.
    fn sign_out(&self, access_token: &str) -> impl Future<Output = Result<(), ProviderError>> + Send;
}
