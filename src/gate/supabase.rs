//! Supabase GoTrue implementation of [`IdentityProvider`].

use super::provider::{IdentityProvider, ProviderError, Session, User};
use reqwest::{Client, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::{debug, instrument};
use url::Url;

const APIKEY_HEADER: &str = "apikey";

pub struct SupabaseProvider {
    base_url: Url,
    anon_key: SecretString,
    session_cookie: String,
    http: Client,
}

impl std::fmt::Debug for SupabaseProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseProvider")
            .field("base_url", &self.base_url.as_str())
            .field("session_cookie", &self.session_cookie)
            .finish_non_exhaustive()
    }
}

impl SupabaseProvider {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: Url, anon_key: SecretString) -> Result<Self, ProviderError> {
        let http = Client::builder().user_agent(crate::APP_USER_AGENT).build()?;
        let session_cookie = default_session_cookie(&base_url);
        Ok(Self {
            base_url,
            anon_key,
            session_cookie,
            http,
        })
    }

    #[must_use]
    pub fn with_session_cookie(mut self, name: impl Into<String>) -> Self {
        self.session_cookie = name.into();
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.as_str().trim_end_matches('/'))
    }

    async fn ensure_success(
        response: Response,
        operation: &'static str,
    ) -> Result<Response, ProviderError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let detail = response.text().await.unwrap_or_default();
        Err(ProviderError::Rejected {
            operation,
            status,
            detail,
        })
    }
}

/// `sb-<project ref>-auth-token`, the project ref being the first host label.
#[must_use]
pub fn default_session_cookie(base_url: &Url) -> String {
    let project_ref = base_url
        .host_str()
        .and_then(|host| host.split('.').next())
        .filter(|label| !label.is_empty())
        .unwrap_or("local");
    format!("sb-{project_ref}-auth-token")
}

impl IdentityProvider for SupabaseProvider {
    fn session_cookie_name(&self) -> &str {
        &self.session_cookie
    }

    #[instrument(skip_all)]
    async fn get_user(&self, access_token: &str) -> Result<User, ProviderError> {
        let response = self
            .http
            .get(self.endpoint("/auth/v1/user"))
            .header(APIKEY_HEADER, self.anon_key.expose_secret())
            .bearer_auth(access_token)
            .send()
            .await?;

        let response = Self::ensure_success(response, "get user").await?;
        response
            .json::<User>()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))
    }

    #[instrument(skip_all)]
    async fn refresh(&self, refresh_token: &str) -> Result<Session, ProviderError> {
        let response = self
            .http
            .post(self.endpoint("/auth/v1/token"))
            .query(&[("grant_type", "refresh_token")])
            .header(APIKEY_HEADER, self.anon_key.expose_secret())
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;

        let response = Self::ensure_success(response, "refresh session").await?;
        response
            .json::<Session>()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))
    }

    #[instrument(skip_all)]
    async fn sign_out(&self, access_token: &str) -> Result<(), ProviderError> {
        let response = self
            .http
            .post(self.endpoint("/auth/v1/logout"))
            .query(&[("scope", "global")])
            .header(APIKEY_HEADER, self.anon_key.expose_secret())
            .bearer_auth(access_token)
            .send()
            .await?;

        // The session is already gone on the provider side.
        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND
        ) {
            debug!("Sign out for an unknown session: {}", response.status());
            return Ok(());
        }

        Self::ensure_success(response, "sign out").await?;
        Ok(())
    }
}
