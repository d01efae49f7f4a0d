//! In-memory identity provider for tests.

use super::provider::{IdentityProvider, ProviderError, Session, User};
use super::session::encode_session;
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

pub const USER_ID: &str = "8d2b6a1e-0f3c-4c61-9a0e-1b2c3d4e5f60";
pub const SESSION_COOKIE: &str = "sb-test-auth-token";

enum Mode {
    Answer,
    Fail,
    Hang,
}

pub struct StubProvider {
    access_token: String,
    refresh_token: Option<String>,
    mode: Mode,
    pub get_user_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub sign_out_calls: AtomicUsize,
}

impl StubProvider {
    /// Accepts exactly `access_token`.
    pub fn accepting(access_token: &str) -> Self {
        Self {
            access_token: access_token.to_string(),
            refresh_token: None,
            mode: Mode::Answer,
            get_user_calls: AtomicUsize::new(0),
            refresh_calls: AtomicUsize::new(0),
            sign_out_calls: AtomicUsize::new(0),
        }
    }

    /// Answers every call with a server error.
    pub fn failing() -> Self {
        Self {
            mode: Mode::Fail,
            ..Self::accepting("")
        }
    }

    /// Never answers.
    pub fn hanging() -> Self {
        Self {
            mode: Mode::Hang,
            ..Self::accepting("")
        }
    }

    /// Refreshes `refresh_token` into a session for the accepted access token.
    pub fn refreshing(mut self, refresh_token: &str) -> Self {
        self.refresh_token = Some(refresh_token.to_string());
        self
    }

    async fn answer(&self) -> Result<(), ProviderError> {
        match self.mode {
            Mode::Answer => Ok(()),
            Mode::Fail => Err(ProviderError::Rejected {
                operation: "stub",
                status: 503,
                detail: "unavailable".to_string(),
            }),
            Mode::Hang => std::future::pending().await,
        }
    }
}

pub fn user() -> User {
    User {
        id: Uuid::parse_str(USER_ID).unwrap_or_default(),
        email: Some("ops@pi.local".to_string()),
        role: Some("authenticated".to_string()),
        aud: Some("authenticated".to_string()),
        extra: serde_json::Map::new(),
    }
}

/// Session cookie value the way the provider SDK writes it.
pub fn session_cookie_value(access_token: &str, refresh_token: Option<&str>) -> String {
    let session = Session {
        access_token: access_token.to_string(),
        refresh_token: refresh_token.map(ToString::to_string),
        token_type: Some("bearer".to_string()),
        expires_in: Some(3600),
        expires_at: None,
        user: user(),
        extra: serde_json::Map::new(),
    };
    format!("base64-{}", encode_session(&session).unwrap_or_default())
}

fn unauthorized(operation: &'static str) -> ProviderError {
    ProviderError::Rejected {
        operation,
        status: 401,
        detail: "invalid token".to_string(),
    }
}

impl IdentityProvider for StubProvider {
    fn session_cookie_name(&self) -> &str {
        SESSION_COOKIE
    }

    async fn get_user(&self, access_token: &str) -> Result<User, ProviderError> {
        self.get_user_calls.fetch_add(1, Ordering::SeqCst);
        self.answer().await?;
        if access_token == self.access_token {
            Ok(user())
        } else {
            Err(unauthorized("get user"))
        }
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Session, ProviderError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        self.answer().await?;
        if self.refresh_token.as_deref() != Some(refresh_token) {
            return Err(unauthorized("refresh session"));
        }
        Ok(Session {
            access_token: self.access_token.clone(),
            refresh_token: Some(format!("{refresh_token}-next")),
            token_type: Some("bearer".to_string()),
            expires_in: Some(3600),
            expires_at: None,
            user: user(),
            extra: serde_json::Map::new(),
        })
    }

    async fn sign_out(&self, _access_token: &str) -> Result<(), ProviderError> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        self.answer().await
    }
}
