//! Session resolution from request cookies.
//!
//! The provider session cookie may arrive whole or split into `.0`, `.1`, …
//! chunks, its payload either raw JSON or base64 encoded JSON. The legacy
//! `sb-access-token` / `sb-refresh-token` pair is read as a fallback.

use super::bridge::{CookieBridge, MAX_CHUNKS};
use super::cookies::CookieOptions;
use super::provider::{IdentityProvider, ProviderError, Session, User};
use base64ct::{Base64, Base64Unpadded, Base64Url, Base64UrlUnpadded, Encoding};
use serde::Deserialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

const LEGACY_ACCESS_COOKIE: &str = "sb-access-token";
const LEGACY_REFRESH_COOKIE: &str = "sb-refresh-token";

/// Lifetime of a refreshed session cookie (400 days, the browser maximum).
pub const SESSION_COOKIE_MAX_AGE: i64 = 400 * 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionTokens {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Read the session tokens carried by the request, if any.
#[must_use]
pub fn read_tokens(bridge: &CookieBridge<'_>, session_cookie: &str) -> Option<SessionTokens> {
    if let Some(payload) = read_session_payload(bridge, session_cookie) {
        match decode_session_payload(&payload) {
            Some(tokens) => return Some(tokens),
            None => debug!(cookie = %session_cookie, "Session cookie payload is not a session"),
        }
    }

    let access_token = bridge.get(LEGACY_ACCESS_COOKIE).filter(|t| !t.is_empty())?;
    Some(SessionTokens {
        access_token,
        refresh_token: bridge.get(LEGACY_REFRESH_COOKIE).filter(|t| !t.is_empty()),
    })
}

fn read_session_payload(bridge: &CookieBridge<'_>, session_cookie: &str) -> Option<String> {
    if let Some(value) = bridge.get(session_cookie).filter(|v| !v.is_empty()) {
        return Some(value);
    }

    let mut combined = String::new();
    for index in 0..MAX_CHUNKS {
        match bridge.get(&format!("{session_cookie}.{index}")) {
            Some(chunk) => combined.push_str(&chunk),
            None => break,
        }
    }
    if combined.is_empty() {
        None
    } else {
        Some(combined)
    }
}

/// Decode a session payload: JSON object, base64/base64url JSON, or a JSON
/// array whose first two entries are the access and refresh tokens.
fn decode_session_payload(payload: &str) -> Option<SessionTokens> {
    if let Some(tokens) = parse_session_json(payload.as_bytes()) {
        return Some(tokens);
    }
    let trimmed = payload.trim();
    let decoded = Base64UrlUnpadded::decode_vec(trimmed)
        .or_else(|_| Base64Url::decode_vec(trimmed))
        .or_else(|_| Base64::decode_vec(trimmed))
        .or_else(|_| Base64Unpadded::decode_vec(trimmed))
        .ok()?;
    parse_session_json(&decoded)
}

fn parse_session_json(bytes: &[u8]) -> Option<SessionTokens> {
    if let Ok(tokens) = serde_json::from_slice::<SessionTokens>(bytes) {
        return Some(tokens);
    }
    let array: Vec<Option<String>> = serde_json::from_slice(bytes).ok()?;
    let mut entries = array.into_iter();
    let access_token = entries.next().flatten().filter(|t| !t.is_empty())?;
    Some(SessionTokens {
        access_token,
        refresh_token: entries.next().flatten(),
    })
}

/// Encode a session the way the provider SDK stores it (base64url JSON).
///
/// # Errors
/// Returns an error if the session cannot be serialized.
pub fn encode_session(session: &Session) -> Result<String, serde_json::Error> {
    let json = serde_json::to_vec(session)?;
    Ok(Base64UrlUnpadded::encode_string(&json))
}

/// Resolves the user behind a request's cookies.
pub struct SessionResolver<P> {
    provider: Arc<P>,
    timeout: Duration,
}

impl<P: IdentityProvider> SessionResolver<P> {
    pub fn new(provider: Arc<P>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    /// Validate the session carried by the request.
    ///
    /// Every provider failure degrades to `None`. When the access token is
    /// refused and a refresh token is present, the session is refreshed once
    /// and written back through the bridge.
    pub async fn resolve(&self, bridge: &mut CookieBridge<'_>) -> Option<User> {
        let session_cookie = self.provider.session_cookie_name().to_string();
        let Some(tokens) = read_tokens(bridge, &session_cookie) else {
            debug!("No session cookie present");
            return None;
        };

        let error = match self.bounded(self.provider.get_user(&tokens.access_token)).await {
            Ok(user) => return Some(user),
            Err(err) => err,
        };

        let refresh_token = match tokens.refresh_token {
            Some(token) if error.is_unauthorized() && !token.is_empty() => token,
            _ => {
                warn!("Session validation failed: {error}");
                return None;
            }
        };

        debug!("Access token refused, refreshing session");
        match self.bounded(self.provider.refresh(&refresh_token)).await {
            Ok(session) => {
                store_session(bridge, &session_cookie, &session);
                Some(session.user)
            }
            Err(err) => {
                warn!("Session refresh failed: {err}");
                None
            }
        }
    }

    /// Revoke the session carried by the request. Without an access token
    /// there is nothing to revoke and the provider is not called.
    ///
    /// # Errors
    /// Returns the provider error when revocation fails or times out.
    pub async fn sign_out(&self, bridge: &CookieBridge<'_>) -> Result<(), ProviderError> {
        let Some(tokens) = read_tokens(bridge, self.provider.session_cookie_name()) else {
            debug!("No session to revoke");
            return Ok(());
        };
        self.bounded(self.provider.sign_out(&tokens.access_token))
            .await
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, ProviderError>>,
    ) -> Result<T, ProviderError> {
        timeout(self.timeout, call)
            .await
            .unwrap_or_else(|_| Err(ProviderError::Timeout(self.timeout)))
    }
}

fn store_session(bridge: &mut CookieBridge<'_>, session_cookie: &str, session: &Session) {
    match encode_session(session) {
        Ok(encoded) => bridge.set_chunked(
            session_cookie,
            &encoded,
            &CookieOptions::default().with_max_age(SESSION_COOKIE_MAX_AGE),
        ),
        Err(err) => warn!("Failed to encode refreshed session: {err}"),
    }
}
