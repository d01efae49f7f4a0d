//! Request-scoped cookie storage.
//!
//! A [`CookieStore`] is built from the `Cookie` header of one request and
//! collects the `Set-Cookie` writes destined for that request's response.
//! It is owned by the request and never shared.

use axum::http::{
    HeaderMap, HeaderValue,
    header::{COOKIE, InvalidHeaderValue, SET_COOKIE},
};
use std::fmt;

/// Known provider cookie names, deleted unconditionally on logout.
pub const PROVIDER_COOKIES: &[&str] = &[
    "sb-access-token",
    "sb-refresh-token",
    "supabase-auth-token",
    "sb-provider-token",
    "sb-auth-token",
    "supabase-auth-token-code-verifier",
];

/// Marker prepended to provider-issued cookie values.
pub const BASE64_PREFIX: &str = "base64-";

/// True for any name following the provider naming convention.
///
/// [`PROVIDER_COOKIES`] is only a fast path: a name outside that list is
/// still a provider cookie when it starts with `sb-` or mentions `supabase`.
#[must_use]
pub fn is_provider_cookie(name: &str) -> bool {
    PROVIDER_COOKIES.contains(&name) || name.starts_with("sb-") || name.contains("supabase")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => f.write_str("Strict"),
            Self::Lax => f.write_str("Lax"),
            Self::None => f.write_str("None"),
        }
    }
}

/// Options a caller may pass when writing a cookie.
///
/// `same_site`, `http_only` and `secure` are accepted so callers written
/// against looser cookie APIs keep compiling, but the bridge always
/// overrides them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieOptions {
    pub path: Option<String>,
    pub domain: Option<String>,
    pub max_age: Option<i64>,
    pub same_site: Option<SameSite>,
    pub http_only: Option<bool>,
    pub secure: Option<bool>,
}

impl CookieOptions {
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    #[must_use]
    pub fn with_max_age(mut self, seconds: i64) -> Self {
        self.max_age = Some(seconds);
        self
    }
}

/// One `Set-Cookie` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    pub name: String,
    pub value: String,
    pub path: String,
    pub domain: Option<String>,
    pub max_age: Option<i64>,
    pub same_site: SameSite,
    pub http_only: bool,
    pub secure: bool,
}

impl SetCookie {
    #[must_use]
    pub fn is_removal(&self) -> bool {
        self.max_age == Some(0)
    }

    fn same_slot(&self, other: &Self) -> bool {
        self.name == other.name && self.path == other.path && self.domain == other.domain
    }

    /// # Errors
    /// Returns an error if the rendered cookie is not a valid header value.
    pub fn to_header_value(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        HeaderValue::from_str(&self.to_string())
    }
}

impl fmt::Display for SetCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}; Path={}", self.name, self.value, self.path)?;
        if let Some(domain) = &self.domain {
            write!(f, "; Domain={domain}")?;
        }
        if let Some(max_age) = self.max_age {
            write!(f, "; Max-Age={max_age}")?;
        }
        write!(f, "; SameSite={}", self.same_site)?;
        if self.http_only {
            f.write_str("; HttpOnly")?;
        }
        if self.secure {
            f.write_str("; Secure")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct CookieStore {
    incoming: Vec<(String, String)>,
    outgoing: Vec<SetCookie>,
}

impl CookieStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse every `Cookie` header of a request.
    ///
    /// Headers are read lossily so one non-ASCII cookie does not hide its
    /// siblings.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut store = Self::new();
        for header in headers.get_all(COOKIE) {
            let value = String::from_utf8_lossy(header.as_bytes());
            for pair in value.split(';') {
                let trimmed = pair.trim();
                let mut parts = trimmed.splitn(2, '=');
                let Some(name) = parts.next().map(str::trim) else {
                    continue;
                };
                if name.is_empty() {
                    continue;
                }
                let value = parts.next().map(str::trim).unwrap_or_default();
                store.incoming.push((name.to_string(), value.to_string()));
            }
        }
        store
    }

    /// Seed a request cookie, mainly for tests and embedding.
    #[must_use]
    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.incoming.push((name.into(), value.into()));
        self
    }

    /// Raw stored value for `name`.
    ///
    /// Pending writes win over the request header; a pending removal hides
    /// the cookie.
    #[must_use]
    pub fn get_raw(&self, name: &str) -> Option<&str> {
        if let Some(written) = self.outgoing.iter().rev().find(|c| c.name == name) {
            if written.is_removal() {
                return None;
            }
            return Some(written.value.as_str());
        }
        self.incoming
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Names of all cookies sent with the request, in order, without duplicates.
    #[must_use]
    pub fn request_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::with_capacity(self.incoming.len());
        for (name, _) in &self.incoming {
            if !names.contains(&name.as_str()) {
                names.push(name);
            }
        }
        names
    }

    /// Queue a write, replacing an earlier write to the same name/path/domain.
    pub fn push(&mut self, cookie: SetCookie) {
        if let Some(existing) = self.outgoing.iter_mut().find(|c| c.same_slot(&cookie)) {
            *existing = cookie;
        } else {
            self.outgoing.push(cookie);
        }
    }

    #[must_use]
    pub fn pending(&self) -> &[SetCookie] {
        &self.outgoing
    }

    /// Append every pending write as a `Set-Cookie` header.
    ///
    /// Cookies that cannot be rendered as header values are skipped and logged.
    pub fn apply(&self, headers: &mut HeaderMap) {
        for cookie in &self.outgoing {
            match cookie.to_header_value() {
                Ok(value) => {
                    headers.append(SET_COOKIE, value);
                }
                Err(err) => {
                    tracing::error!(cookie = %cookie.name, "Failed to render Set-Cookie: {err}");
                }
            }
        }
    }
}
