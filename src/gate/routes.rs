//! Prefix based route classification.
//!
//! A prefix matches a path when the path equals it or continues it at a `/`
//! segment boundary. The most specific matching prefix decides; a prefix
//! listed in both tables is public. Paths no prefix covers are protected.

use std::fmt;
use tracing::warn;

pub const DEFAULT_PUBLIC_ROUTES: &[&str] = &[
    "/",
    "/landing",
    "/auth",
    "/api",
    "/_next/static",
    "/_next/image",
    "/favicon.ico",
];

pub const DEFAULT_PROTECTED_ROUTES: &[&str] = &[
    "/dashboard",
    "/invitation",
    "/profile",
    "/settings",
    "/attributes",
    "/excel-export",
    "/(protected)",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Public,
    Protected,
}

/// Whether protected routes are actually enforced.
///
/// `Disabled` turns every path public. It is never a default and is logged
/// at `WARN` whenever a table is built with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Protection {
    #[default]
    Enforced,
    Disabled,
}

impl Protection {
    /// # Errors
    /// Returns an error for anything other than `enforced` or `disabled`.
    pub fn parse(value: &str) -> Result<Self, RouteError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "enforced" => Ok(Self::Enforced),
            "disabled" => Ok(Self::Disabled),
            other => Err(RouteError::InvalidProtection(other.to_string())),
        }
    }
}

impl fmt::Display for Protection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enforced => f.write_str("enforced"),
            Self::Disabled => f.write_str("disabled"),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("route prefix must start with '/': {0:?}")]
    InvalidPrefix(String),

    #[error("invalid protection mode {0:?} (expected 'enforced' or 'disabled')")]
    InvalidProtection(String),
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    public: Vec<String>,
    protected: Vec<String>,
    protection: Protection,
}

impl RouteTable {
    /// Build a table from public and protected prefixes.
    ///
    /// # Errors
    /// Returns [`RouteError::InvalidPrefix`] if a prefix does not start with `/`.
    pub fn new<I, J, S, T>(public: I, protected: J) -> Result<Self, RouteError>
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        Ok(Self {
            public: normalize_all(public)?,
            protected: normalize_all(protected)?,
            protection: Protection::Enforced,
        })
    }

    #[must_use]
    pub fn with_protection(mut self, protection: Protection) -> Self {
        if protection == Protection::Disabled {
            warn!("route protection is DISABLED: every path is public and no session is checked");
        }
        self.protection = protection;
        self
    }

    #[must_use]
    pub fn protection(&self) -> Protection {
        self.protection
    }

    #[must_use]
    pub fn public(&self) -> &[String] {
        &self.public
    }

    #[must_use]
    pub fn protected(&self) -> &[String] {
        &self.protected
    }

    #[must_use]
    pub fn classify(&self, path: &str) -> RouteClass {
        if self.protection == Protection::Disabled {
            return RouteClass::Public;
        }

        let public = longest_match(&self.public, path);
        let protected = longest_match(&self.protected, path);

        match (public, protected) {
            (Some(p), Some(q)) if p >= q => RouteClass::Public,
            (Some(_), None) => RouteClass::Public,
            _ => RouteClass::Protected,
        }
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self {
            public: DEFAULT_PUBLIC_ROUTES.iter().map(ToString::to_string).collect(),
            protected: DEFAULT_PROTECTED_ROUTES
                .iter()
                .map(ToString::to_string)
                .collect(),
            protection: Protection::Enforced,
        }
    }
}

/// Split a comma separated prefix list, skipping blanks.
#[must_use]
pub fn split_prefixes(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn normalize_all<I, S>(prefixes: I) -> Result<Vec<String>, RouteError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    prefixes
        .into_iter()
        .map(|p| normalize(p.as_ref()))
        .collect()
}

fn normalize(prefix: &str) -> Result<String, RouteError> {
    let trimmed = prefix.trim();
    if !trimmed.starts_with('/') {
        return Err(RouteError::InvalidPrefix(prefix.to_string()));
    }
    let stripped = trimmed.trim_end_matches('/');
    if stripped.is_empty() {
        Ok("/".to_string())
    } else {
        Ok(stripped.to_string())
    }
}

fn matches(prefix: &str, path: &str) -> bool {
    if prefix == "/" {
        return path == "/";
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

// Length of the most specific matching prefix.
fn longest_match(prefixes: &[String], path: &str) -> Option<usize> {
    prefixes
        .iter()
        .filter(|prefix| matches(prefix, path))
        .map(String::len)
        .max()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landing_is_public() {
        let table = RouteTable::default();
        assert_eq!(table.classify("/landing"), RouteClass::Public);
        assert_eq!(table.classify("/"), RouteClass::Public);
        assert_eq!(table.classify("/auth/login"), RouteClass::Public);
        assert_eq!(table.classify("/api/auth/logout"), RouteClass::Public);
    }

    #[test]
    fn dashboard_is_protected() {
        let table = RouteTable::default();
        assert_eq!(table.classify("/dashboard"), RouteClass::Protected);
        assert_eq!(table.classify("/dashboard/orders"), RouteClass::Protected);
        assert_eq!(table.classify("/(protected)/reports"), RouteClass::Protected);
    }

    #[test]
    fn root_prefix_does_not_swallow_everything() {
        let table = RouteTable::default();
        assert_eq!(table.classify("/orders"), RouteClass::Protected);
    }

    #[test]
    fn prefix_respects_segment_boundary() {
        let table = RouteTable::default();
        assert_eq!(table.classify("/authority"), RouteClass::Protected);
        assert_eq!(table.classify("/landing-page"), RouteClass::Protected);
    }

    #[test]
    fn explicit_public_subpath_wins() {
        let table = RouteTable::new(["/dashboard/help"], ["/dashboard"]).unwrap();
        assert_eq!(table.classify("/dashboard/help/faq"), RouteClass::Public);
        assert_eq!(table.classify("/dashboard/orders"), RouteClass::Protected);
    }

    #[test]
    fn same_prefix_in_both_lists_is_public() {
        let table = RouteTable::new(["/settings"], ["/settings"]).unwrap();
        assert_eq!(table.classify("/settings/profile"), RouteClass::Public);
    }

    #[test]
    fn protected_subpath_under_public_prefix() {
        let table = RouteTable::new(["/auth"], ["/auth/admin"]).unwrap();
        assert_eq!(table.classify("/auth/admin/users"), RouteClass::Protected);
        assert_eq!(table.classify("/auth/login"), RouteClass::Public);
    }

    #[test]
    fn disabled_protection_makes_everything_public() {
        let table = RouteTable::default().with_protection(Protection::Disabled);
        assert_eq!(table.protection(), Protection::Disabled);
        assert_eq!(table.classify("/dashboard/orders"), RouteClass::Public);
    }

    #[test]
    fn classification_is_total() {
        let table = RouteTable::default();
        let paths = [
            "",
            "/",
            "//",
            "/dashboard",
            "/dashboard/",
            "/DASHBOARD",
            "/landing",
            "/unknown/deep/path",
            "relative",
            "/favicon.ico",
        ];
        for path in paths {
            let class = table.classify(path);
            assert!(matches!(class, RouteClass::Public | RouteClass::Protected));
        }
    }

    #[test]
    fn invalid_prefix_rejected() {
        let err = RouteTable::new(["landing"], ["/dashboard"]).unwrap_err();
        assert_eq!(err, RouteError::InvalidPrefix("landing".to_string()));
    }

    #[test]
    fn trailing_slash_normalized() {
        let table = RouteTable::new(["/docs/"], Vec::<String>::new()).unwrap();
        assert_eq!(table.public(), &["/docs".to_string()]);
        assert_eq!(table.classify("/docs/intro"), RouteClass::Public);
    }

    #[test]
    fn parse_protection() {
        assert_eq!(Protection::parse("Enforced"), Ok(Protection::Enforced));
        assert_eq!(Protection::parse(" disabled "), Ok(Protection::Disabled));
        assert!(Protection::parse("off").is_err());
    }

    #[test]
    fn split_prefixes_skips_blanks() {
        assert_eq!(
            split_prefixes("/a, /b,,  ,/c"),
            vec!["/a".to_string(), "/b".to_string(), "/c".to_string()]
        );
    }
}
