//! # pigate (Session Gate)
//!
//! `pigate` stands in front of the PI order and inventory application and
//! decides, per request, whether the caller may reach a page.
//!
//! ## Route Classification
//!
//! Paths are split into **public** and **protected** by prefix, matched at
//! `/` segment boundaries with the longest prefix winning. Paths that no
//! prefix matches are protected.
//!
//! ## Sessions
//!
//! Sessions belong to the identity provider (Supabase). The gate only holds a
//! cached view of them in cookies and asks the provider to validate the
//! access token once per protected request. A refused token is refreshed once
//! when a refresh token is available. Any provider failure means "no session"
//! and the caller is sent to `/auth/login?returnUrl=...`.
//!
//! ## Logout
//!
//! `POST /api/auth/logout` revokes the session and expires every provider
//! cookie, including ones the gate has never seen by name.

pub mod api;
pub mod cli;
pub mod gate;

pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
