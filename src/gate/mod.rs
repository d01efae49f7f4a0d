//! Request-time session gate.
//!
//! Every request is classified as public or protected by its path. Public
//! requests pass untouched. Protected requests must carry a provider session
//! that the [`IdentityProvider`] accepts; anything else is redirected to the
//! login page with the original destination in `returnUrl`.
//!
//! Provider cookies are read and written through a [`CookieBridge`] over a
//! per-request [`CookieStore`]; nothing about a request outlives it.

pub mod bridge;
pub mod config;
pub mod cookies;
pub mod middleware;
pub mod provider;
pub mod redirect;
pub mod routes;
pub mod session;
pub mod state;
pub mod supabase;
pub mod sweep;

#[cfg(test)]
pub(crate) mod stub;

pub use self::bridge::CookieBridge;
pub use self::config::{Environment, GateConfig};
pub use self::cookies::{CookieOptions, CookieStore, SameSite, SetCookie};
pub use self::middleware::guard;
pub use self::provider::{IdentityProvider, ProviderError, Session, User};
pub use self::redirect::login_redirect;
pub use self::routes::{Protection, RouteClass, RouteError, RouteTable};
pub use self::session::{SessionResolver, SessionTokens, read_tokens};
pub use self::state::Gate;
pub use self::supabase::SupabaseProvider;
pub use self::sweep::logout_sweep;
