use crate::cli::{
    actions::{Action, server::Args},
    commands::{ARG_PORT, gate, provider},
};
use crate::gate::{Environment, Protection};
use anyhow::{Context, Result};
use secrecy::SecretString;

/// # Errors
/// Returns an error if required arguments are missing or invalid.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);

    let supabase_url = matches
        .get_one::<String>(provider::ARG_SUPABASE_URL)
        .cloned()
        .context("missing required argument: --supabase-url")?;
    let supabase_anon_key = matches
        .get_one::<String>(provider::ARG_SUPABASE_ANON_KEY)
        .cloned()
        .map(SecretString::from)
        .context("missing required argument: --supabase-anon-key")?;
    let session_cookie = matches
        .get_one::<String>(provider::ARG_SESSION_COOKIE)
        .cloned();
    let provider_timeout = matches
        .get_one::<u64>(provider::ARG_PROVIDER_TIMEOUT)
        .copied()
        .unwrap_or(crate::gate::config::DEFAULT_PROVIDER_TIMEOUT_SECONDS);

    let login_path = matches
        .get_one::<String>(gate::ARG_LOGIN_PATH)
        .cloned()
        .unwrap_or_else(|| crate::gate::config::DEFAULT_LOGIN_PATH.to_string());
    let public_routes = matches.get_one::<String>(gate::ARG_PUBLIC_ROUTES).cloned();
    let protected_routes = matches
        .get_one::<String>(gate::ARG_PROTECTED_ROUTES)
        .cloned();

    let protection = matches
        .get_one::<String>(gate::ARG_PROTECTION)
        .map_or(Ok(Protection::Enforced), |value| Protection::parse(value))
        .context("invalid --protection")?;
    let environment = matches
        .get_one::<String>(gate::ARG_ENVIRONMENT)
        .map_or(Ok(Environment::Production), |value| Environment::parse(value))
        .context("invalid --environment")?;

    Ok(Action::Server(Args {
        port,
        supabase_url,
        supabase_anon_key,
        session_cookie,
        provider_timeout,
        login_path,
        public_routes,
        protected_routes,
        protection,
        environment,
    }))
}
