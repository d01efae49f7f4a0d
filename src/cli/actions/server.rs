use crate::cli::telemetry;
use crate::gate::{
    Environment, Gate, GateConfig, Protection, RouteClass, RouteTable, SupabaseProvider,
    routes::{DEFAULT_PROTECTED_ROUTES, DEFAULT_PUBLIC_ROUTES, split_prefixes},
};
use crate::{APP_USER_AGENT, api};
use anyhow::{Context, Result, ensure};
use secrecy::SecretString;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub supabase_url: String,
    pub supabase_anon_key: SecretString,
    pub session_cookie: Option<String>,
    pub provider_timeout: u64,
    pub login_path: String,
    pub public_routes: Option<String>,
    pub protected_routes: Option<String>,
    pub protection: Protection,
    pub environment: Environment,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the configuration is invalid or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    let gate = build_gate(&args)?;

    let result = api::new(args.port, gate).await;

    telemetry::shutdown_tracer();

    result
}

/// Validate the arguments and assemble the provider and gate configuration.
/// # Errors
/// Returns an error on an invalid URL, route prefix or login path.
pub fn build_gate(args: &Args) -> Result<Gate<SupabaseProvider>> {
    let base_url = Url::parse(&args.supabase_url).context("invalid --supabase-url")?;
    ensure!(
        matches!(base_url.scheme(), "http" | "https"),
        "--supabase-url must be an http(s) URL"
    );
    ensure!(
        args.login_path.starts_with('/'),
        "--login-path must start with '/'"
    );

    let mut provider = SupabaseProvider::new(base_url, args.supabase_anon_key.clone())
        .context("failed to build identity provider client")?;
    if let Some(name) = &args.session_cookie {
        provider = provider.with_session_cookie(name);
    }

    let public = route_list(args.public_routes.as_deref(), DEFAULT_PUBLIC_ROUTES);
    let protected = route_list(args.protected_routes.as_deref(), DEFAULT_PROTECTED_ROUTES);
    let routes = RouteTable::new(public, protected)
        .context("invalid route prefix")?
        .with_protection(args.protection);

    ensure!(
        routes.classify(&args.login_path) == RouteClass::Public,
        "--login-path {} is not a public route; unauthenticated requests would redirect forever",
        args.login_path
    );

    if args.protection == Protection::Disabled {
        warn!("Starting with route protection DISABLED; protected pages are reachable without a session");
    }

    let config = GateConfig::new(routes)
        .with_login_path(args.login_path.clone())
        .with_provider_timeout(Duration::from_secs(args.provider_timeout))
        .with_environment(args.environment);

    Ok(Gate::new(provider, config))
}

fn route_list(configured: Option<&str>, defaults: &[&str]) -> Vec<String> {
    configured.map_or_else(
        || defaults.iter().map(ToString::to_string).collect(),
        split_prefixes,
    )
}

fn log_startup_args(args: &Args) {
    let entries = [
        ("listen", format!("tcp:{}", args.port)),
        ("supabase_url", args.supabase_url.clone()),
        ("supabase_anon_key", "REDACTED".to_string()),
        (
            "session_cookie",
            args.session_cookie
                .clone()
                .unwrap_or_else(|| "derived".to_string()),
        ),
        ("provider_timeout", format!("{}s", args.provider_timeout)),
        ("login_path", args.login_path.clone()),
        (
            "public_routes",
            args.public_routes
                .clone()
                .unwrap_or_else(|| "default".to_string()),
        ),
        (
            "protected_routes",
            args.protected_routes
                .clone()
                .unwrap_or_else(|| "default".to_string()),
        ),
        ("protection", args.protection.to_string()),
        ("environment", args.environment.to_string()),
        ("user_agent", APP_USER_AGENT.to_string()),
    ];
    log_entries("Startup configuration", &entries);
}

fn log_entries(title: &str, entries: &[(&str, String)]) {
    let max_key_len = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut message = format!("{}\n\n{title}:", pigate_banner());
    for (key, value) in entries {
        let padding = " ".repeat(max_key_len.saturating_sub(key.len()));
        let _ =
            std::fmt::Write::write_fmt(&mut message, format_args!("\n  {key}:{padding} {value}"));
    }
    info!("{message}");
}

fn pigate_banner() -> String {
    PIGATE_BANNER.replace(
        "{VERSION}",
        &format!(
            " - {} - {}",
            env!("CARGO_PKG_VERSION"),
            short_commit(crate::GIT_COMMIT_HASH)
        ),
    )
}

fn short_commit(hash: &str) -> String {
    let trimmed = hash.trim();
    if trimmed.len() > 7 {
        trimmed[..7].to_string()
    } else {
        trimmed.to_string()
    }
}

const PIGATE_BANNER: &str = r"
  +-----+
  |  |  |
  |  |  |   P I G A T E {VERSION}
  |  |  |
  +-----+";
