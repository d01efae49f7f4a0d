use clap::{Arg, Command};

pub const ARG_SUPABASE_URL: &str = "supabase-url";
pub const ARG_SUPABASE_ANON_KEY: &str = "supabase-anon-key";
pub const ARG_SESSION_COOKIE: &str = "session-cookie";
pub const ARG_PROVIDER_TIMEOUT: &str = "provider-timeout";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_SUPABASE_URL)
                .long(ARG_SUPABASE_URL)
                .help("Supabase project URL, example: https://<project-ref>.supabase.co")
                .env("PIGATE_SUPABASE_URL")
                .required(true),
        )
        .arg(
            Arg::new(ARG_SUPABASE_ANON_KEY)
                .long(ARG_SUPABASE_ANON_KEY)
                .help("Supabase anon (public) API key")
                .env("PIGATE_SUPABASE_ANON_KEY")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_SESSION_COOKIE)
                .long(ARG_SESSION_COOKIE)
                .help("Session cookie name (default: sb-<project-ref>-auth-token)")
                .env("PIGATE_SESSION_COOKIE"),
        )
        .arg(
            Arg::new(ARG_PROVIDER_TIMEOUT)
                .long(ARG_PROVIDER_TIMEOUT)
                .help("Seconds to wait for the identity provider before treating the session as missing")
                .env("PIGATE_PROVIDER_TIMEOUT")
                .default_value("5")
                .value_parser(clap::value_parser!(u64).range(1..=120)),
        )
}
