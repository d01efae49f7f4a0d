use crate::gate::config::DEFAULT_LOGIN_PATH;
use clap::{Arg, Command, builder::PossibleValuesParser};

pub const ARG_LOGIN_PATH: &str = "login-path";
pub const ARG_PUBLIC_ROUTES: &str = "public-routes";
pub const ARG_PROTECTED_ROUTES: &str = "protected-routes";
pub const ARG_PROTECTION: &str = "protection";
pub const ARG_ENVIRONMENT: &str = "environment";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_LOGIN_PATH)
                .long(ARG_LOGIN_PATH)
                .help("Login page unauthenticated requests are redirected to")
                .env("PIGATE_LOGIN_PATH")
                .default_value(DEFAULT_LOGIN_PATH),
        )
        .arg(
            Arg::new(ARG_PUBLIC_ROUTES)
                .long(ARG_PUBLIC_ROUTES)
                .help("Comma separated public path prefixes (replaces the built-in list)")
                .env("PIGATE_PUBLIC_ROUTES"),
        )
        .arg(
            Arg::new(ARG_PROTECTED_ROUTES)
                .long(ARG_PROTECTED_ROUTES)
                .help("Comma separated protected path prefixes (replaces the built-in list)")
                .env("PIGATE_PROTECTED_ROUTES"),
        )
        .arg(
            Arg::new(ARG_PROTECTION)
                .long(ARG_PROTECTION)
                .help("Route protection; `disabled` lets every request through without a session")
                .env("PIGATE_PROTECTION")
                .default_value("enforced")
                .value_parser(PossibleValuesParser::new(["enforced", "disabled"])),
        )
        .arg(
            Arg::new(ARG_ENVIRONMENT)
                .long(ARG_ENVIRONMENT)
                .help("Deployment environment; cookies are only marked Secure in production")
                .env("PIGATE_ENV")
                .default_value("production")
                .value_parser(PossibleValuesParser::new(["production", "development"])),
        )
}
