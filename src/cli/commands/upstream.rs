use crate::relay::{DEFAULT_API_URL, DEFAULT_FRONTEND_ORIGIN};
use clap::{Arg, Command};

pub const ARG_API_URL: &str = "api-url";
pub const ARG_FRONTEND_ORIGIN: &str = "frontend-origin";
pub const ARG_UPSTREAM_TIMEOUT: &str = "upstream-timeout";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_API_URL)
                .long(ARG_API_URL)
                .help("Base URL of the upstream API")
                .long_help(
                    "Base URL of the upstream API. The CSRF cookie, login, logout and user endpoints are resolved against it.",
                )
                .default_value(DEFAULT_API_URL)
                .env("NEXT_PUBLIC_API_URL"),
        )
        .arg(
            Arg::new(ARG_FRONTEND_ORIGIN)
                .long(ARG_FRONTEND_ORIGIN)
                .help("Origin of the browser front end")
                .long_help(
                    "Origin of the browser front end. Sent upstream when a request has no Origin header, and the only origin allowed by CORS.",
                )
                .default_value(DEFAULT_FRONTEND_ORIGIN)
                .env("KINTAI_FRONTEND_ORIGIN"),
        )
        .arg(
            Arg::new(ARG_UPSTREAM_TIMEOUT)
                .long(ARG_UPSTREAM_TIMEOUT)
                .help("Timeout in seconds for each upstream call (default: none)")
                .env("KINTAI_UPSTREAM_TIMEOUT")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
}
