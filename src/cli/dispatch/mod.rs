use crate::cli::{
    actions::{Action, server::Args},
    commands::{ARG_PORT, upstream},
};
use crate::relay::{DEFAULT_API_URL, DEFAULT_FRONTEND_ORIGIN};
use anyhow::Result;
use std::time::Duration;

/// # Errors
/// Returns an error if the arguments cannot be turned into an action.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(3000);
    let api_url = matches
        .get_one::<String>(upstream::ARG_API_URL)
        .cloned()
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());
    let frontend_origin = matches
        .get_one::<String>(upstream::ARG_FRONTEND_ORIGIN)
        .cloned()
        .unwrap_or_else(|| DEFAULT_FRONTEND_ORIGIN.to_string());
    let upstream_timeout = matches
        .get_one::<u64>(upstream::ARG_UPSTREAM_TIMEOUT)
        .copied()
        .map(Duration::from_secs);

    Ok(Action::Server(Args {
        port,
        api_url,
        frontend_origin,
        upstream_timeout,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;

    #[test]
    fn test_handler_builds_server_action() -> Result<()> {
        let matches = commands::new().try_get_matches_from(vec![
            "kintai",
            "--port",
            "4000",
            "--api-url",
            "https://api.kintai.dev",
            "--frontend-origin",
            "https://kintai.dev",
            "--upstream-timeout",
            "15",
        ])?;

        let Action::Server(args) = handler(&matches)?;
        assert_eq!(args.port, 4000);
        assert_eq!(args.api_url, "https://api.kintai.dev");
        assert_eq!(args.frontend_origin, "https://kintai.dev");
        assert_eq!(args.upstream_timeout, Some(Duration::from_secs(15)));
        Ok(())
    }
}
