use crate::{api, cli::telemetry, relay::SessionRelay};
use anyhow::{Context, Result};
use std::{sync::Arc, time::Duration};
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub api_url: String,
    pub frontend_origin: String,
    pub upstream_timeout: Option<Duration>,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the upstream settings are invalid or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    let relay = SessionRelay::new(&args.api_url, &args.frontend_origin, args.upstream_timeout)
        .context("Could not configure the upstream relay")?;

    let result = api::new(args.port, Arc::new(relay)).await;

    telemetry::shutdown_tracer();

    result
}

fn log_startup_args(args: &Args) {
    let entries = [
        ("listen", format!("tcp:{}", args.port)),
        ("api_url", args.api_url.clone()),
        ("frontend_origin", args.frontend_origin.clone()),
        (
            "upstream_timeout",
            args.upstream_timeout
                .map_or_else(|| "none".to_string(), |timeout| format!("{}s", timeout.as_secs())),
        ),
    ];
    info!("{}", startup_message(&entries));
}

fn startup_message(entries: &[(&str, String)]) -> String {
    let max_key_len = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut message = format!(
        "{} {} - {}\n\nStartup configuration:",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        short_commit(crate::GIT_COMMIT_HASH)
    );
    for (key, value) in entries {
        let padding = " ".repeat(max_key_len.saturating_sub(key.len()));
        let _ =
            std::fmt::Write::write_fmt(&mut message, format_args!("\n  {key}:{padding} {value}"));
    }
    message
}

fn short_commit(hash: &str) -> &str {
    let trimmed = hash.trim();
    trimmed.get(..7).unwrap_or(trimmed)
}
