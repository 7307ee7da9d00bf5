pub mod logging;
pub mod upstream;

use clap::{
    Arg, ColorChoice, Command,
    builder::styling::{AnsiColor, Effects, Styles},
};

pub const ARG_PORT: &str = "port";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("kintai")
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("3000")
                .env("KINTAI_PORT")
                .value_parser(clap::value_parser!(u16)),
        );

    let command = upstream::with_args(command);
    logging::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENV_VARS: [&str; 5] = [
        "KINTAI_PORT",
        "NEXT_PUBLIC_API_URL",
        "KINTAI_FRONTEND_ORIGIN",
        "KINTAI_UPSTREAM_TIMEOUT",
        "KINTAI_LOG_LEVEL",
    ];

    fn unset_env() -> Vec<(&'static str, Option<&'static str>)> {
        ENV_VARS.iter().map(|name| (*name, None)).collect()
    }

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "kintai");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some(env!("CARGO_PKG_DESCRIPTION").to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_defaults() {
        temp_env::with_vars(unset_env(), || {
            let matches = new().get_matches_from(vec!["kintai"]);
            assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(3000));
            assert_eq!(
                matches
                    .get_one::<String>(upstream::ARG_API_URL)
                    .map(String::as_str),
                Some("http://localhost")
            );
            assert_eq!(
                matches
                    .get_one::<String>(upstream::ARG_FRONTEND_ORIGIN)
                    .map(String::as_str),
                Some("http://localhost:3000")
            );
            assert_eq!(
                matches.get_one::<u64>(upstream::ARG_UPSTREAM_TIMEOUT),
                None
            );
            assert_eq!(
                matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                Some(0)
            );
        });
    }

    #[test]
    fn test_check_args() {
        temp_env::with_vars(unset_env(), || {
            let matches = new().get_matches_from(vec![
                "kintai",
                "--port",
                "8080",
                "--api-url",
                "https://api.kintai.dev",
                "--frontend-origin",
                "https://kintai.dev",
                "--upstream-timeout",
                "10",
                "-vv",
            ]);

            assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(8080));
            assert_eq!(
                matches.get_one::<String>(upstream::ARG_API_URL).cloned(),
                Some("https://api.kintai.dev".to_string())
            );
            assert_eq!(
                matches
                    .get_one::<String>(upstream::ARG_FRONTEND_ORIGIN)
                    .cloned(),
                Some("https://kintai.dev".to_string())
            );
            assert_eq!(
                matches
                    .get_one::<u64>(upstream::ARG_UPSTREAM_TIMEOUT)
                    .copied(),
                Some(10)
            );
            assert_eq!(
                matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                Some(2)
            );
        });
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("KINTAI_PORT", Some("443")),
                ("NEXT_PUBLIC_API_URL", Some("https://api.kintai.dev")),
                ("KINTAI_FRONTEND_ORIGIN", Some("https://kintai.dev")),
                ("KINTAI_UPSTREAM_TIMEOUT", Some("5")),
                ("KINTAI_LOG_LEVEL", Some("info")),
            ],
            || {
                let matches = new().get_matches_from(vec!["kintai"]);
                assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(443));
                assert_eq!(
                    matches.get_one::<String>(upstream::ARG_API_URL).cloned(),
                    Some("https://api.kintai.dev".to_string())
                );
                assert_eq!(
                    matches
                        .get_one::<String>(upstream::ARG_FRONTEND_ORIGIN)
                        .cloned(),
                    Some("https://kintai.dev".to_string())
                );
                assert_eq!(
                    matches
                        .get_one::<u64>(upstream::ARG_UPSTREAM_TIMEOUT)
                        .copied(),
                    Some(5)
                );
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(2)
                );
            },
        );
    }

    #[test]
    fn test_check_log_level_env() {
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars([("KINTAI_LOG_LEVEL", Some(level))], || {
                let matches = new().get_matches_from(vec!["kintai"]);
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }

    #[test]
    fn test_invalid_log_level() {
        temp_env::with_vars([("KINTAI_LOG_LEVEL", Some("loud"))], || {
            let result = new().try_get_matches_from(vec!["kintai"]);
            assert!(result.is_err());
        });
    }

    #[test]
    fn test_zero_timeout_rejected() {
        temp_env::with_vars(unset_env(), || {
            let result = new().try_get_matches_from(vec!["kintai", "--upstream-timeout", "0"]);
            assert!(result.is_err());
        });
    }
}
