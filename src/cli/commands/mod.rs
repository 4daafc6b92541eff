pub mod firebase;
pub mod logging;

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

    let command = Command::new("windsayl")
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
                .default_value("8080")
                .env("WINDSAYL_PORT")
                .value_parser(clap::value_parser!(u16)),
        );

    let command = firebase::with_args(command);
    logging::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLEAR: [(&str, Option<&str>); 4] = [
        ("WINDSAYL_PORT", None),
        ("WINDSAYL_IN_MEMORY", None),
        ("WINDSAYL_FIREBASE_API_KEY", None),
        ("WINDSAYL_FIREBASE_PROJECT_ID", None),
    ];

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "windsayl");
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
    fn test_check_port_and_firebase() {
        temp_env::with_vars(CLEAR, || {
            let matches = new().get_matches_from(vec![
                "windsayl",
                "--port",
                "9090",
                "--firebase-api-key",
                "api-key",
                "--firebase-project-id",
                "demo",
            ]);

            assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(9090));
            assert_eq!(
                matches.get_one::<String>(firebase::ARG_PROJECT_ID).cloned(),
                Some("demo".to_string())
            );
            assert!(!matches.get_flag(firebase::ARG_IN_MEMORY));
        });
    }

    #[test]
    fn test_default_port() {
        temp_env::with_vars(CLEAR, || {
            let matches = new().get_matches_from(vec!["windsayl", "--in-memory"]);
            assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(8080));
        });
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("WINDSAYL_PORT", Some("443")),
                ("WINDSAYL_IN_MEMORY", Some("true")),
                ("WINDSAYL_FIREBASE_API_KEY", None),
                ("WINDSAYL_FIREBASE_PROJECT_ID", None),
                ("WINDSAYL_LOG_LEVEL", Some("info")),
            ],
            || {
                let matches = new().get_matches_from(vec!["windsayl"]);
                assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(443));
                assert!(matches.get_flag(firebase::ARG_IN_MEMORY));
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(2)
                );
            },
        );
    }

    #[test]
    fn test_check_log_level_env() {
        // loop cover all possible value_parse
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars(
                [
                    ("WINDSAYL_LOG_LEVEL", Some(level)),
                    ("WINDSAYL_IN_MEMORY", Some("true")),
                ],
                || {
                    let matches = new().get_matches_from(vec!["windsayl"]);
                    assert_eq!(
                        matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                        u8::try_from(index).ok()
                    );
                },
            );
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        for index in 0..5 {
            temp_env::with_vars([("WINDSAYL_LOG_LEVEL", None::<&str>)], || {
                let mut args = vec!["windsayl".to_string(), "--in-memory".to_string()];

                if index > 0 {
                    args.push(format!("-{}", "v".repeat(index)));
                }

                let matches = new().get_matches_from(args);

                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }

    #[test]
    fn test_invalid_port() {
        temp_env::with_vars(CLEAR, || {
            let result =
                new().try_get_matches_from(vec!["windsayl", "--in-memory", "--port", "70000"]);
            assert!(result.is_err());
        });
    }
}
