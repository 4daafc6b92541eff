use clap::{Arg, ArgAction, Command, builder::ValueParser};

pub const ARG_VERBOSITY: &str = "verbosity";

const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// `WINDSAYL_LOG_LEVEL` takes a level name or its index in [`LEVELS`].
fn parse_level(level: &str) -> Result<u8, String> {
    let level = level.trim().to_lowercase();

    LEVELS
        .iter()
        .position(|name| *name == level)
        .or_else(|| level.parse::<usize>().ok().filter(|n| *n < LEVELS.len()))
        .and_then(|index| u8::try_from(index).ok())
        .ok_or_else(|| format!("invalid log level, expected one of {}", LEVELS.join(", ")))
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help("Log more: -v warn, -vv info (request spans), -vvv debug, -vvvv trace")
            .env("WINDSAYL_LOG_LEVEL")
            .global(true)
            .action(ArgAction::Count)
            .value_parser(ValueParser::from(parse_level)),
    )
}
