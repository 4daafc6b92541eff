use crate::cli::{
    actions::{Action, server::Args},
    commands::{ARG_PORT, firebase::Backend},
};
use anyhow::Result;

/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);
    let backend = Backend::parse(matches)?;

    Ok(Action::Server(Args { port, backend }))
}
