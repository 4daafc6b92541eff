use crate::{identity::firebase::DEFAULT_IDENTITY_URL, store::firestore::DEFAULT_FIRESTORE_URL};
use anyhow::{Context, Result, anyhow};
use clap::{Arg, ArgAction, ArgMatches, Command};
use secrecy::SecretString;
use url::Url;

pub const ARG_IN_MEMORY: &str = "in-memory";
pub const ARG_API_KEY: &str = "firebase-api-key";
pub const ARG_PROJECT_ID: &str = "firebase-project-id";
pub const ARG_IDENTITY_URL: &str = "identity-url";
pub const ARG_FIRESTORE_URL: &str = "firestore-url";
pub const ARG_FIRESTORE_TOKEN: &str = "firestore-token";

#[derive(Debug, Clone)]
pub struct Options {
    pub api_key: SecretString,
    pub project_id: String,
    pub identity_url: String,
    pub firestore_url: String,
    pub firestore_token: Option<SecretString>,
}

/// Where accounts and profiles live.
#[derive(Debug, Clone)]
pub enum Backend {
    /// In-process collaborators, nothing survives a restart.
    Memory,
    Firebase(Options),
}

impl Backend {
    /// Parse backend arguments from matches.
    ///
    /// # Errors
    /// Returns an error if a Firebase argument is missing or a URL is invalid.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        if matches.get_flag(ARG_IN_MEMORY) {
            return Ok(Self::Memory);
        }

        let read_required = |id: &str| -> Result<String> {
            matches
                .get_one::<String>(id)
                .cloned()
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| anyhow!("missing required argument: --{id}"))
        };

        let read_url = |id: &str| -> Result<String> {
            let value = read_required(id)?;
            Url::parse(&value).with_context(|| format!("invalid URL for --{id}: {value}"))?;
            Ok(value)
        };

        Ok(Self::Firebase(Options {
            api_key: SecretString::from(read_required(ARG_API_KEY)?),
            project_id: read_required(ARG_PROJECT_ID)?,
            identity_url: read_url(ARG_IDENTITY_URL)?,
            firestore_url: read_url(ARG_FIRESTORE_URL)?,
            firestore_token: matches
                .get_one::<String>(ARG_FIRESTORE_TOKEN)
                .filter(|v| !v.trim().is_empty())
                .map(|v| SecretString::from(v.as_str())),
        }))
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_IN_MEMORY)
                .long(ARG_IN_MEMORY)
                .help("Keep accounts and profiles in memory instead of Firebase")
                .env("WINDSAYL_IN_MEMORY")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(ARG_API_KEY)
                .long(ARG_API_KEY)
                .help("Firebase Web API key")
                .env("WINDSAYL_FIREBASE_API_KEY")
                .hide_env_values(true)
                .required_unless_present(ARG_IN_MEMORY),
        )
        .arg(
            Arg::new(ARG_PROJECT_ID)
                .long(ARG_PROJECT_ID)
                .help("Firebase project id")
                .env("WINDSAYL_FIREBASE_PROJECT_ID")
                .required_unless_present(ARG_IN_MEMORY),
        )
        .arg(
            Arg::new(ARG_IDENTITY_URL)
                .long(ARG_IDENTITY_URL)
                .help("Identity Toolkit base URL, example: http://localhost:9099/identitytoolkit.googleapis.com")
                .env("WINDSAYL_IDENTITY_URL")
                .default_value(DEFAULT_IDENTITY_URL),
        )
        .arg(
            Arg::new(ARG_FIRESTORE_URL)
                .long(ARG_FIRESTORE_URL)
                .help("Firestore base URL, example: http://localhost:8080")
                .env("WINDSAYL_FIRESTORE_URL")
                .default_value(DEFAULT_FIRESTORE_URL),
        )
        .arg(
            Arg::new(ARG_FIRESTORE_TOKEN)
                .long(ARG_FIRESTORE_TOKEN)
                .help("Bearer token for Firestore requests")
                .env("WINDSAYL_FIRESTORE_TOKEN")
                .hide_env_values(true),
        )
}
