use crate::{
    api,
    cli::commands::firebase::{Backend, Options},
    identity::{FirebaseAuth, IdentityProvider, MemoryIdentity},
    store::{DocumentStore, Firestore, MemoryStore},
    users::Users,
};
use anyhow::{Context, Result};
use mockable::DefaultClock;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub backend: Backend,
}

/// Execute the server action.
/// # Errors
/// Returns an error if a collaborator cannot be built or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    let (identity, store) = collaborators(&args.backend)?;
    let users = Users::new(identity, store, Arc::new(DefaultClock));

    api::new(args.port, Arc::new(users)).await
}

fn collaborators(
    backend: &Backend,
) -> Result<(Arc<dyn IdentityProvider>, Arc<dyn DocumentStore>)> {
    match backend {
        Backend::Memory => {
            warn!("Using in-memory backend, accounts are lost on restart");
            let identity: Arc<dyn IdentityProvider> = Arc::new(MemoryIdentity::new());
            let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
            Ok((identity, store))
        }
        Backend::Firebase(options) => firebase(options),
    }
}

fn firebase(options: &Options) -> Result<(Arc<dyn IdentityProvider>, Arc<dyn DocumentStore>)> {
    let identity = FirebaseAuth::new(&options.identity_url, options.api_key.clone())
        .context("Could not build identity client")?;
    let store = Firestore::new(
        &options.firestore_url,
        &options.project_id,
        options.firestore_token.clone(),
    )
    .context("Could not build document store client")?;

    let identity: Arc<dyn IdentityProvider> = Arc::new(identity);
    let store: Arc<dyn DocumentStore> = Arc::new(store);
    Ok((identity, store))
}

fn log_startup_args(args: &Args) {
    let entries = match &args.backend {
        Backend::Memory => vec![
            ("listen", format!("tcp:{}", args.port)),
            ("backend", "memory".to_string()),
        ],
        Backend::Firebase(options) => vec![
            ("listen", format!("tcp:{}", args.port)),
            ("backend", "firebase".to_string()),
            ("project_id", options.project_id.clone()),
            ("identity_url", options.identity_url.clone()),
            ("firestore_url", options.firestore_url.clone()),
            (
                "firestore_token_set",
                options.firestore_token.is_some().to_string(),
            ),
        ],
    };

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
    info!("{message}");
}

fn short_commit(hash: &str) -> &str {
    let trimmed = hash.trim();
    trimmed.get(..7).unwrap_or(trimmed)
}
