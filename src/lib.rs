//! # Windsayl (signup & login)
//!
//! `windsayl` accepts signup and login form data, runs a handful of presence
//! and format checks, delegates credential creation and verification to an
//! external identity provider and records a user profile in a document store,
//! keyed by the user's chosen handle.
//!
//! ## Collaborators
//!
//! - **Identity provider** ([`identity::IdentityProvider`]): creates accounts,
//!   authenticates them and issues bearer tokens. Backed by the Firebase
//!   Identity Toolkit REST API or an in-process implementation.
//! - **Document store** ([`store::DocumentStore`]): holds one profile per
//!   handle at `/users/{handle}`. Backed by the Firestore REST API or an
//!   in-process map.
//!
//! Both are injected into [`users::Users`], which owns the request flow.
//!
//! ## Handle uniqueness
//!
//! The handle is checked before the account is created and the profile is
//! written afterwards without re-checking. Two concurrent signups for the same
//! handle can both pass the check; the later write wins.

pub mod api;
pub mod cli;
pub mod identity;
pub mod store;
pub mod users;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
