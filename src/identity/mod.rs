//! Identity provider capability.
//!
//! The provider owns credentials: it creates accounts, authenticates them and
//! issues bearer tokens. Failures are reduced to a closed set of variants so
//! the request flow never compares raw provider strings.

pub mod firebase;
pub mod memory;

use async_trait::async_trait;
use secrecy::SecretString;
use thiserror::Error;

pub use self::firebase::FirebaseAuth;
pub use self::memory::MemoryIdentity;

pub const CODE_EMAIL_IN_USE: &str = "auth/email-already-in-use";
pub const CODE_WRONG_PASSWORD: &str = "auth/wrong-password";

/// Handle to an account returned by [`IdentityProvider::create_account`] or
/// [`IdentityProvider::authenticate`].
#[derive(Debug, Clone)]
pub struct Account {
    /// Opaque identifier assigned by the provider.
    pub id: String,
    /// Token handed back by providers that issue one as part of sign-in.
    pub(crate) id_token: Option<SecretString>,
}

impl Account {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            id_token: None,
        }
    }

    #[must_use]
    pub fn with_id_token(mut self, token: SecretString) -> Self {
        self.id_token = Some(token);
        self
    }
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("email address is already in use")]
    EmailInUse,
    #[error("wrong password")]
    WrongPassword,
    #[error("{code}: {message}")]
    Other { code: String, message: String },
}

impl IdentityError {
    /// Build an error from a provider code, folding the codes the request
    /// flow branches on into their own variants.
    #[must_use]
    pub fn from_code(code: &str, message: impl Into<String>) -> Self {
        match code {
            CODE_EMAIL_IN_USE => Self::EmailInUse,
            CODE_WRONG_PASSWORD => Self::WrongPassword,
            _ => Self::Other {
                code: code.to_string(),
                message: message.into(),
            },
        }
    }

    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::EmailInUse => CODE_EMAIL_IN_USE,
            Self::WrongPassword => CODE_WRONG_PASSWORD,
            Self::Other { code, .. } => code,
        }
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an account for `email` with `password`.
    ///
    /// # Errors
    /// [`IdentityError::EmailInUse`] if the email is registered, `Other` for
    /// any other provider or transport failure.
    async fn create_account(&self, email: &str, password: &str)
        -> Result<Account, IdentityError>;

    /// Verify `email` and `password` against an existing account.
    ///
    /// # Errors
    /// [`IdentityError::WrongPassword`] if the password does not match, `Other`
    /// for any other provider or transport failure.
    async fn authenticate(&self, email: &str, password: &str) -> Result<Account, IdentityError>;

    /// Issue a bearer token for `account`.
    ///
    /// # Errors
    /// Returns an error if the provider cannot issue a token.
    async fn issue_token(&self, account: &Account) -> Result<String, IdentityError>;
}
