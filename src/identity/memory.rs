use super::{Account, IdentityError, IdentityProvider};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;
use ulid::Ulid;

/// Shortest password the hosted provider accepts.
const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug)]
struct Credentials {
    id: String,
    password: SecretString,
}

/// In-process identity provider for tests and local development.
#[derive(Debug, Default)]
pub struct MemoryIdentity {
    accounts: RwLock<HashMap<String, Credentials>>,
    tokens: RwLock<HashMap<String, String>>,
}

impl MemoryIdentity {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Account id a previously issued token belongs to.
    #[cfg(test)]
    pub(crate) async fn token_owner(&self, token: &str) -> Option<String> {
        self.tokens.read().await.get(token).cloned()
    }

    #[cfg(test)]
    pub(crate) async fn account_count(&self) -> usize {
        self.accounts.read().await.len()
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentity {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Account, IdentityError> {
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(IdentityError::from_code(
                "auth/weak-password",
                "Password should be at least 6 characters",
            ));
        }

        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(email) {
            return Err(IdentityError::EmailInUse);
        }

        let id = Ulid::new().to_string();
        accounts.insert(
            email.to_string(),
            Credentials {
                id: id.clone(),
                password: SecretString::from(password),
            },
        );

        debug!("created account {}", id);

        Ok(Account::new(id))
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<Account, IdentityError> {
        let accounts = self.accounts.read().await;
        let Some(credentials) = accounts.get(email) else {
            return Err(IdentityError::from_code(
                "auth/user-not-found",
                "There is no user record corresponding to this identifier",
            ));
        };

        if credentials.password.expose_secret() != password {
            return Err(IdentityError::WrongPassword);
        }

        Ok(Account::new(credentials.id.clone()))
    }

    async fn issue_token(&self, account: &Account) -> Result<String, IdentityError> {
        let token = Ulid::new().to_string();
        self.tokens
            .write()
            .await
            .insert(token.clone(), account.id.clone());
        Ok(token)
    }
}
