use super::{Account, IdentityError, IdentityProvider};
use crate::APP_USER_AGENT;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, error, instrument};
use url::Url;

pub const DEFAULT_IDENTITY_URL: &str = "https://identitytoolkit.googleapis.com";

const CODE_NETWORK: &str = "auth/network-request-failed";
const CODE_INTERNAL: &str = "auth/internal-error";

/// Identity Toolkit REST client (Firebase Authentication).
///
/// `base_url` may point at the Auth emulator, e.g.
/// `http://localhost:9099/identitytoolkit.googleapis.com`.
#[derive(Debug)]
pub struct FirebaseAuth {
    client: Client,
    base_url: String,
    api_key: SecretString,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    id_token: String,
}

impl FirebaseAuth {
    /// # Errors
    /// Returns an error if `base_url` is not a valid URL or the HTTP client
    /// cannot be built.
    pub fn new(base_url: &str, api_key: SecretString) -> Result<Self> {
        let url = Url::parse(base_url)
            .with_context(|| format!("Invalid identity provider URL: {base_url}"))?;
        let client = Client::builder().user_agent(APP_USER_AGENT).build()?;

        Ok(Self {
            client,
            base_url: url.as_str().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/v1/accounts:{method}", self.base_url)
    }

    async fn password_call(
        &self,
        method: &str,
        email: &str,
        password: &str,
    ) -> Result<Account, IdentityError> {
        let endpoint = self.endpoint(method);

        let response = self
            .client
            .post(&endpoint)
            .query(&[("key", self.api_key.expose_secret())])
            .json(&json!({
                "email": email,
                "password": password,
                "returnSecureToken": true,
            }))
            .send()
            .await
            .map_err(network_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let json_response: Value = response.json().await.unwrap_or(Value::Null);
            let message = json_response["error"]["message"]
                .as_str()
                .unwrap_or_default();

            debug!("{} - {}, {}", endpoint, status, message);

            return Err(IdentityError::from_code(&auth_code(message), message));
        }

        let body: SignInResponse = response.json().await.map_err(|e| {
            let e = e.without_url();
            error!("Failed to parse identity provider response: {}", e);

            IdentityError::Other {
                code: CODE_INTERNAL.to_string(),
                message: e.to_string(),
            }
        })?;

        Ok(Account::new(body.local_id).with_id_token(SecretString::from(body.id_token)))
    }
}

#[async_trait]
impl IdentityProvider for FirebaseAuth {
    #[instrument(skip(self, password))]
    async fn create_account(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Account, IdentityError> {
        self.password_call("signUp", email, password).await
    }

    #[instrument(skip(self, password))]
    async fn authenticate(&self, email: &str, password: &str) -> Result<Account, IdentityError> {
        self.password_call("signInWithPassword", email, password).await
    }

    async fn issue_token(&self, account: &Account) -> Result<String, IdentityError> {
        account
            .id_token
            .as_ref()
            .map(|token| token.expose_secret().to_string())
            .ok_or_else(|| IdentityError::Other {
                code: CODE_INTERNAL.to_string(),
                message: format!("no ID token for account {}", account.id),
            })
    }
}

/// The request URL carries the API key, so it is dropped from the error.
fn network_error(e: reqwest::Error) -> IdentityError {
    let e = e.without_url();
    error!("Identity provider request failed: {}", e);

    IdentityError::Other {
        code: CODE_NETWORK.to_string(),
        message: e.to_string(),
    }
}

/// Map an Identity Toolkit error message (`"WEAK_PASSWORD : Password should
/// be at least 6 characters"`) to the `auth/*` code clients know.
fn auth_code(message: &str) -> String {
    let reason = message.split([' ', ':']).next().unwrap_or_default();

    let code = match reason {
        "EMAIL_EXISTS" => super::CODE_EMAIL_IN_USE,
        "INVALID_PASSWORD" => super::CODE_WRONG_PASSWORD,
        "EMAIL_NOT_FOUND" => "auth/user-not-found",
        "USER_DISABLED" => "auth/user-disabled",
        "WEAK_PASSWORD" => "auth/weak-password",
        "INVALID_EMAIL" => "auth/invalid-email",
        "MISSING_PASSWORD" => "auth/missing-password",
        "TOO_MANY_ATTEMPTS_TRY_LATER" => "auth/too-many-requests",
        "INVALID_LOGIN_CREDENTIALS" => "auth/invalid-credential",
        "OPERATION_NOT_ALLOWED" => "auth/operation-not-allowed",
        "" => CODE_INTERNAL,
        other => return other.to_string(),
    };

    code.to_string()
}
