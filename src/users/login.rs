use super::{LOGIN_FAILED, LoginRequest, LoginResponse, UserError, Users, validate_login};
use crate::identity::IdentityError;
use tracing::{debug, error, instrument};

impl Users {
    /// Authenticate `request.email` and return a fresh bearer token.
    ///
    /// # Errors
    /// Returns [`UserError`] for invalid input, a wrong password, or any other
    /// identity provider failure.
    #[instrument(skip(self, request))]
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, UserError> {
        let errors = validate_login(request);
        if !errors.is_empty() {
            debug!("login rejected: {:?}", errors);
            return Err(UserError::Validation(errors));
        }

        let account = self
            .identity
            .authenticate(&request.email, &request.password)
            .await
            .map_err(identity_failure)?;

        let token = self
            .identity
            .issue_token(&account)
            .await
            .map_err(identity_failure)?;

        debug!("account {} logged in", account.id);

        Ok(LoginResponse { token })
    }
}

fn identity_failure(e: IdentityError) -> UserError {
    match e {
        IdentityError::WrongPassword => UserError::AuthRejected,
        other => {
            error!("Login failed: {:?}", other);

            UserError::Upstream {
                code: other.code().to_string(),
                context: LOGIN_FAILED,
            }
        }
    }
}
