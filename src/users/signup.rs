use super::{
    EMAIL_IN_USE, HANDLE_TAKEN, SIGNUP_FAILED, SignupRequest, SignupResponse, UserError,
    UserProfile, Users, user_path, validate_signup,
};
use crate::{identity::IdentityError, store::StoreError};
use chrono::SecondsFormat;
use tracing::{debug, error, info, instrument};

impl Users {
    /// Register a new user under `request.handle`.
    ///
    /// Checks that the handle is free, creates the account, then writes the
    /// profile. The write does not re-check the handle, so a concurrent signup
    /// for the same handle between the check and the write is overwritten.
    ///
    /// # Errors
    /// Returns [`UserError`] for invalid input, a taken handle or email, or
    /// any identity provider or document store failure.
    #[instrument(skip(self, request), fields(handle = %request.handle))]
    pub async fn signup(&self, request: &SignupRequest) -> Result<SignupResponse, UserError> {
        let errors = validate_signup(request);
        if !errors.is_empty() {
            debug!("signup rejected: {:?}", errors);
            return Err(UserError::Validation(errors));
        }

        let path = user_path(&request.handle);

        if self.store.get(&path).await.map_err(store_failure)?.is_some() {
            debug!("handle {} is already taken", request.handle);
            return Err(UserError::Conflict {
                field: "handle",
                message: HANDLE_TAKEN,
            });
        }

        let account = self
            .identity
            .create_account(&request.email, &request.password)
            .await
            .map_err(identity_failure)?;

        let user_token = self
            .identity
            .issue_token(&account)
            .await
            .map_err(identity_failure)?;

        let profile = UserProfile {
            handle: request.handle.clone(),
            email: request.email.clone(),
            created_at: self
                .clock
                .utc()
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            user_id: account.id,
        };

        self.store
            .set(&path, (&profile).into())
            .await
            .map_err(store_failure)?;

        info!("user {} signed up", profile.handle);

        Ok(SignupResponse { user_token })
    }
}

fn identity_failure(e: IdentityError) -> UserError {
    match e {
        IdentityError::EmailInUse => UserError::Conflict {
            field: "email",
            message: EMAIL_IN_USE,
        },
        other => {
            error!("Signup failed: {:?}", other);

            UserError::Upstream {
                code: other.code().to_string(),
                context: SIGNUP_FAILED,
            }
        }
    }
}

fn store_failure(e: StoreError) -> UserError {
    error!("Signup failed: {:?}", e);

    UserError::Upstream {
        code: e.code,
        context: SIGNUP_FAILED,
    }
}
