use crate::store::Document;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use utoipa::ToSchema;

/// Absent and `null` fields read as empty strings so they fail the presence
/// checks instead of the body parser.
fn empty_if_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(ToSchema, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct SignupRequest {
    #[serde(deserialize_with = "empty_if_null")]
    pub email: String,
    #[serde(deserialize_with = "empty_if_null")]
    pub password: String,
    #[serde(deserialize_with = "empty_if_null")]
    pub confirm_password: String,
    #[serde(deserialize_with = "empty_if_null")]
    pub handle: String,
}

impl fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupRequest")
            .field("email", &self.email)
            .field("password", &"***")
            .field("confirm_password", &"***")
            .field("handle", &self.handle)
            .finish()
    }
}

#[derive(ToSchema, Deserialize, Default, Clone)]
#[serde(default)]
pub struct LoginRequest {
    #[serde(deserialize_with = "empty_if_null")]
    pub email: String,
    #[serde(deserialize_with = "empty_if_null")]
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// Profile stored at `/users/{handle}`.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub handle: String,
    pub email: String,
    /// ISO-8601 timestamp taken when the profile is written.
    pub created_at: String,
    /// Account identifier assigned by the identity provider.
    pub user_id: String,
}

#[cfg(test)]
impl UserProfile {
    /// Read a profile back from a stored document.
    pub(crate) fn from_document(document: &Document) -> Option<Self> {
        serde_json::from_value(Value::Object(document.clone())).ok()
    }
}

impl From<&UserProfile> for Document {
    fn from(profile: &UserProfile) -> Self {
        let mut document = Self::new();
        document.insert("handle".to_string(), Value::from(profile.handle.as_str()));
        document.insert("email".to_string(), Value::from(profile.email.as_str()));
        document.insert(
            "createdAt".to_string(),
            Value::from(profile.created_at.as_str()),
        );
        document.insert("userId".to_string(), Value::from(profile.user_id.as_str()));
        document
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    pub user_token: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone)]
pub struct LoginResponse {
    pub token: String,
}
