use serde::{Deserialize, Serialize};

use super::user::UserProfile;

/// Username/password pair posted to the login endpoint.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
}

impl LoginCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        LoginCredentials {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Tokens issued on login or signup. Signup also echoes the new profile.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
    #[serde(default)]
    pub user: Option<UserProfile>,
}

/// Answer of the refresh endpoint. `refresh` is only present when the
/// server rotates refresh tokens.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RefreshedTokens {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Everything the client knows about the current session.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialSet {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user: Option<UserProfile>,
}

impl CredentialSet {
    /// Only the access token decides; a lone refresh token is not a session.
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }
}
