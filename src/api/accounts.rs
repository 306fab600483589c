//! Account endpoints: login, signup, refresh, logout and the profile.

use serde_json::json;
use tracing::{info, warn};

use crate::client::{ApiClient, ApiError, PendingRequest};
use crate::models::{
    LoginCredentials, ProfileUpdate, RefreshedTokens, SignupRequest, TokenPair, UserProfile,
};

pub use crate::client::REFRESH_PATH;

pub const LOGIN_PATH: &str = "/accounts/login/";
pub const SIGNUP_PATH: &str = "/accounts/signup/";
pub const LOGOUT_PATH: &str = "/accounts/logout/";
pub const PROFILE_PATH: &str = "/accounts/profile/";
pub const PROFILE_UPDATE_PATH: &str = "/accounts/profile/update/";

/// Logs in and starts a session with the returned tokens. The cached profile
/// is replaced by the one in the response, or dropped when none is sent.
pub async fn login(client: &ApiClient, credentials: &LoginCredentials) -> Result<TokenPair, ApiError> {
    let request = PendingRequest::post(LOGIN_PATH).with_json(credentials)?;
    let pair: TokenPair = client.send_json(request).await?;
    start_session(client, &pair);
    info!("Logged in as '{}'", credentials.username);
    Ok(pair)
}

/// Creates an account; the backend signs the new reader in right away.
pub async fn signup(client: &ApiClient, form: &SignupRequest) -> Result<TokenPair, ApiError> {
    if form.password != form.password_confirm {
        return Err(ApiError::InvalidRequest(
            "password and password confirmation differ".to_string(),
        ));
    }
    let request = PendingRequest::post(SIGNUP_PATH).with_json(form)?;
    let pair: TokenPair = client.send_json(request).await?;
    start_session(client, &pair);
    info!("Signed up as '{}'", form.username);
    Ok(pair)
}

/// Exchanges the stored refresh token for a new access token.
pub async fn refresh(client: &ApiClient) -> Result<RefreshedTokens, ApiError> {
    client.refresh_credentials().await
}

/// Blacklists the refresh token server-side and forgets the session locally.
///
/// The local session is cleared whatever the server answers.
pub async fn logout(client: &ApiClient) -> Result<(), ApiError> {
    let tokens = client.tokens();
    let Some(refresh_token) = tokens.refresh_token() else {
        tokens.clear_tokens();
        return Ok(());
    };

    let result = match PendingRequest::post(LOGOUT_PATH).with_json(&json!({ "refresh": refresh_token })) {
        Ok(request) => client.send(request).await.map(|_| ()),
        Err(e) => Err(e),
    };
    tokens.clear_tokens();

    match &result {
        Ok(()) => info!("Logged out"),
        Err(e) => warn!("Server-side logout failed, local session cleared anyway: {}", e),
    }
    result
}

/// Fetches the current profile and caches it.
pub async fn profile(client: &ApiClient) -> Result<UserProfile, ApiError> {
    let profile: UserProfile = client.send_json(PendingRequest::get(PROFILE_PATH)).await?;
    client.tokens().set_user(profile.clone());
    Ok(profile)
}

/// Updates profile fields and merges the accepted values into the cached profile.
pub async fn update_profile(client: &ApiClient, update: &ProfileUpdate) -> Result<UserProfile, ApiError> {
    let request = PendingRequest::patch(PROFILE_UPDATE_PATH).with_json(update)?;
    let accepted: ProfileUpdate = client.send_json(request).await?;

    match client.tokens().user() {
        Some(mut cached) => {
            cached.apply(&accepted);
            client.tokens().set_user(cached.clone());
            Ok(cached)
        }
        // The update echo lacks id/username, so fetch the full record.
        None => profile(client).await,
    }
}

fn start_session(client: &ApiClient, pair: &TokenPair) {
    let tokens = client.tokens();
    tokens.set_tokens(&pair.access, &pair.refresh);
    // A profile cached for an earlier session must not outlive it.
    match &pair.user {
        Some(user) => tokens.set_user(user.clone()),
        None => tokens.clear_user(),
    }
}
