//! Application wiring.

use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::client::{ApiClient, ToastOnError};
use crate::config::ConfigV1;
use crate::router::{Navigator, RouteTable};
use crate::state::AppState;
use crate::store::{create_storage, TokenStore};
use crate::toast::ToastNotifier;

/// Builds the application state from configuration.
///
/// Restores the previous session from storage, then creates the API client
/// (bearer auth, outcome logging, error toasts) and the navigator on top of
/// the same token store.
///
/// # Errors
///
/// Returns an error if the storage backend cannot be opened or the HTTP
/// client cannot be created.
pub fn build_state(config: Arc<ConfigV1>) -> Result<AppState, Box<dyn std::error::Error>> {
    let storage = create_storage(&config.storage)?;
    let tokens = Arc::new(TokenStore::load(storage));
    let toasts = Arc::new(ToastNotifier::new(Duration::from_millis(
        config.toast.duration_in_ms,
    )));

    let client = ApiClient::new(&config.api, tokens.clone())?
        .with_response_middleware(Arc::new(ToastOnError::new(toasts.clone())));
    let navigator = Navigator::new(RouteTable::default(), tokens.clone());

    info!(
        authenticated = tokens.is_authenticated(),
        "Application state ready"
    );

    Ok(AppState {
        config,
        tokens,
        toasts,
        client: Arc::new(client),
        navigator: Arc::new(navigator),
    })
}
