//! Shared application state.
//!
//! One context object wires the configuration, the session, notifications,
//! the API client and the navigator together. Callers pass it around
//! explicitly; nothing here is global.

use crate::client::ApiClient;
use crate::config::ConfigV1;
use crate::router::Navigator;
use crate::store::TokenStore;
use crate::toast::ToastNotifier;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded at startup.
    pub config: Arc<ConfigV1>,
    /// The session's credentials, shared by the client and the navigator.
    pub tokens: Arc<TokenStore>,
    pub toasts: Arc<ToastNotifier>,
    pub client: Arc<ApiClient>,
    pub navigator: Arc<Navigator>,
}
