use std::sync::Arc;
use std::time::Duration;

use http::StatusCode;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::error::ApiError;
use super::middleware::{
    BearerAuth, LogOutcome, MiddlewareChain, RequestMiddleware, ResponseMiddleware,
};
use super::refresh::{HttpRefresher, Refresher, REFRESH_PATH};
use super::request::{ApiResponse, Attempt, PendingRequest};
use crate::config::ApiConfig;
use crate::models::RefreshedTokens;
use crate::store::TokenStore;

/// What to do with a 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnauthorizedAction {
    /// Refresh the access token and send the request once more.
    Refresh,
    /// Give up. `clear_session` is set when a refresh token existed but can
    /// no longer help.
    Propagate { clear_session: bool },
}

/// Decides the fate of a 401. Only a first attempt may refresh, which is
/// what keeps the client out of refresh loops.
pub fn decide_unauthorized(
    attempt: &Attempt,
    has_refresh_token: bool,
    is_refresh_endpoint: bool,
) -> UnauthorizedAction {
    if attempt.is_retry() || is_refresh_endpoint || !has_refresh_token {
        return UnauthorizedAction::Propagate {
            clear_session: has_refresh_token,
        };
    }
    UnauthorizedAction::Refresh
}

/// HTTP client for the book service that keeps the session alive.
///
/// Every call goes through the middleware chain (bearer token first), and a
/// 401 on a first attempt triggers one refresh and one resend.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    timeout_ms: u64,
    tokens: Arc<TokenStore>,
    chain: MiddlewareChain,
    refresher: Arc<dyn Refresher>,
    // Serialises refresh cycles across concurrent requests.
    refresh_lock: Mutex<()>,
}

impl ApiClient {
    /// Builds a client with the default chain: bearer auth and outcome logging.
    pub fn new(config: &ApiConfig, tokens: Arc<TokenStore>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_in_ms))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::InvalidRequest(format!("Failed to build HTTP client: {}", e)))?;

        let refresher = Arc::new(HttpRefresher::new(
            http.clone(),
            &config.base_url,
            config.timeout_in_ms,
        ));

        let mut chain = MiddlewareChain::new();
        chain.push_request(Arc::new(BearerAuth::new(tokens.clone())));
        chain.push_response(Arc::new(LogOutcome::default()));

        info!(
            "Creating API client for '{}' (timeout {}ms)",
            config.base_url, config.timeout_in_ms
        );

        Ok(ApiClient {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout_ms: config.timeout_in_ms,
            tokens,
            chain,
            refresher,
            refresh_lock: Mutex::new(()),
        })
    }

    pub fn with_refresher(mut self, refresher: Arc<dyn Refresher>) -> Self {
        debug!("Using '{}' refresher", refresher.get_name());
        self.refresher = refresher;
        self
    }

    pub fn with_request_middleware(mut self, middleware: Arc<dyn RequestMiddleware>) -> Self {
        self.chain.push_request(middleware);
        self
    }

    pub fn with_response_middleware(mut self, middleware: Arc<dyn ResponseMiddleware>) -> Self {
        self.chain.push_response(middleware);
        self
    }

    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends a request and returns the final outcome after any refresh/resend.
    pub async fn send(&self, request: PendingRequest) -> Result<ApiResponse, ApiError> {
        let outcome = self.execute(Attempt::first(request.clone())).await;
        self.chain.apply_response(&request, &outcome);
        outcome
    }

    /// `send` followed by JSON decoding of the body.
    pub async fn send_json<T: DeserializeOwned>(&self, request: PendingRequest) -> Result<T, ApiError> {
        self.send(request).await?.json()
    }

    /// Runs the refresh protocol now and stores the result.
    ///
    /// A rejected refresh token ends the session: the token store is cleared
    /// and `SessionExpired` is returned. Transport failures and server errors
    /// are returned as they are and leave the session untouched.
    pub async fn refresh_credentials(&self) -> Result<RefreshedTokens, ApiError> {
        let Some(refresh_token) = self.tokens.refresh_token() else {
            return Err(ApiError::SessionExpired {
                path: REFRESH_PATH.to_string(),
                reason: "no refresh token available".to_string(),
            });
        };

        match self.refresher.refresh(&refresh_token).await {
            Ok(refreshed) => {
                self.tokens.update_access_token(&refreshed.access);
                if let Some(rotated) = &refreshed.refresh {
                    self.tokens.update_refresh_token(rotated);
                }
                info!(rotated = refreshed.refresh.is_some(), "Session refreshed");
                Ok(refreshed)
            }
            Err(err) if err.invalidates_session() => {
                warn!("Refresh token rejected, ending session: {}", err);
                self.tokens.clear_tokens();
                Err(ApiError::SessionExpired {
                    path: REFRESH_PATH.to_string(),
                    reason: err.to_string(),
                })
            }
            Err(err) => {
                warn!("Refresh failed without a verdict on the session: {}", err);
                Err(err)
            }
        }
    }

    async fn execute(&self, first: Attempt) -> Result<ApiResponse, ApiError> {
        let mut attempt = first;
        loop {
            let wire = self.chain.apply_request(attempt.request().clone());
            let sent_token = wire.bearer_token().map(str::to_owned);
            let response = self.dispatch(&wire).await?;

            if response.status != StatusCode::UNAUTHORIZED {
                return response.error_for_status();
            }

            let action = decide_unauthorized(
                &attempt,
                self.tokens.refresh_token().is_some(),
                is_refresh_path(&wire.path),
            );
            debug!(
                request_id = %wire.id,
                path = wire.path.as_str(),
                attempt = attempt.number(),
                ?action,
                "Received 401"
            );

            match action {
                UnauthorizedAction::Refresh => {
                    self.refresh_once(sent_token.as_deref()).await?;
                    attempt = attempt.retried();
                }
                UnauthorizedAction::Propagate { clear_session: true } => {
                    warn!(
                        request_id = %wire.id,
                        path = wire.path.as_str(),
                        "Credentials rejected after refresh, ending session"
                    );
                    self.tokens.clear_tokens();
                    return Err(ApiError::SessionExpired {
                        path: wire.path.clone(),
                        reason: "the server rejected the refreshed credentials".to_string(),
                    });
                }
                UnauthorizedAction::Propagate {
                    clear_session: false,
                } => {
                    return response.error_for_status();
                }
            }
        }
    }

    /// Refreshes unless another request already did while we waited for the
    /// lock, in which case the stored token differs from the one we sent.
    async fn refresh_once(&self, sent_token: Option<&str>) -> Result<(), ApiError> {
        let _guard = self.refresh_lock.lock().await;

        let current = self.tokens.access_token();
        if current.is_some() && current.as_deref() != sent_token {
            debug!("Access token already refreshed by a concurrent request");
            return Ok(());
        }

        self.refresh_credentials().await.map(|_| ())
    }

    async fn dispatch(&self, request: &PendingRequest) -> Result<ApiResponse, ApiError> {
        let url = self.url_for(&request.path);
        let mut builder = self
            .http
            .request(request.method.clone(), &url)
            .headers(request.headers.clone());
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::from_transport(&request.path, &e, self.timeout_ms))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::from_transport(&request.path, &e, self.timeout_ms))?
            .to_vec();

        Ok(ApiResponse {
            path: request.path.clone(),
            status,
            headers,
            body,
        })
    }

    fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

/// Compares without leading/trailing slashes or a query, matching how
/// `url_for` accepts paths.
fn is_refresh_path(path: &str) -> bool {
    let path = path.split('?').next().unwrap_or(path);
    path.trim_matches('/') == REFRESH_PATH.trim_matches('/')
}
