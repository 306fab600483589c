//! Ordered request/response middleware run around every API call.
//!
//! Request middleware runs once per attempt, in insertion order, on a clone of
//! the original request. Response middleware runs once per original request,
//! after retries are settled, and only observes the outcome.

use std::sync::Arc;
use std::time::Duration;

use http::header::{HeaderValue, AUTHORIZATION};
use tracing::{debug, info, warn};

use super::error::ApiError;
use super::request::{ApiResponse, PendingRequest};
use crate::store::TokenStore;
use crate::toast::ToastNotifier;
use crate::utils::log_throttle::LogThrottle;

pub trait RequestMiddleware: Send + Sync {
    fn get_name(&self) -> &str;
    fn on_request(&self, request: PendingRequest) -> PendingRequest;
}

pub trait ResponseMiddleware: Send + Sync {
    fn get_name(&self) -> &str;
    fn on_response(&self, request: &PendingRequest, outcome: &Result<ApiResponse, ApiError>);
}

#[derive(Clone, Default)]
pub struct MiddlewareChain {
    request: Vec<Arc<dyn RequestMiddleware>>,
    response: Vec<Arc<dyn ResponseMiddleware>>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_request(&mut self, middleware: Arc<dyn RequestMiddleware>) {
        debug!("Adding request middleware '{}'", middleware.get_name());
        self.request.push(middleware);
    }

    pub fn push_response(&mut self, middleware: Arc<dyn ResponseMiddleware>) {
        debug!("Adding response middleware '{}'", middleware.get_name());
        self.response.push(middleware);
    }

    pub fn apply_request(&self, request: PendingRequest) -> PendingRequest {
        self.request
            .iter()
            .fold(request, |req, middleware| middleware.on_request(req))
    }

    pub fn apply_response(&self, request: &PendingRequest, outcome: &Result<ApiResponse, ApiError>) {
        for middleware in &self.response {
            middleware.on_response(request, outcome);
        }
    }

    pub fn names(&self) -> Vec<&str> {
        self.request
            .iter()
            .map(|m| m.get_name())
            .chain(self.response.iter().map(|m| m.get_name()))
            .collect()
    }
}

/// Attaches the token store's access token, read at the moment of sending.
pub struct BearerAuth {
    tokens: Arc<TokenStore>,
}

impl BearerAuth {
    pub fn new(tokens: Arc<TokenStore>) -> Self {
        BearerAuth { tokens }
    }
}

impl RequestMiddleware for BearerAuth {
    fn get_name(&self) -> &str {
        "bearer-auth"
    }

    fn on_request(&self, mut request: PendingRequest) -> PendingRequest {
        let Some(token) = self.tokens.access_token() else {
            return request;
        };
        match HeaderValue::from_str(&format!("Bearer {}", token)) {
            Ok(mut value) => {
                value.set_sensitive(true);
                request.headers.insert(AUTHORIZATION, value);
            }
            Err(e) => warn!(
                request_id = %request.id,
                "Stored access token is not a valid header value, sending without it: {}",
                e
            ),
        }
        request
    }
}

/// Logs the final outcome of each call. Transport failures are throttled per
/// path so a dead network does not flood the log.
pub struct LogOutcome {
    throttle: LogThrottle,
}

impl LogOutcome {
    pub fn new(window: Duration) -> Self {
        LogOutcome {
            throttle: LogThrottle::new(window),
        }
    }
}

impl Default for LogOutcome {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl ResponseMiddleware for LogOutcome {
    fn get_name(&self) -> &str {
        "log-outcome"
    }

    fn on_response(&self, request: &PendingRequest, outcome: &Result<ApiResponse, ApiError>) {
        match outcome {
            Ok(response) => debug!(
                request_id = %request.id,
                method = %request.method,
                path = request.path.as_str(),
                status = response.status.as_u16(),
                "Request finished"
            ),
            Err(err) if err.kind().is_transport() => {
                let key = format!("{}.{}", err.kind().as_str(), request.path);
                if let Some(suppressed_count) = self.throttle.should_emit(&key) {
                    warn!(
                        event_name = "client.transport.failure",
                        request_id = %request.id,
                        method = %request.method,
                        path = request.path.as_str(),
                        error_kind = err.kind().as_str(),
                        suppressed_count,
                        "Request failed: {}",
                        err
                    );
                }
            }
            Err(err) => info!(
                request_id = %request.id,
                method = %request.method,
                path = request.path.as_str(),
                error_kind = err.kind().as_str(),
                "Request failed: {}",
                err
            ),
        }
    }
}

/// Raises an error toast for every failed call.
pub struct ToastOnError {
    toasts: Arc<ToastNotifier>,
}

impl ToastOnError {
    pub fn new(toasts: Arc<ToastNotifier>) -> Self {
        ToastOnError { toasts }
    }
}

impl ResponseMiddleware for ToastOnError {
    fn get_name(&self) -> &str {
        "toast-on-error"
    }

    fn on_response(&self, _request: &PendingRequest, outcome: &Result<ApiResponse, ApiError>) {
        if let Err(err) = outcome {
            self.toasts.notify_error(err);
        }
    }
}
