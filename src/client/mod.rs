//! The authenticated HTTP client: middleware, 401 handling and token refresh.

pub mod client;
pub mod error;
pub mod middleware;
pub mod refresh;
pub mod request;

pub use client::{decide_unauthorized, ApiClient, UnauthorizedAction};
pub use error::{ApiError, ErrorKind};
pub use middleware::{
    BearerAuth, LogOutcome, MiddlewareChain, RequestMiddleware, ResponseMiddleware, ToastOnError,
};
pub use refresh::{HttpRefresher, Refresher, REFRESH_PATH};
pub use request::{ApiResponse, Attempt, PendingRequest};
