use http::StatusCode;
use serde::Serialize;
use thiserror::Error;

/// Coarse failure category, used for logging and for the user-facing message.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    TransportTimeout,
    TransportConnectivity,
    TransportUnknown,
    /// The credentials were rejected and no refresh was attempted.
    AuthExpired,
    /// The session could not be recovered and has been cleared.
    AuthExhausted,
    PermissionDenied,
    NotFound,
    ServerError,
    OtherClientError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::TransportTimeout => "transport-timeout",
            ErrorKind::TransportConnectivity => "transport-connectivity",
            ErrorKind::TransportUnknown => "transport-unknown",
            ErrorKind::AuthExpired => "auth-expired",
            ErrorKind::AuthExhausted => "auth-exhausted",
            ErrorKind::PermissionDenied => "permission-denied",
            ErrorKind::NotFound => "not-found",
            ErrorKind::ServerError => "server-error",
            ErrorKind::OtherClientError => "other-client-error",
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ErrorKind::TransportTimeout
                | ErrorKind::TransportConnectivity
                | ErrorKind::TransportUnknown
        )
    }
}

/// Everything an API call can fail with.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {path} timed out after {timeout_ms}ms")]
    Timeout { path: String, timeout_ms: u64 },

    #[error("could not reach the server for {path}: {message}")]
    Connectivity { path: String, message: String },

    #[error("request to {path} failed: {message}")]
    Transport { path: String, message: String },

    #[error("{path} rejected the credentials")]
    Unauthorized { path: String, body: String },

    #[error("session expired while calling {path}: {reason}")]
    SessionExpired { path: String, reason: String },

    #[error("permission denied for {path}")]
    PermissionDenied { path: String, body: String },

    #[error("{path} was not found")]
    NotFound { path: String },

    #[error("server error {status} from {path}")]
    Server {
        path: String,
        status: StatusCode,
        body: String,
    },

    #[error("request to {path} was rejected with status {status}")]
    Client {
        path: String,
        status: StatusCode,
        body: String,
    },

    #[error("unexpected response body from {path}: {message}")]
    Decode { path: String, message: String },

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// Classifies a non-success HTTP status. 401 is not handled here: it is
    /// only known to be fatal or recoverable once the refresh path is decided.
    pub fn from_status(path: &str, status: StatusCode, body: String) -> Self {
        let path = path.to_string();
        match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized { path, body },
            StatusCode::FORBIDDEN => ApiError::PermissionDenied { path, body },
            StatusCode::NOT_FOUND => ApiError::NotFound { path },
            s if s.is_server_error() => ApiError::Server {
                path,
                status: s,
                body,
            },
            s => ApiError::Client {
                path,
                status: s,
                body,
            },
        }
    }

    /// Maps a reqwest failure (no usable response) onto the transport categories.
    pub fn from_transport(path: &str, error: &reqwest::Error, timeout_ms: u64) -> Self {
        let path = path.to_string();
        if error.is_timeout() {
            return ApiError::Timeout { path, timeout_ms };
        }
        if error.is_connect() {
            return ApiError::Connectivity {
                path,
                message: error.to_string(),
            };
        }
        ApiError::Transport {
            path,
            message: error.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Timeout { .. } => ErrorKind::TransportTimeout,
            ApiError::Connectivity { .. } => ErrorKind::TransportConnectivity,
            ApiError::Transport { .. } | ApiError::Decode { .. } => ErrorKind::TransportUnknown,
            ApiError::Unauthorized { .. } => ErrorKind::AuthExpired,
            ApiError::SessionExpired { .. } => ErrorKind::AuthExhausted,
            ApiError::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            ApiError::NotFound { .. } => ErrorKind::NotFound,
            ApiError::Server { .. } => ErrorKind::ServerError,
            ApiError::Client { .. } | ApiError::InvalidRequest(_) => ErrorKind::OtherClientError,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED),
            ApiError::PermissionDenied { .. } => Some(StatusCode::FORBIDDEN),
            ApiError::NotFound { .. } => Some(StatusCode::NOT_FOUND),
            ApiError::Server { status, .. } | ApiError::Client { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when a failed refresh call means the refresh token itself is dead.
    /// Transport trouble and 5xx say nothing about the token.
    pub fn invalidates_session(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::AuthExpired
                | ErrorKind::AuthExhausted
                | ErrorKind::PermissionDenied
                | ErrorKind::NotFound
                | ErrorKind::OtherClientError
        )
    }

    /// Short text suitable for a toast.
    pub fn user_message(&self) -> &'static str {
        match self.kind() {
            ErrorKind::TransportTimeout => "The server took too long to respond.",
            ErrorKind::TransportConnectivity => "Could not connect to the server.",
            ErrorKind::TransportUnknown => "Something went wrong while talking to the server.",
            ErrorKind::AuthExpired => "Please sign in to continue.",
            ErrorKind::AuthExhausted => "Your session has expired. Please sign in again.",
            ErrorKind::PermissionDenied => "You do not have permission to do that.",
            ErrorKind::NotFound => "The requested item could not be found.",
            ErrorKind::ServerError => "The server ran into a problem. Please try again later.",
            ErrorKind::OtherClientError => "The request could not be completed.",
        }
    }
}
