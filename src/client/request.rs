use http::header::{HeaderName, HeaderValue, AUTHORIZATION};
use http::{HeaderMap, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use super::error::ApiError;

/// Description of an outbound call, independent of any attempt to send it.
///
/// The client never mutates the caller's request: each attempt runs the
/// request middleware on a clone.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub id: Uuid,
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl PendingRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        PendingRequest {
            id: Uuid::new_v4(),
            method,
            path: path.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_query_pairs(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body).map_err(|e| {
            ApiError::InvalidRequest(format!("body for {} does not serialize: {}", self.path, e))
        })?;
        self.body = Some(value);
        Ok(self)
    }

    /// The bearer credential currently attached, if any.
    pub fn bearer_token(&self) -> Option<&str> {
        self.headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
    }
}

/// An original request together with how many times it has been sent.
///
/// Attempt records are values: moving to the next attempt yields a new record,
/// and only the first attempt is ever allowed to start a refresh.
#[derive(Debug, Clone)]
pub struct Attempt {
    request: PendingRequest,
    number: u8,
}

impl Attempt {
    pub fn first(request: PendingRequest) -> Self {
        Attempt { request, number: 1 }
    }

    pub fn retried(self) -> Self {
        Attempt {
            request: self.request,
            number: self.number.saturating_add(1),
        }
    }

    pub fn request(&self) -> &PendingRequest {
        &self.request
    }

    pub fn number(&self) -> u8 {
        self.number
    }

    pub fn is_retry(&self) -> bool {
        self.number > 1
    }
}

/// A response that made it back from the server.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub path: String,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success() || self.status.is_redirection()
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_slice(&self.body).map_err(|e| ApiError::Decode {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    /// Turns a non-success status into the matching classified error.
    pub fn error_for_status(self) -> Result<Self, ApiError> {
        if self.is_success() {
            return Ok(self);
        }
        let body = self.text();
        Err(ApiError::from_status(&self.path, self.status, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attempt_progression() {
        let attempt = Attempt::first(PendingRequest::get("/books/"));
        assert_eq!(attempt.number(), 1);
        assert!(!attempt.is_retry());

        let retry = attempt.retried();
        assert_eq!(retry.number(), 2);
        assert!(retry.is_retry());
        assert_eq!(retry.request().path, "/books/");
    }

    #[test]
    fn test_bearer_token_reads_authorization_header() {
        let request = PendingRequest::get("/books/").with_header(
            AUTHORIZATION,
            HeaderValue::from_static("Bearer abc.def"),
        );
        assert_eq!(request.bearer_token(), Some("abc.def"));

        let basic = PendingRequest::get("/books/")
            .with_header(AUTHORIZATION, HeaderValue::from_static("Basic Zm9v"));
        assert_eq!(basic.bearer_token(), None);
    }

    #[test]
    fn test_with_json_sets_body() {
        let request = PendingRequest::post("/books/1/rating/")
            .with_json(&serde_json::json!({"score": 4.5}))
            .expect("json body");
        assert_eq!(request.body, Some(serde_json::json!({"score": 4.5})));
    }

    #[test]
    fn test_error_for_status() {
        let ok = ApiResponse {
            path: "/books/".to_string(),
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: b"[]".to_vec(),
        };
        assert!(ok.error_for_status().is_ok());

        let missing = ApiResponse {
            path: "/books/99/".to_string(),
            status: StatusCode::NOT_FOUND,
            headers: HeaderMap::new(),
            body: Vec::new(),
        };
        let err = missing.error_for_status().unwrap_err();
        assert!(matches!(err, ApiError::NotFound { ref path } if path == "/books/99/"));
    }
}
