use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use super::error::ApiError;
use super::request::ApiResponse;
use crate::models::RefreshedTokens;

pub const REFRESH_PATH: &str = "/accounts/token/refresh/";

/// Exchanges a refresh token for a new access token.
///
/// Implementations must not route the call through the API client's
/// middleware or 401 handling.
#[async_trait]
pub trait Refresher: Send + Sync {
    fn get_name(&self) -> &str;
    async fn refresh(&self, refresh_token: &str) -> Result<RefreshedTokens, ApiError>;
}

/// Calls the backend's refresh endpoint with a plain request.
pub struct HttpRefresher {
    http: reqwest::Client,
    url: String,
    timeout_ms: u64,
}

impl HttpRefresher {
    pub fn new(http: reqwest::Client, base_url: &str, timeout_ms: u64) -> Self {
        HttpRefresher {
            http,
            url: format!("{}{}", base_url.trim_end_matches('/'), REFRESH_PATH),
            timeout_ms,
        }
    }
}

#[async_trait]
impl Refresher for HttpRefresher {
    fn get_name(&self) -> &str {
        "http"
    }

    async fn refresh(&self, refresh_token: &str) -> Result<RefreshedTokens, ApiError> {
        debug!("Requesting new access token from '{}'", self.url);

        let response = self
            .http
            .post(&self.url)
            .json(&json!({ "refresh": refresh_token }))
            .send()
            .await
            .map_err(|e| ApiError::from_transport(REFRESH_PATH, &e, self.timeout_ms))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::from_transport(REFRESH_PATH, &e, self.timeout_ms))?
            .to_vec();

        let refreshed: RefreshedTokens = ApiResponse {
            path: REFRESH_PATH.to_string(),
            status,
            headers,
            body,
        }
        .error_for_status()?
        .json()?;

        debug!(
            rotated = refreshed.refresh.is_some(),
            "Access token refreshed"
        );
        Ok(refreshed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn refresher(url: &str) -> HttpRefresher {
        HttpRefresher::new(reqwest::Client::new(), url, 1_000)
    }

    #[tokio::test]
    async fn test_refresh_success_without_rotation() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", REFRESH_PATH)
            .match_header("authorization", Matcher::Missing)
            .match_body(Matcher::Json(json!({"refresh": "refresh-1"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access": "access-2"}"#)
            .create_async()
            .await;

        let refreshed = refresher(&server.url())
            .refresh("refresh-1")
            .await
            .expect("refresh should succeed");

        m.assert_async().await;
        assert_eq!(refreshed.access, "access-2");
        assert_eq!(refreshed.refresh, None);
    }

    #[tokio::test]
    async fn test_refresh_with_rotation() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", REFRESH_PATH)
            .with_status(200)
            .with_body(r#"{"access": "access-2", "refresh": "refresh-2"}"#)
            .create_async()
            .await;

        let refreshed = refresher(&server.url()).refresh("refresh-1").await.unwrap();
        assert_eq!(refreshed.refresh.as_deref(), Some("refresh-2"));
    }

    #[tokio::test]
    async fn test_rejected_refresh_token() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", REFRESH_PATH)
            .with_status(401)
            .with_body(r#"{"detail": "Token is invalid or expired", "code": "token_not_valid"}"#)
            .create_async()
            .await;

        let err = refresher(&server.url()).refresh("stale").await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized { .. }));
        assert!(err.invalidates_session());
    }

    #[tokio::test]
    async fn test_response_without_access_token() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", REFRESH_PATH)
            .with_status(200)
            .with_body(r#"{"refresh": "only"}"#)
            .create_async()
            .await;

        let err = refresher(&server.url()).refresh("refresh-1").await.unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
        assert!(!err.invalidates_session());
    }
}
