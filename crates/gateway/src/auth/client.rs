//! Auth-service client
//!
//! Thin reqwest wrapper around the external auth service's refresh-token
//! endpoint. This is the only outbound HTTP call the gateway makes.

use serde::Deserialize;

/// A fresh token pair issued by the auth service
#[derive(Debug, Clone, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

/// Errors from the auth-service client
#[derive(Debug, thiserror::Error)]
pub enum AuthClientError {
    /// AUTH_URL is not configured; refresh is unavailable
    #[error("Auth service not configured")]
    NotConfigured,

    /// The auth service rejected the refresh token (expired, revoked)
    #[error("Refresh rejected with status {0}")]
    Rejected(u16),

    /// Transport failure or malformed response
    #[error("Auth service unreachable: {0}")]
    Transport(String),
}

/// Client for the external auth service
#[derive(Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    auth_url: String,
    api_key: String,
}

impl AuthClient {
    /// Create a new auth client; an empty URL disables refresh
    pub fn new(auth_url: String, api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            auth_url,
            api_key,
        }
    }

    /// Whether a refresh endpoint is configured
    pub fn is_configured(&self) -> bool {
        !self.auth_url.is_empty()
    }

    /// Exchange a refresh token for a fresh token pair
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthClientError> {
        if !self.is_configured() {
            return Err(AuthClientError::NotConfigured);
        }

        let url = format!(
            "{}/auth/v1/token?grant_type=refresh_token",
            self.auth_url.trim_end_matches('/')
        );
        let response = self
            .http
            .post(&url)
            .header("apikey", &self.api_key)
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await
            .map_err(|e| AuthClientError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthClientError::Rejected(response.status().as_u16()));
        }

        response
            .json::<TokenPair>()
            .await
            .map_err(|e| AuthClientError::Transport(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_client_refuses_refresh() {
        let client = AuthClient::new(String::new(), String::new());
        assert!(!client.is_configured());

        let result = client.refresh("some-token").await;
        assert!(matches!(result, Err(AuthClientError::NotConfigured)));
    }

    #[tokio::test]
    async fn test_refresh_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/auth/v1/token")
            .match_query(mockito::Matcher::UrlEncoded(
                "grant_type".into(),
                "refresh_token".into(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"access_token":"new-access","refresh_token":"new-refresh","expires_in":3600}"#,
            )
            .create_async()
            .await;

        let client = AuthClient::new(server.url(), "test-key".to_string());
        let pair = client.refresh("old-refresh").await.expect("refresh failed");

        assert_eq!(pair.access_token, "new-access");
        assert_eq!(pair.refresh_token, "new-refresh");
        assert_eq!(pair.expires_in, 3600);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_refresh_rejected() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/auth/v1/token")
            .match_query(mockito::Matcher::Any)
            .with_status(401)
            .with_body(r#"{"error":"invalid_grant"}"#)
            .create_async()
            .await;

        let client = AuthClient::new(server.url(), "test-key".to_string());
        let result = client.refresh("revoked-token").await;
        assert!(matches!(result, Err(AuthClientError::Rejected(401))));
    }
}
