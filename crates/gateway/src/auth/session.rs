//! Request session context
//!
//! Reads the auth cookies from the incoming request, validates or refreshes
//! the session, and queues any resulting cookie mutations. The queued
//! cookies are mirrored onto the outbound response by [`SessionContext::apply`],
//! which the admission middleware calls at its single exit point so the
//! mutation survives every branch: errors, redirects, and the happy path.

use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::Response;
use cookie::time::Duration;
use cookie::{Cookie, SameSite};
use uuid::Uuid;

use super::client::{AuthClient, AuthClientError};
use super::jwt::{SessionClaims, SessionJwt, SessionJwtError};

/// Cookie carrying the auth-service access token
pub const ACCESS_TOKEN_COOKIE: &str = "aluro-access-token";
/// Cookie carrying the auth-service refresh token
pub const REFRESH_TOKEN_COOKIE: &str = "aluro-refresh-token";

/// Refresh tokens are long-lived; the cookie matches
const REFRESH_COOKIE_MAX_AGE_DAYS: i64 = 30;

/// The authenticated user carried by a session, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
}

/// Per-request session state plus queued cookie mutations
#[derive(Debug, Default)]
pub struct SessionContext {
    user: Option<SessionUser>,
    pending: Vec<Cookie<'static>>,
}

impl SessionContext {
    /// An unauthenticated session with no cookie changes
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Build the session context from the request's cookies
    ///
    /// Never fails: an invalid or unrefreshable session degrades to an
    /// anonymous one. An expired access token with a refresh token present
    /// triggers a refresh against the auth service, and the fresh pair is
    /// queued for the response.
    pub async fn from_request(headers: &HeaderMap, jwt: &SessionJwt, auth: &AuthClient) -> Self {
        let access = read_cookie(headers, ACCESS_TOKEN_COOKIE);
        let refresh = read_cookie(headers, REFRESH_TOKEN_COOKIE);

        if let Some(token) = access.as_deref() {
            match jwt.validate(token) {
                Ok(claims) => {
                    return Self {
                        user: user_from_claims(&claims),
                        pending: Vec::new(),
                    };
                }
                Err(SessionJwtError::Expired) => {} // fall through to refresh
                Err(err) => {
                    tracing::debug!(error = %err, "rejecting invalid access token");
                    return Self::cleared();
                }
            }
        }

        let Some(refresh_token) = refresh else {
            return Self::anonymous();
        };

        match auth.refresh(&refresh_token).await {
            Ok(pair) => {
                let user = jwt
                    .validate(&pair.access_token)
                    .ok()
                    .and_then(|claims| user_from_claims(&claims));
                let pending = vec![
                    auth_cookie(ACCESS_TOKEN_COOKIE, pair.access_token, Duration::seconds(pair.expires_in)),
                    auth_cookie(
                        REFRESH_TOKEN_COOKIE,
                        pair.refresh_token,
                        Duration::days(REFRESH_COOKIE_MAX_AGE_DAYS),
                    ),
                ];
                tracing::debug!("session refreshed");
                Self { user, pending }
            }
            Err(AuthClientError::Rejected(status)) => {
                tracing::debug!(status, "refresh token rejected, clearing session cookies");
                Self::cleared()
            }
            Err(err) => {
                // Transport failure or no auth service configured: leave the
                // cookies alone and treat the request as unauthenticated
                tracing::warn!(error = %err, "session refresh unavailable");
                Self::anonymous()
            }
        }
    }

    /// An unauthenticated session that also expires both auth cookies
    fn cleared() -> Self {
        Self {
            user: None,
            pending: vec![
                removal_cookie(ACCESS_TOKEN_COOKIE),
                removal_cookie(REFRESH_TOKEN_COOKIE),
            ],
        }
    }

    /// The authenticated user, if any
    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    /// Whether any cookie mutation is queued for the response
    pub fn has_pending_cookies(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Mirror the queued cookie mutations onto the outbound response
    pub fn apply(&self, mut response: Response) -> Response {
        for cookie in &self.pending {
            if let Ok(value) = HeaderValue::from_str(&cookie.to_string()) {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
        }
        response
    }
}

fn user_from_claims(claims: &SessionClaims) -> Option<SessionUser> {
    let id = Uuid::parse_str(&claims.sub).ok()?;
    Some(SessionUser {
        id,
        email: claims.email.clone().unwrap_or_default(),
    })
}

/// Find a cookie by name in the request's Cookie header
fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let header = headers.get(header::COOKIE)?.to_str().ok()?;
    header.split(';').find_map(|raw| {
        let cookie = Cookie::parse(raw.trim()).ok()?;
        if cookie.name() == name {
            Some(cookie.value().to_owned())
        } else {
            None
        }
    })
}

fn auth_cookie(name: &'static str, value: String, max_age: Duration) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .max_age(max_age)
        .build()
}

fn removal_cookie(name: &'static str) -> Cookie<'static> {
    let mut cookie = Cookie::build((name, "")).path("/").build();
    cookie.make_removal();
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
    use time::OffsetDateTime;

    const SECRET: &str = "test-session-secret-at-least-32-characters";

    fn make_token(sub: Uuid, email: &str, exp_offset: i64) -> String {
        let claims = SessionClaims {
            sub: sub.to_string(),
            email: Some(email.to_string()),
            exp: OffsetDateTime::now_utc().unix_timestamp() + exp_offset,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .expect("Failed to encode token")
    }

    fn request_headers(cookies: &[(&str, &str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if !cookies.is_empty() {
            let value = cookies
                .iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect::<Vec<_>>()
                .join("; ");
            headers.insert(header::COOKIE, HeaderValue::from_str(&value).unwrap());
        }
        headers
    }

    fn set_cookie_values(response: &Response) -> Vec<String> {
        response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_no_cookies_is_anonymous() {
        let jwt = SessionJwt::new(SECRET);
        let auth = AuthClient::new(String::new(), String::new());
        let headers = request_headers(&[]);

        let session = SessionContext::from_request(&headers, &jwt, &auth).await;
        assert!(session.user().is_none());
        assert!(!session.has_pending_cookies());

        let response = session.apply(StatusCode::OK.into_response());
        assert!(set_cookie_values(&response).is_empty());
    }

    #[tokio::test]
    async fn test_valid_access_token_authenticates_without_cookie_changes() {
        let jwt = SessionJwt::new(SECRET);
        let auth = AuthClient::new(String::new(), String::new());
        let user_id = Uuid::new_v4();
        let token = make_token(user_id, "customer@example.com", 3600);
        let headers = request_headers(&[(ACCESS_TOKEN_COOKIE, &token)]);

        let session = SessionContext::from_request(&headers, &jwt, &auth).await;
        let user = session.user().expect("expected authenticated user");
        assert_eq!(user.id, user_id);
        assert_eq!(user.email, "customer@example.com");
        assert!(!session.has_pending_cookies());
    }

    #[tokio::test]
    async fn test_expired_token_without_refresh_is_anonymous() {
        let jwt = SessionJwt::new(SECRET);
        let auth = AuthClient::new(String::new(), String::new());
        let token = make_token(Uuid::new_v4(), "customer@example.com", -3600);
        let headers = request_headers(&[(ACCESS_TOKEN_COOKIE, &token)]);

        let session = SessionContext::from_request(&headers, &jwt, &auth).await;
        assert!(session.user().is_none());
        // No refresh token and no auth service: cookies stay untouched
        assert!(!session.has_pending_cookies());
    }

    #[tokio::test]
    async fn test_refresh_queues_fresh_cookie_pair() {
        let mut server = mockito::Server::new_async().await;
        let user_id = Uuid::new_v4();
        let new_access = make_token(user_id, "customer@example.com", 3600);
        server
            .mock("POST", "/auth/v1/token")
            .match_query(mockito::Matcher::UrlEncoded(
                "grant_type".into(),
                "refresh_token".into(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!(
                r#"{{"access_token":"{}","refresh_token":"next-refresh","expires_in":3600}}"#,
                new_access
            ))
            .create_async()
            .await;

        let jwt = SessionJwt::new(SECRET);
        let auth = AuthClient::new(server.url(), "test-key".to_string());
        let expired = make_token(user_id, "customer@example.com", -3600);
        let headers = request_headers(&[
            (ACCESS_TOKEN_COOKIE, &expired),
            (REFRESH_TOKEN_COOKIE, "old-refresh"),
        ]);

        let session = SessionContext::from_request(&headers, &jwt, &auth).await;
        assert_eq!(session.user().map(|u| u.id), Some(user_id));
        assert!(session.has_pending_cookies());

        // Cookie parity: both fresh tokens appear on the final response
        let response = session.apply(StatusCode::TEMPORARY_REDIRECT.into_response());
        let cookies = set_cookie_values(&response);
        assert_eq!(cookies.len(), 2);
        assert!(cookies.iter().any(|c| {
            c.starts_with(&format!("{}=", ACCESS_TOKEN_COOKIE)) && c.contains("HttpOnly")
        }));
        assert!(cookies
            .iter()
            .any(|c| c.starts_with(&format!("{}=next-refresh", REFRESH_TOKEN_COOKIE))));
    }

    #[tokio::test]
    async fn test_rejected_refresh_clears_cookies() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/auth/v1/token")
            .match_query(mockito::Matcher::Any)
            .with_status(401)
            .with_body(r#"{"error":"invalid_grant"}"#)
            .create_async()
            .await;

        let jwt = SessionJwt::new(SECRET);
        let auth = AuthClient::new(server.url(), "test-key".to_string());
        let headers = request_headers(&[(REFRESH_TOKEN_COOKIE, "revoked")]);

        let session = SessionContext::from_request(&headers, &jwt, &auth).await;
        assert!(session.user().is_none());

        let response = session.apply(StatusCode::OK.into_response());
        let cookies = set_cookie_values(&response);
        assert_eq!(cookies.len(), 2);
        assert!(cookies.iter().all(|c| c.contains("Max-Age=0")));
    }

    #[tokio::test]
    async fn test_invalid_access_token_clears_cookies() {
        let jwt = SessionJwt::new(SECRET);
        let auth = AuthClient::new(String::new(), String::new());
        let headers = request_headers(&[(ACCESS_TOKEN_COOKIE, "tampered")]);

        let session = SessionContext::from_request(&headers, &jwt, &auth).await;
        assert!(session.user().is_none());
        assert!(session.has_pending_cookies());
    }
}
