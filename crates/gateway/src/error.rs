//! Gateway error types and handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Fatal gateway errors
///
/// Tenant-boundary outcomes (not found, unauthenticated, unauthorized) are
/// resolved inside the admission flow as redirects and never appear here.
/// Only configuration and backing-store failures produce a fatal response.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Missing required configuration: {0}")]
    Config(&'static str),

    #[error("Tenant lookup failed: {0}")]
    TenantLookup(String),
}

impl GatewayError {
    /// Render as a minimal plain-text response.
    ///
    /// Backing-store error detail is included only when `expose_detail` is
    /// set (EXPOSE_BACKEND_ERRORS); otherwise the body stays generic and the
    /// detail goes to the log.
    pub fn into_response_with(self, expose_detail: bool) -> Response {
        let body = match &self {
            GatewayError::Config(name) => format!("configuration error: {} is not set", name),
            GatewayError::TenantLookup(detail) if expose_detail => {
                format!("tenant lookup failed: {}", detail)
            }
            GatewayError::TenantLookup(_) => "tenant lookup failed".to_string(),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        self.into_response_with(false)
    }
}
