//! Shared application state

use sqlx::PgPool;
use std::sync::Arc;

use crate::auth::{AuthClient, SessionJwt};
use crate::config::Config;
use crate::routing::{HostClassifier, TenantResolver};

/// Application state shared across requests
///
/// Everything here is immutable after startup; per-request state lives on
/// the request itself.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pool: PgPool,
    pub classifier: Arc<HostClassifier>,
    pub resolver: TenantResolver,
    pub jwt: Arc<SessionJwt>,
    pub auth: AuthClient,
}

impl AppState {
    /// Build the application state from loaded configuration
    pub fn new(config: Config, pool: PgPool) -> Self {
        let classifier = Arc::new(HostClassifier::new(
            &config.production_domain,
            &config.preview_suffix,
            &config.dev_host,
        ));
        let resolver = TenantResolver::new(pool.clone());
        let jwt = Arc::new(SessionJwt::new(&config.session_jwt_secret));
        let auth = AuthClient::new(config.auth_url.clone(), config.auth_api_key.clone());

        Self {
            config: Arc::new(config),
            pool,
            classifier,
            resolver,
            jwt,
            auth,
        }
    }
}
