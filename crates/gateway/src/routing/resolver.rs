//! Tenant resolution
//!
//! Resolves a classified host to an active tenant with an ordered fallback
//! strategy: subdomain lookup first, then custom-domain lookup on the full
//! hostname. Deployments that predate the JSONB settings column are handled
//! by a reduced-column retry that backfills default languages.

use aluro_shared::{AccessMethod, Tenant, TenantId, TenantSettings, UserId};
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use super::RouteClassification;

const TENANT_COLUMNS: &str = "id, name, subdomain, domain, is_active, owner_id, settings, created_at";
const TENANT_COLUMNS_REDUCED: &str = "id, name, subdomain, domain, is_active, owner_id, created_at";

/// A resolved tenant plus how the host matched it
#[derive(Debug, Clone)]
pub struct ResolvedTenant {
    pub tenant: Tenant,
    pub access_method: AccessMethod,
}

/// Errors that can occur during tenant resolution
#[derive(Debug, thiserror::Error)]
pub enum TenantResolveError {
    /// No active tenant matched the host; handled at the boundary as a
    /// redirect to the tenant-not-found page, not a fatal error
    #[error("No active tenant for: {attempted}")]
    NotFound { attempted: String },

    /// The backing store failed for a reason other than a schema-shape
    /// mismatch; fatal
    #[error("Tenant lookup failed: {0}")]
    Database(String),
}

/// Tenant resolver backed by the platform database
#[derive(Clone)]
pub struct TenantResolver {
    pool: PgPool,
}

impl TenantResolver {
    /// Create a new tenant resolver
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Resolve a classified host to an active tenant
    ///
    /// Strategy, in order:
    /// 1. when the classification carries a subdomain, look up by subdomain;
    /// 2. look up by custom domain using the full (normalized) hostname;
    /// 3. nothing matched -> `NotFound` carrying the attempted name.
    ///
    /// Each lookup retries at most once with a reduced column set when the
    /// deployment's schema lacks the settings column; there are no other
    /// retries.
    pub async fn resolve(
        &self,
        classification: &RouteClassification,
        host: &str,
    ) -> Result<ResolvedTenant, TenantResolveError> {
        if let Some(subdomain) = classification.subdomain() {
            if let Some(tenant) = self
                .find_by_subdomain(subdomain)
                .await
                .map_err(|e| TenantResolveError::Database(e.to_string()))?
            {
                tracing::debug!(tenant = %tenant.id, subdomain, "resolved tenant by subdomain");
                return Ok(ResolvedTenant {
                    tenant,
                    access_method: AccessMethod::Subdomain,
                });
            }
        }

        if let Some(tenant) = self
            .find_by_domain(host)
            .await
            .map_err(|e| TenantResolveError::Database(e.to_string()))?
        {
            tracing::debug!(tenant = %tenant.id, host, "resolved tenant by custom domain");
            return Ok(ResolvedTenant {
                tenant,
                access_method: AccessMethod::CustomDomain,
            });
        }

        let attempted = classification
            .subdomain()
            .unwrap_or(host)
            .to_string();
        tracing::warn!(%attempted, "no active tenant matched host");
        Err(TenantResolveError::NotFound { attempted })
    }

    /// Look up an active tenant by its platform subdomain
    async fn find_by_subdomain(&self, subdomain: &str) -> Result<Option<Tenant>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM tenants WHERE subdomain = $1 AND is_active = true",
            TENANT_COLUMNS
        );
        match sqlx::query_as::<_, TenantRow>(&query)
            .bind(subdomain)
            .fetch_optional(&self.pool)
            .await
        {
            Ok(row) => Ok(row.map(Tenant::from)),
            Err(err) if is_schema_mismatch(&err) => {
                tracing::warn!(subdomain, "settings column absent, retrying with reduced column set");
                let query = format!(
                    "SELECT {} FROM tenants WHERE subdomain = $1 AND is_active = true",
                    TENANT_COLUMNS_REDUCED
                );
                let row = sqlx::query_as::<_, ReducedTenantRow>(&query)
                    .bind(subdomain)
                    .fetch_optional(&self.pool)
                    .await?;
                Ok(row.map(Tenant::from))
            }
            Err(err) => Err(err),
        }
    }

    /// Look up an active tenant by its custom domain
    async fn find_by_domain(&self, domain: &str) -> Result<Option<Tenant>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM tenants WHERE domain = $1 AND is_active = true",
            TENANT_COLUMNS
        );
        match sqlx::query_as::<_, TenantRow>(&query)
            .bind(domain)
            .fetch_optional(&self.pool)
            .await
        {
            Ok(row) => Ok(row.map(Tenant::from)),
            Err(err) if is_schema_mismatch(&err) => {
                tracing::warn!(domain, "settings column absent, retrying with reduced column set");
                let query = format!(
                    "SELECT {} FROM tenants WHERE domain = $1 AND is_active = true",
                    TENANT_COLUMNS_REDUCED
                );
                let row = sqlx::query_as::<_, ReducedTenantRow>(&query)
                    .bind(domain)
                    .fetch_optional(&self.pool)
                    .await?;
                Ok(row.map(Tenant::from))
            }
            Err(err) => Err(err),
        }
    }
}

#[derive(sqlx::FromRow)]
struct TenantRow {
    id: Uuid,
    name: String,
    subdomain: String,
    domain: Option<String>,
    is_active: bool,
    owner_id: Uuid,
    settings: sqlx::types::Json<TenantSettings>,
    created_at: OffsetDateTime,
}

impl From<TenantRow> for Tenant {
    fn from(row: TenantRow) -> Self {
        Tenant {
            id: TenantId(row.id),
            name: row.name,
            subdomain: row.subdomain,
            domain: row.domain,
            is_active: row.is_active,
            owner_id: UserId(row.owner_id),
            settings: row.settings.0,
            created_at: row.created_at,
        }
    }
}

/// Row shape for deployments whose schema predates the settings column;
/// languages are backfilled with defaults
#[derive(sqlx::FromRow)]
struct ReducedTenantRow {
    id: Uuid,
    name: String,
    subdomain: String,
    domain: Option<String>,
    is_active: bool,
    owner_id: Uuid,
    created_at: OffsetDateTime,
}

impl From<ReducedTenantRow> for Tenant {
    fn from(row: ReducedTenantRow) -> Self {
        Tenant {
            id: TenantId(row.id),
            name: row.name,
            subdomain: row.subdomain,
            domain: row.domain,
            is_active: row.is_active,
            owner_id: UserId(row.owner_id),
            settings: TenantSettings::default(),
            created_at: row.created_at,
        }
    }
}

/// Structured check for a missing-column failure: sqlx's decode-time
/// `ColumnNotFound` or PostgreSQL's `undefined_column` SQLSTATE. Message
/// text is never inspected.
fn is_schema_mismatch(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::ColumnNotFound(_) => true,
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some("42703"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_mismatch_on_missing_column() {
        let err = sqlx::Error::ColumnNotFound("settings".to_string());
        assert!(is_schema_mismatch(&err));
    }

    #[test]
    fn test_schema_mismatch_ignores_other_errors() {
        assert!(!is_schema_mismatch(&sqlx::Error::RowNotFound));
        assert!(!is_schema_mismatch(&sqlx::Error::PoolTimedOut));
    }

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_resolve_by_subdomain() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = aluro_shared::db::create_pool(&url).await.expect("pool");
        let resolver = TenantResolver::new(pool);

        let classification = RouteClassification::TenantSubdomain("shop1".to_string());
        let resolved = resolver
            .resolve(&classification, "shop1.aluro.shop")
            .await
            .expect("tenant");
        assert_eq!(resolved.access_method, AccessMethod::Subdomain);
        assert_eq!(resolved.tenant.subdomain, "shop1");
    }

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_resolve_unknown_host_not_found() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = aluro_shared::db::create_pool(&url).await.expect("pool");
        let resolver = TenantResolver::new(pool);

        let classification = RouteClassification::TenantSubdomain("unknown".to_string());
        let result = resolver.resolve(&classification, "unknown.aluro.shop").await;
        assert!(matches!(
            result,
            Err(TenantResolveError::NotFound { attempted }) if attempted == "unknown"
        ));
    }
}
