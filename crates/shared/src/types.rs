//! Common types used across Aluro

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

// =============================================================================
// ID Wrappers
// =============================================================================

/// Tenant (store) ID wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(pub Uuid);

impl TenantId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TenantId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for TenantId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for TenantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// User ID wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for UserId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// =============================================================================
// Enums
// =============================================================================

/// How a request reached a tenant: via its subdomain on the platform domain,
/// or via a custom domain mapped to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessMethod {
    Subdomain,
    CustomDomain,
}

impl AccessMethod {
    /// Stable wire value, used in the `x-access-method` response header
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Subdomain => "subdomain",
            Self::CustomDomain => "custom-domain",
        }
    }
}

impl std::fmt::Display for AccessMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AccessMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "subdomain" => Ok(Self::Subdomain),
            "custom-domain" => Ok(Self::CustomDomain),
            _ => Err(format!("Invalid access method: {}", s)),
        }
    }
}

// =============================================================================
// Database Models
// =============================================================================

/// Default language used when a store has no explicit language settings
pub const DEFAULT_LANGUAGE: &str = "en";

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

/// Per-tenant settings, stored as a JSONB map on the tenants table.
/// Older deployments predate the column; the gateway backfills defaults
/// when it is absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantSettings {
    #[serde(default = "default_language")]
    pub admin_language: String,
    #[serde(default = "default_language")]
    pub store_language: String,
}

impl Default for TenantSettings {
    fn default() -> Self {
        Self {
            admin_language: default_language(),
            store_language: default_language(),
        }
    }
}

/// Tenant (store) model
///
/// A tenant is addressable by its subdomain on the platform domain and,
/// optionally, by a custom domain mapped to it. Both may be configured at
/// once, but a single request always matches exactly one of the two.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    pub name: String,
    pub subdomain: String,
    pub domain: Option<String>,
    pub is_active: bool,
    pub owner_id: UserId,
    pub settings: TenantSettings,
    pub created_at: OffsetDateTime,
}

/// Tenant staff membership record
///
/// Absence of an active row for a (tenant, user) pair means no admin access
/// unless the user is the tenant's owner.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TenantUser {
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub role: String,
    pub permissions: serde_json::Value,
    pub is_active: bool,
}
