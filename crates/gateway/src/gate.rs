//! Per-route-class authorization gates
//!
//! Each route class (platform, tenant admin, public storefront) has its own
//! small state machine ending in one of the terminal states below. Gates
//! decide admission only; roles and permissions on a membership row are
//! consumed by downstream handlers.

use aluro_shared::{Tenant, TenantUser};
use axum::http::StatusCode;
use sqlx::PgPool;

use crate::auth::SessionUser;

/// Path users are sent to when they must sign in
pub const LOGIN_PATH: &str = "/login";
/// Path for authenticated users who are not the platform operator
pub const PLATFORM_UNAUTHORIZED_PATH: &str = "/unauthorized";
/// Path for authenticated users without staff access to a store
pub const ADMIN_UNAUTHORIZED_PATH: &str = "/admin-unauthorized";
/// Path on the main domain for hosts that resolve to no store
pub const TENANT_NOT_FOUND_PATH: &str = "/tenant-not-found";

/// Prefix of routes reserved for platform operators (main domain only)
pub const PLATFORM_PREFIX: &str = "/platform";
/// Prefix of store-management routes on a tenant's domain
pub const ADMIN_PREFIX: &str = "/admin";

/// Storefront paths that require a signed-in customer
const PROTECTED_STOREFRONT_PREFIXES: &[&str] = &["/account"];

/// Terminal state of an authorization gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Admit the request to downstream handlers
    Allow,
    /// Send the client elsewhere; tenant-boundary denials always take this
    /// shape rather than an error status
    Redirect(String),
    /// Refuse with a bare status code
    Fail(StatusCode),
}

/// Gate for platform-operator routes, reachable only on the main domain
pub fn platform_decision(user: Option<&SessionUser>, platform_admin_email: &str) -> GateDecision {
    match user {
        None => GateDecision::Redirect(LOGIN_PATH.to_string()),
        Some(user) if user.email != platform_admin_email => {
            GateDecision::Redirect(PLATFORM_UNAUTHORIZED_PATH.to_string())
        }
        Some(_) => GateDecision::Allow,
    }
}

/// Gate for public storefront routes
///
/// Only the fixed customer-account allowlist is protected; everything else
/// is admitted regardless of authentication.
pub fn storefront_decision(user: Option<&SessionUser>, path: &str) -> GateDecision {
    let protected = PROTECTED_STOREFRONT_PREFIXES
        .iter()
        .any(|prefix| path == *prefix || path.starts_with(&format!("{}/", prefix)));
    if protected && user.is_none() && !path.starts_with(LOGIN_PATH) {
        return GateDecision::Redirect(LOGIN_PATH.to_string());
    }
    GateDecision::Allow
}

/// Gate for store-management routes on a resolved tenant
///
/// The owner bypass runs before any membership lookup: owners are never
/// locked out by a missing or inactive membership row, and the query is
/// skipped entirely.
pub async fn tenant_admin_decision(
    pool: &PgPool,
    tenant: &Tenant,
    user: Option<&SessionUser>,
) -> GateDecision {
    let user = match admin_precheck(user, tenant) {
        PrecheckOutcome::Decided(decision) => return decision,
        PrecheckOutcome::NeedsMembership(user) => user,
    };

    let membership = sqlx::query_as::<_, TenantUser>(
        "SELECT tenant_id, user_id, role, permissions, is_active \
         FROM tenant_users WHERE tenant_id = $1 AND user_id = $2 AND is_active = true",
    )
    .bind(tenant.id.0)
    .bind(user.id)
    .fetch_optional(pool)
    .await;

    membership_decision(membership)
}

/// Outcome of the pre-lookup part of the admin gate
enum PrecheckOutcome<'a> {
    Decided(GateDecision),
    NeedsMembership(&'a SessionUser),
}

fn admin_precheck<'a>(user: Option<&'a SessionUser>, tenant: &Tenant) -> PrecheckOutcome<'a> {
    match user {
        None => PrecheckOutcome::Decided(GateDecision::Redirect(LOGIN_PATH.to_string())),
        Some(user) if user.id == tenant.owner_id.0 => {
            PrecheckOutcome::Decided(GateDecision::Allow)
        }
        Some(user) => PrecheckOutcome::NeedsMembership(user),
    }
}

/// Turn a membership lookup result into a terminal decision
///
/// Admission control defaults to deny on ambiguity: a lookup failure is
/// treated the same as no active row.
fn membership_decision(membership: Result<Option<TenantUser>, sqlx::Error>) -> GateDecision {
    match membership {
        Ok(Some(_)) => GateDecision::Allow,
        Ok(None) => GateDecision::Redirect(ADMIN_UNAUTHORIZED_PATH.to_string()),
        Err(err) => {
            tracing::warn!(error = %err, "membership lookup failed, denying admin access");
            GateDecision::Redirect(ADMIN_UNAUTHORIZED_PATH.to_string())
        }
    }
}

/// Whether a path belongs to the store-management route class
pub fn is_admin_path(path: &str) -> bool {
    path == ADMIN_PREFIX || path.starts_with(&format!("{}/", ADMIN_PREFIX))
}

/// Whether a path belongs to the platform-operator route class
pub fn is_platform_path(path: &str) -> bool {
    path == PLATFORM_PREFIX || path.starts_with(&format!("{}/", PLATFORM_PREFIX))
}
