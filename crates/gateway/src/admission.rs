//! Request admission middleware
//!
//! Runs on every request except a configurable exclusion set: classifies the
//! host, resolves the tenant, applies the route-class authorization gate,
//! and annotates the admitted response with the resolved context. Session
//! cookies are read once per request and mirrored onto the response at a
//! single exit point, whatever branch produced it.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use url::Url;

use crate::auth::SessionContext;
use crate::context::RequestContext;
use crate::error::GatewayError;
use crate::gate::{
    is_admin_path, is_platform_path, platform_decision, storefront_decision,
    tenant_admin_decision, GateDecision, TENANT_NOT_FOUND_PATH,
};
use crate::locale::resolve_locale;
use crate::routing::{RouteClassification, TenantResolveError};
use crate::state::AppState;

/// Asset suffixes that bypass admission entirely
const EXCLUDED_EXTENSIONS: &[&str] = &[
    ".png", ".jpg", ".jpeg", ".gif", ".svg", ".webp", ".ico", ".css", ".js",
];

/// Admission middleware entry point
pub async fn admit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();

    // Static assets and other excluded paths skip resolution entirely
    if is_excluded(&path, &state.config.excluded_path_prefixes) {
        return next.run(request).await;
    }

    let host = request
        .headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default()
        .to_string();

    // Break referer redirect cycles before doing any work: when the referer
    // is this exact host and path, return the response unchanged
    let referer = request
        .headers()
        .get(header::REFERER)
        .and_then(|h| h.to_str().ok());
    if should_short_circuit(&host, &path, referer) {
        tracing::debug!(%host, %path, "redirect loop detected, passing through");
        return next.run(request).await;
    }

    // Deprecated category paths redirect to the canonical listing shape
    if let Some(target) = legacy_rewrite(&path) {
        tracing::debug!(%path, %target, "rewriting legacy category path");
        return Redirect::temporary(&target).into_response();
    }

    let classification = state.classifier.classify(&host);
    tracing::debug!(%host, ?classification, "classified request host");

    // Session cookies are read once here; `apply` below is the single place
    // any queued cookie mutation reaches the response, so every branch of
    // `dispatch` keeps session persistence intact
    let session = SessionContext::from_request(request.headers(), &state.jwt, &state.auth).await;
    let response = dispatch(&state, &classification, &host, &path, &session, request, next).await;
    session.apply(response)
}

async fn dispatch(
    state: &AppState,
    classification: &RouteClassification,
    host: &str,
    path: &str,
    session: &SessionContext,
    request: Request,
    next: Next,
) -> Response {
    // Main domain: only platform-operator routes are gated
    if classification.is_main_domain() {
        if is_platform_path(path) {
            let decision = platform_decision(session.user(), &state.config.platform_admin_email);
            tracing::debug!(?decision, "platform gate decision");
            match decision {
                GateDecision::Allow => {}
                other => return terminal_response(other),
            }
        }
        return next.run(request).await;
    }

    // Tenant-facing host: resolve, gate, annotate
    let resolved = match state.resolver.resolve(classification, host).await {
        Ok(resolved) => resolved,
        Err(TenantResolveError::NotFound { attempted }) => {
            return tenant_not_found_redirect(&state.config.production_domain, &attempted);
        }
        Err(TenantResolveError::Database(detail)) => {
            tracing::error!(error = %detail, "tenant lookup failed");
            return GatewayError::TenantLookup(detail)
                .into_response_with(state.config.expose_backend_errors);
        }
    };

    let decision = if is_admin_path(path) {
        tenant_admin_decision(&state.pool, &resolved.tenant, session.user()).await
    } else {
        storefront_decision(session.user(), path)
    };
    tracing::debug!(tenant = %resolved.tenant.id, ?decision, "gate decision");
    match decision {
        GateDecision::Allow => {}
        other => return terminal_response(other),
    }

    let locale = resolve_locale(&resolved.tenant.settings, path).to_string();
    let context = RequestContext::new(&resolved, locale);

    let mut response = next.run(request).await;
    context.apply(response.headers_mut());
    response
}

/// Render a non-Allow gate decision
fn terminal_response(decision: GateDecision) -> Response {
    match decision {
        GateDecision::Allow => StatusCode::OK.into_response(),
        GateDecision::Redirect(target) => Redirect::temporary(&target).into_response(),
        GateDecision::Fail(status) => {
            let reason = status.canonical_reason().unwrap_or("request refused");
            (status, reason.to_string()).into_response()
        }
    }
}

/// Redirect to the tenant-not-found page on the main domain, carrying the
/// attempted name as a query parameter
fn tenant_not_found_redirect(production_domain: &str, attempted: &str) -> Response {
    let target = format!(
        "https://{}{}?subdomain={}",
        production_domain, TENANT_NOT_FOUND_PATH, attempted
    );
    Redirect::temporary(&target).into_response()
}

/// Whether admission skips this path entirely
fn is_excluded(path: &str, prefixes: &[String]) -> bool {
    prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
        || EXCLUDED_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// Redirect-loop circuit breaker
///
/// True only when the referer's host and path both equal the current
/// request's. This is a defensive single-hop check, not a general loop
/// detector.
pub fn should_short_circuit(current_host: &str, current_path: &str, referer: Option<&str>) -> bool {
    let Some(referer) = referer else {
        return false;
    };
    let Ok(referer) = Url::parse(referer) else {
        return false;
    };
    let Some(referer_host) = referer.host_str() else {
        return false;
    };
    let referer_host = match referer.port() {
        Some(port) => format!("{}:{}", referer_host, port),
        None => referer_host.to_string(),
    };
    referer_host.eq_ignore_ascii_case(current_host) && referer.path() == current_path
}

/// Rewrite a deprecated category path into the canonical listing shape
///
/// Clients are redirected (not internally forwarded) so the address bar
/// reflects the canonical form.
pub fn legacy_rewrite(path: &str) -> Option<String> {
    let slug = path.strip_prefix("/products/category/")?;
    if slug.is_empty() || slug.contains('/') {
        return None;
    }
    Some(format!("/products?category={}", slug))
}
