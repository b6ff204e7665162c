//! Resolved request context and response annotation
//!
//! Once a tenant is resolved and admitted, the gateway attaches the context
//! to the outbound response as a fixed set of headers. This is the only
//! channel downstream handlers learn the resolved tenant from; they must
//! not re-derive it from the hostname.

use aluro_shared::{AccessMethod, TenantId};
use axum::http::{HeaderMap, HeaderValue};

use crate::routing::ResolvedTenant;

pub const TENANT_ID_HEADER: &str = "x-tenant-id";
pub const TENANT_SUBDOMAIN_HEADER: &str = "x-tenant-subdomain";
pub const TENANT_NAME_HEADER: &str = "x-tenant-name";
pub const TENANT_DOMAIN_HEADER: &str = "x-tenant-domain";
pub const ACCESS_METHOD_HEADER: &str = "x-access-method";
pub const LOCALE_HEADER: &str = "x-locale";

/// Context resolved for an admitted tenant request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub tenant_id: TenantId,
    pub tenant_subdomain: String,
    pub tenant_name: String,
    pub tenant_domain: Option<String>,
    pub access_method: AccessMethod,
    pub locale: String,
}

impl RequestContext {
    /// Build the context from a resolved tenant and its resolved locale
    pub fn new(resolved: &ResolvedTenant, locale: String) -> Self {
        Self {
            tenant_id: resolved.tenant.id,
            tenant_subdomain: resolved.tenant.subdomain.clone(),
            tenant_name: resolved.tenant.name.clone(),
            tenant_domain: resolved.tenant.domain.clone(),
            access_method: resolved.access_method,
            locale,
        }
    }

    /// Write the context onto the outbound headers
    ///
    /// The domain header is present only when the tenant has a custom domain
    /// configured. Values that cannot be represented as header values are
    /// skipped rather than failing the response.
    pub fn apply(&self, headers: &mut HeaderMap) {
        set(headers, TENANT_ID_HEADER, &self.tenant_id.to_string());
        set(headers, TENANT_SUBDOMAIN_HEADER, &self.tenant_subdomain);
        set(headers, TENANT_NAME_HEADER, &self.tenant_name);
        if let Some(domain) = &self.tenant_domain {
            set(headers, TENANT_DOMAIN_HEADER, domain);
        }
        set(headers, ACCESS_METHOD_HEADER, self.access_method.as_str());
        set(headers, LOCALE_HEADER, &self.locale);
    }
}

fn set(headers: &mut HeaderMap, name: &'static str, value: &str) {
    if let Ok(value) = HeaderValue::from_str(value) {
        headers.insert(name, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aluro_shared::{Tenant, TenantSettings, UserId};
    use time::OffsetDateTime;

    fn resolved(domain: Option<&str>, access_method: AccessMethod) -> ResolvedTenant {
        ResolvedTenant {
            tenant: Tenant {
                id: TenantId::new(),
                name: "Shop One".to_string(),
                subdomain: "shop1".to_string(),
                domain: domain.map(str::to_string),
                is_active: true,
                owner_id: UserId::new(),
                settings: TenantSettings::default(),
                created_at: OffsetDateTime::now_utc(),
            },
            access_method,
        }
    }

    #[test]
    fn test_headers_for_subdomain_access() {
        let resolved = resolved(None, AccessMethod::Subdomain);
        let context = RequestContext::new(&resolved, "en".to_string());

        let mut headers = HeaderMap::new();
        context.apply(&mut headers);

        assert_eq!(
            headers.get(TENANT_ID_HEADER).unwrap(),
            &resolved.tenant.id.to_string()
        );
        assert_eq!(headers.get(TENANT_SUBDOMAIN_HEADER).unwrap(), "shop1");
        assert_eq!(headers.get(TENANT_NAME_HEADER).unwrap(), "Shop One");
        assert_eq!(headers.get(ACCESS_METHOD_HEADER).unwrap(), "subdomain");
        assert_eq!(headers.get(LOCALE_HEADER).unwrap(), "en");
        // No custom domain configured, so the header is absent
        assert!(headers.get(TENANT_DOMAIN_HEADER).is_none());
    }

    #[test]
    fn test_headers_for_custom_domain_access() {
        let resolved = resolved(Some("mystore.com"), AccessMethod::CustomDomain);
        let context = RequestContext::new(&resolved, "de".to_string());

        let mut headers = HeaderMap::new();
        context.apply(&mut headers);

        assert_eq!(headers.get(TENANT_DOMAIN_HEADER).unwrap(), "mystore.com");
        assert_eq!(headers.get(ACCESS_METHOD_HEADER).unwrap(), "custom-domain");
        assert_eq!(headers.get(LOCALE_HEADER).unwrap(), "de");
    }

    #[test]
    fn test_apply_is_idempotent() {
        let resolved = resolved(Some("mystore.com"), AccessMethod::CustomDomain);
        let context = RequestContext::new(&resolved, "en".to_string());

        let mut once = HeaderMap::new();
        context.apply(&mut once);
        let mut twice = HeaderMap::new();
        context.apply(&mut twice);
        context.apply(&mut twice);

        assert_eq!(once, twice);
    }
}
