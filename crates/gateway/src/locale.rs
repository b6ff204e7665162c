//! Locale resolution
//!
//! Picks the language to expose for a request from the tenant's settings:
//! store-management paths use the admin language, everything else the
//! storefront language.

use aluro_shared::TenantSettings;

use crate::gate::is_admin_path;

/// Resolve the locale to expose for a request path
pub fn resolve_locale<'a>(settings: &'a TenantSettings, path: &str) -> &'a str {
    if is_admin_path(path) {
        &settings.admin_language
    } else {
        &settings.store_language
    }
}
