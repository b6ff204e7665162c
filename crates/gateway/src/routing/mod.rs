//! Host-based routing for the storefront gateway
//!
//! This module classifies incoming Host headers and resolves them to
//! tenants, enabling store-specific URLs like:
//! - Platform subdomains: shop1.aluro.shop
//! - Custom domains: mystore.com
//! - Local development: shop1.localhost:3000

mod classifier;
mod resolver;

pub use classifier::{HostClassifier, RouteClassification};
pub use resolver::{ResolvedTenant, TenantResolveError, TenantResolver};
