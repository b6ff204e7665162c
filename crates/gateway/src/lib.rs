//! Aluro Gateway Library
//!
//! This crate contains the request-admission layer for the Aluro storefront
//! platform: hostname classification, tenant resolution, session handling,
//! per-route-class authorization, and response context annotation.

pub mod admission;
pub mod auth;
pub mod config;
pub mod context;
pub mod error;
pub mod gate;
pub mod locale;
pub mod routes;
pub mod routing;
pub mod state;

pub use config::Config;
pub use error::GatewayError;
pub use routing::{HostClassifier, ResolvedTenant, RouteClassification, TenantResolver};
pub use state::AppState;
