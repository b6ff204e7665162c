//! Host header classification
//!
//! Maps an incoming Host header to a routing classification before any
//! tenant lookup happens. Classification is pure and never fails; host
//! shapes the classifier doesn't recognize degrade to a custom-domain
//! candidate so resolution still gets a chance to match.

/// Routing classification for an incoming request host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteClassification {
    /// The platform's own root domain (or www), used for platform
    /// administration and tenant signup
    MainDomain,
    /// A tenant subdomain on the production domain or the localhost dev
    /// convention, carrying the subdomain label
    TenantSubdomain(String),
    /// A deploy-preview host; `None` is the preview root (acts as the main
    /// domain), `Some` carries a tenant subdomain label
    PlatformPreview(Option<String>),
    /// Anything else; the full host is a candidate custom tenant domain
    CustomDomainCandidate(String),
}

impl RouteClassification {
    /// The tenant subdomain this classification carries, if any
    pub fn subdomain(&self) -> Option<&str> {
        match self {
            Self::TenantSubdomain(label) => Some(label),
            Self::PlatformPreview(Some(label)) => Some(label),
            _ => None,
        }
    }

    /// Whether this request targets the platform's own domain rather than a
    /// tenant storefront (the preview root behaves like the main domain)
    pub fn is_main_domain(&self) -> bool {
        matches!(self, Self::MainDomain | Self::PlatformPreview(None))
    }
}

/// Stateless host classifier configured with the platform's domains
#[derive(Debug, Clone)]
pub struct HostClassifier {
    production_domain: String,
    preview_suffix: String,
    dev_host: String,
}

impl HostClassifier {
    /// Create a new classifier
    pub fn new(production_domain: &str, preview_suffix: &str, dev_host: &str) -> Self {
        Self {
            production_domain: production_domain.to_lowercase(),
            preview_suffix: preview_suffix.to_lowercase(),
            dev_host: dev_host.to_lowercase(),
        }
    }

    /// Classify a raw Host header value
    pub fn classify(&self, host_header: &str) -> RouteClassification {
        let host = normalize_host(host_header);

        // Bare production domain (or www) is the platform itself
        if host == self.production_domain || host == format!("www.{}", self.production_domain) {
            return RouteClassification::MainDomain;
        }

        // Subdomain of the production domain
        let production_suffix = format!(".{}", self.production_domain);
        if host.ends_with(&production_suffix) {
            let labels: Vec<&str> = host.split('.').collect();
            if labels.len() >= 3 {
                return RouteClassification::TenantSubdomain(labels[0].to_string());
            }
            return RouteClassification::CustomDomainCandidate(host);
        }

        // Deploy-preview hosts: the preview root has three labels
        // (project.vercel.app); a fourth leading label is a tenant subdomain
        let preview_suffix = format!(".{}", self.preview_suffix);
        if host.ends_with(&preview_suffix) {
            let labels: Vec<&str> = host.split('.').collect();
            if labels.len() >= 4 {
                return RouteClassification::PlatformPreview(Some(labels[0].to_string()));
            }
            return RouteClassification::PlatformPreview(None);
        }

        // Localhost dev convention: bare host is the platform,
        // label.localhost is a tenant subdomain
        if host == self.dev_host {
            return RouteClassification::MainDomain;
        }
        let dev_suffix = format!(".{}", self.dev_host);
        if host.ends_with(&dev_suffix) {
            let labels: Vec<&str> = host.split('.').collect();
            if labels.len() >= 2 {
                return RouteClassification::TenantSubdomain(labels[0].to_string());
            }
        }

        RouteClassification::CustomDomainCandidate(host)
    }
}

/// Normalize a host header value: strip any port suffix and lowercase
pub fn normalize_host(host: &str) -> String {
    let host = host.split(':').next().unwrap_or(host);
    host.to_lowercase()
}
