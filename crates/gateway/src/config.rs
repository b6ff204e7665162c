//! Application configuration

use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub bind_address: String,

    // Domains
    pub production_domain: String, // e.g., "aluro.shop" for *.aluro.shop routing
    pub preview_suffix: String,    // e.g., "vercel.app" for deploy previews
    pub dev_host: String,          // loopback host used by the localhost dev convention

    // Database
    pub database_url: String,

    // Session / external auth collaborator
    pub session_jwt_secret: String,
    pub auth_url: String,
    pub auth_api_key: String,

    // Platform operators
    pub platform_admin_email: String,

    // Admission
    pub excluded_path_prefixes: Vec<String>,
    pub expose_backend_errors: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            // Server
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),

            // Domains
            production_domain: env::var("PRODUCTION_DOMAIN")
                .unwrap_or_else(|_| "aluro.shop".to_string()),
            preview_suffix: env::var("PREVIEW_SUFFIX")
                .unwrap_or_else(|_| "vercel.app".to_string()),
            dev_host: env::var("DEV_HOST").unwrap_or_else(|_| "localhost".to_string()),

            // Database
            database_url: env::var("DATABASE_URL")
                .map_err(|_| ConfigError::Missing("DATABASE_URL"))?,

            // Session / auth collaborator
            session_jwt_secret: {
                let secret = env::var("SESSION_JWT_SECRET")
                    .map_err(|_| ConfigError::Missing("SESSION_JWT_SECRET"))?;
                if secret.len() < 32 {
                    return Err(ConfigError::WeakSecret(
                        "SESSION_JWT_SECRET must be at least 32 characters",
                    ));
                }
                secret
            },
            auth_url: env::var("AUTH_URL").unwrap_or_default(),
            auth_api_key: env::var("AUTH_API_KEY").unwrap_or_default(),

            // Platform operators
            platform_admin_email: env::var("PLATFORM_ADMIN_EMAIL")
                .map_err(|_| ConfigError::Missing("PLATFORM_ADMIN_EMAIL"))?,

            // Admission
            excluded_path_prefixes: env::var("EXCLUDED_PATH_PREFIXES")
                .map(|raw| {
                    raw.split(',')
                        .map(|p| p.trim().to_string())
                        .filter(|p| !p.is_empty())
                        .collect()
                })
                .unwrap_or_else(|_| default_excluded_prefixes()),
            expose_backend_errors: env::var("EXPOSE_BACKEND_ERRORS")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
        })
    }
}

fn default_excluded_prefixes() -> Vec<String> {
    vec![
        "/static/".to_string(),
        "/assets/".to_string(),
        "/favicon.ico".to_string(),
    ]
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("Weak secret: {0}")]
    WeakSecret(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    /// Helper to set required env vars for testing
    fn setup_minimal_config() {
        env::set_var("DATABASE_URL", "postgres://test");
        // Must be at least 32 characters for the weak-secret validation
        env::set_var(
            "SESSION_JWT_SECRET",
            "test-session-secret-at-least-32-characters",
        );
        env::set_var("PLATFORM_ADMIN_EMAIL", "ops@aluro.shop");
    }

    /// Helper to clear env vars after tests
    fn cleanup_config() {
        env::remove_var("DATABASE_URL");
        env::remove_var("SESSION_JWT_SECRET");
        env::remove_var("PLATFORM_ADMIN_EMAIL");
        env::remove_var("EXCLUDED_PATH_PREFIXES");
        env::remove_var("EXPOSE_BACKEND_ERRORS");
    }

    #[test]
    #[serial]
    fn test_missing_required_vars() {
        cleanup_config();

        let result = Config::from_env();
        assert!(matches!(result, Err(ConfigError::Missing("DATABASE_URL"))));

        env::set_var("DATABASE_URL", "postgres://test");
        let result = Config::from_env();
        assert!(matches!(
            result,
            Err(ConfigError::Missing("SESSION_JWT_SECRET"))
        ));

        env::set_var(
            "SESSION_JWT_SECRET",
            "test-session-secret-at-least-32-characters",
        );
        let result = Config::from_env();
        assert!(matches!(
            result,
            Err(ConfigError::Missing("PLATFORM_ADMIN_EMAIL"))
        ));

        cleanup_config();
    }

    #[test]
    #[serial]
    fn test_weak_session_secret_rejected() {
        setup_minimal_config();
        env::set_var("SESSION_JWT_SECRET", "short");

        let result = Config::from_env();
        assert!(matches!(result, Err(ConfigError::WeakSecret(_))));

        cleanup_config();
    }

    #[test]
    #[serial]
    fn test_defaults_applied() {
        setup_minimal_config();

        let config = Config::from_env().unwrap();
        assert_eq!(config.production_domain, "aluro.shop");
        assert_eq!(config.preview_suffix, "vercel.app");
        assert_eq!(config.dev_host, "localhost");
        assert_eq!(config.bind_address, "0.0.0.0:3000");
        assert!(!config.expose_backend_errors);
        assert_eq!(
            config.excluded_path_prefixes,
            vec!["/static/", "/assets/", "/favicon.ico"]
        );

        cleanup_config();
    }

    #[test]
    #[serial]
    fn test_excluded_prefixes_override() {
        setup_minimal_config();
        env::set_var("EXCLUDED_PATH_PREFIXES", "/cdn/, /img/ ,");

        let config = Config::from_env().unwrap();
        assert_eq!(config.excluded_path_prefixes, vec!["/cdn/", "/img/"]);

        cleanup_config();
    }
}
