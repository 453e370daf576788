//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STORE_TENANT_ID` - Tenant segment of every collection path
//!   (`artifacts/{tenant}/users/{owner}/...`)
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string (only for the
//!   `postgres` backend; falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `ADMIN_BASE_URL` - Public URL for the admin panel (default: `http://{host}:{port}`)
//! - `STORE_BACKEND` - `postgres` or `memory` (default: postgres)
//! - `STORE_OWNER_ID` - Owner segment of collection paths (default: `ADMIN_USER_ID`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Traces sample rate (default: 1.0)
//!
//! ## Optional (TLS)
//! - `ADMIN_TLS_CERT` - PEM-encoded certificate chain
//! - `ADMIN_TLS_KEY` - PEM-encoded private key

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

use crate::store::{Collection, CollectionPath};

const DEFAULT_OWNER_ID: &str = "ADMIN_USER_ID";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the admin panel
    pub base_url: String,
    /// Document store connection and scoping
    pub store: StoreConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
    /// TLS configuration for HTTPS (optional)
    pub tls: Option<TlsConfig>,
}

/// Which document store implementation to connect to.
#[derive(Clone)]
pub enum StoreBackend {
    /// JSONB documents in `PostgreSQL`, change feed over `LISTEN/NOTIFY`.
    Postgres {
        /// Connection URL (contains password)
        database_url: SecretString,
    },
    /// Process-local store. Data is lost on restart.
    Memory,
}

impl std::fmt::Debug for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Postgres { .. } => f
                .debug_struct("Postgres")
                .field("database_url", &"[REDACTED]")
                .finish(),
            Self::Memory => f.write_str("Memory"),
        }
    }
}

/// Document store configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Deployment partition inside the shared store.
    pub tenant_id: String,
    /// Admin user segment under the tenant.
    pub owner_id: String,
}

impl StoreConfig {
    /// Full path of one of the two collections.
    #[must_use]
    pub fn collection(&self, collection: Collection) -> CollectionPath {
        CollectionPath::new(&self.tenant_id, &self.owner_id, collection)
    }

    /// Path of the `products` collection.
    #[must_use]
    pub fn products(&self) -> CollectionPath {
        self.collection(Collection::Products)
    }

    /// Path of the `orders` collection.
    #[must_use]
    pub fn orders(&self) -> CollectionPath {
        self.collection(Collection::Orders)
    }
}

/// TLS configuration for HTTPS.
#[derive(Clone)]
pub struct TlsConfig {
    /// PEM-encoded certificate chain
    pub cert_pem: String,
    /// PEM-encoded private key
    pub key_pem: SecretString,
}

impl std::fmt::Debug for TlsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsConfig")
            .field("cert_pem", &"[CERTIFICATE]")
            .field("key_pem", &"[REDACTED]")
            .finish()
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let host = env
            .or_default("ADMIN_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_HOST".to_string(), e.to_string()))?;
        let port = env
            .or_default("ADMIN_PORT", "3001")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_PORT".to_string(), e.to_string()))?;
        let base_url = env
            .optional("ADMIN_BASE_URL")
            .unwrap_or_else(|| format!("http://{}", SocketAddr::new(host, port)));

        let store = StoreConfig::from_env(&env)?;
        let tls = TlsConfig::from_env(&env)?;

        let sentry_dsn = env.optional("SENTRY_DSN");
        let sentry_environment = env.optional("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = env
            .optional("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = env
            .optional("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            host,
            port,
            base_url,
            store,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
            tls,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl StoreConfig {
    fn from_env<F: Fn(&str) -> Option<String>>(env: &Env<F>) -> Result<Self, ConfigError> {
        let backend = match env.or_default("STORE_BACKEND", "postgres").as_str() {
            "postgres" => StoreBackend::Postgres {
                database_url: env.database_url("ADMIN_DATABASE_URL")?,
            },
            "memory" => StoreBackend::Memory,
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "STORE_BACKEND".to_string(),
                    format!("expected `postgres` or `memory`, got `{other}`"),
                ));
            }
        };

        let tenant_id = env.required("STORE_TENANT_ID")?;
        let owner_id = env.or_default("STORE_OWNER_ID", DEFAULT_OWNER_ID);
        for (key, value) in [("STORE_TENANT_ID", &tenant_id), ("STORE_OWNER_ID", &owner_id)] {
            validate_path_segment(key, value)?;
        }

        Ok(Self {
            backend,
            tenant_id,
            owner_id,
        })
    }
}

impl TlsConfig {
    fn from_env<F: Fn(&str) -> Option<String>>(env: &Env<F>) -> Result<Option<Self>, ConfigError> {
        let cert_pem = env.optional("ADMIN_TLS_CERT");
        let key_pem = env.optional("ADMIN_TLS_KEY");

        match (cert_pem, key_pem) {
            (Some(cert), Some(key)) => Ok(Some(Self {
                cert_pem: cert,
                key_pem: SecretString::from(key),
            })),
            (None, None) => Ok(None),
            _ => Err(ConfigError::InvalidEnvVar(
                "ADMIN_TLS_*".to_string(),
                "Both ADMIN_TLS_CERT and ADMIN_TLS_KEY must be set together".to_string(),
            )),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable lookup with the usual required/optional/default accessors.
struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Get an optional variable. Empty values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Get database URL with fallback to generic `DATABASE_URL` (used by Fly.io postgres attach).
    fn database_url(&self, primary_key: &str) -> Result<SecretString, ConfigError> {
        self.optional(primary_key)
            .or_else(|| self.optional("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar(primary_key.to_string()))
    }
}

/// Path segments end up inside `artifacts/{tenant}/users/{owner}`.
fn validate_path_segment(key: &str, value: &str) -> Result<(), ConfigError> {
    if value.contains('/') {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must not contain '/'".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AdminConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AdminConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults_with_memory_backend() {
        let config = load(&[("STORE_BACKEND", "memory"), ("STORE_TENANT_ID", "WkVs")]).unwrap();

        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3001");
        assert_eq!(config.base_url, "http://127.0.0.1:3001");
        assert!(matches!(config.store.backend, StoreBackend::Memory));
        assert_eq!(config.store.owner_id, "ADMIN_USER_ID");
        assert!(config.tls.is_none());
        assert!((config.sentry_sample_rate - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_collection_paths() {
        let config = load(&[("STORE_BACKEND", "memory"), ("STORE_TENANT_ID", "WkVs")]).unwrap();
        assert_eq!(
            config.store.products().to_string(),
            "artifacts/WkVs/users/ADMIN_USER_ID/products"
        );
        assert_eq!(
            config.store.orders().to_string(),
            "artifacts/WkVs/users/ADMIN_USER_ID/orders"
        );
    }

    #[test]
    fn test_postgres_requires_database_url() {
        let err = load(&[("STORE_TENANT_ID", "WkVs")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "ADMIN_DATABASE_URL"));
    }

    #[test]
    fn test_database_url_falls_back() {
        let config = load(&[
            ("STORE_TENANT_ID", "WkVs"),
            ("DATABASE_URL", "postgres://localhost/popeyon"),
        ])
        .unwrap();
        match config.store.backend {
            StoreBackend::Postgres { database_url } => {
                assert_eq!(database_url.expose_secret(), "postgres://localhost/popeyon");
            }
            StoreBackend::Memory => panic!("expected postgres backend"),
        }
    }

    #[test]
    fn test_tenant_required() {
        let err = load(&[("STORE_BACKEND", "memory")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "STORE_TENANT_ID"));
    }

    #[test]
    fn test_rejects_unknown_backend_and_bad_segments() {
        assert!(load(&[("STORE_BACKEND", "firestore"), ("STORE_TENANT_ID", "t")]).is_err());
        assert!(load(&[("STORE_BACKEND", "memory"), ("STORE_TENANT_ID", "a/b")]).is_err());
    }

    #[test]
    fn test_tls_requires_both_halves() {
        let err = load(&[
            ("STORE_BACKEND", "memory"),
            ("STORE_TENANT_ID", "t"),
            ("ADMIN_TLS_CERT", "cert"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_invalid_port() {
        let err = load(&[
            ("STORE_BACKEND", "memory"),
            ("STORE_TENANT_ID", "t"),
            ("ADMIN_PORT", "not-a-port"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "ADMIN_PORT"));
    }

    #[test]
    fn test_debug_redacts_database_url() {
        let backend = StoreBackend::Postgres {
            database_url: SecretString::from("postgres://user:hunter2@db/x"),
        };
        assert!(!format!("{backend:?}").contains("hunter2"));
    }
}
