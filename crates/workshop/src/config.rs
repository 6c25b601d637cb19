//! Workshop configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `WORKSHOP_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`; without either, records and sessions are kept in memory)
//! - `WORKSHOP_HOST` - Bind address (default: 127.0.0.1)
//! - `WORKSHOP_PORT` - Listen port (default: 3001)
//! - `WORKSHOP_BASE_URL` - Public URL of the console (default: <http://localhost:3001>)
//! - `WORKSHOP_PROJECT_ID` - Document store project identifier (default: santa-s-workshop)
//! - `WORKSHOP_UNSCOPED_ORDERS` - Orders shown to a viewer with no identity:
//!   `show_all` (default) or `empty`
//! - `WORKSHOP_ELF_BOOST` - Elf energy boost behavior: `preview` (default) or `persist`
//! - `WORKSHOP_CACHE_MAX_AGE_SECS` - Seconds a cached collection is served
//!   before the next read reloads it (default: 30)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Traces sample rate (default: 1.0)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_PROJECT_ID: &str = "santa-s-workshop";
const DEFAULT_BASE_URL: &str = "http://localhost:3001";
const DEFAULT_CACHE_MAX_AGE_SECS: u64 = 30;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Orders returned to a viewer that has neither a user id nor an anonymous
/// session id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnscopedOrderVisibility {
    /// Every order is visible.
    #[default]
    ShowAll,
    /// No orders are visible.
    Empty,
}

impl FromStr for UnscopedOrderVisibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "show_all" => Ok(Self::ShowAll),
            "empty" => Ok(Self::Empty),
            other => Err(format!("expected show_all or empty, got {other}")),
        }
    }
}

/// What boosting an elf's energy does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ElfBoostPolicy {
    /// Return the boosted elf without writing it.
    #[default]
    Preview,
    /// Atomically add the boost to the stored energy.
    Persist,
}

impl FromStr for ElfBoostPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "preview" => Ok(Self::Preview),
            "persist" => Ok(Self::Persist),
            other => Err(format!("expected preview or persist, got {other}")),
        }
    }
}

/// Workshop application configuration.
#[derive(Clone)]
pub struct WorkshopConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: Option<SecretString>,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the console
    pub base_url: String,
    /// Document store project identifier
    pub project_id: String,
    /// Order visibility for viewers without any identity
    pub unscoped_orders: UnscopedOrderVisibility,
    /// Elf boost behavior
    pub elf_boost: ElfBoostPolicy,
    /// How long a cached collection is served before a read reloads it
    pub cache_max_age: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

impl std::fmt::Debug for WorkshopConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkshopConfig")
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[REDACTED]"),
            )
            .field("host", &self.host)
            .field("port", &self.port)
            .field("base_url", &self.base_url)
            .field("project_id", &self.project_id)
            .field("unscoped_orders", &self.unscoped_orders)
            .field("elf_boost", &self.elf_boost)
            .field("cache_max_age", &self.cache_max_age)
            .field("sentry_dsn", &self.sentry_dsn.as_ref().map(|_| "[REDACTED]"))
            .field("sentry_environment", &self.sentry_environment)
            .field("sentry_sample_rate", &self.sentry_sample_rate)
            .field("sentry_traces_sample_rate", &self.sentry_traces_sample_rate)
            .finish()
    }
}

impl Default for WorkshopConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3001,
            base_url: DEFAULT_BASE_URL.to_owned(),
            project_id: DEFAULT_PROJECT_ID.to_owned(),
            unscoped_orders: UnscopedOrderVisibility::default(),
            elf_boost: ElfBoostPolicy::default(),
            cache_max_age: Duration::from_secs(DEFAULT_CACHE_MAX_AGE_SECS),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
        }
    }
}

impl WorkshopConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("WORKSHOP_DATABASE_URL");
        let host = parse_env_or_default("WORKSHOP_HOST", "127.0.0.1")?;
        let port = parse_env_or_default("WORKSHOP_PORT", "3001")?;
        let base_url = get_env_or_default("WORKSHOP_BASE_URL", DEFAULT_BASE_URL);
        url::Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("WORKSHOP_BASE_URL".to_string(), e.to_string())
        })?;
        let project_id = get_env_or_default("WORKSHOP_PROJECT_ID", DEFAULT_PROJECT_ID);
        let unscoped_orders = parse_env_or_default("WORKSHOP_UNSCOPED_ORDERS", "show_all")?;
        let elf_boost = parse_env_or_default("WORKSHOP_ELF_BOOST", "preview")?;
        let cache_max_age = Duration::from_secs(parse_env_or_default(
            "WORKSHOP_CACHE_MAX_AGE_SECS",
            &DEFAULT_CACHE_MAX_AGE_SECS.to_string(),
        )?);
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            project_id,
            unscoped_orders,
            elf_boost,
            cache_max_age,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// The database URL, for tools that cannot fall back to memory.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if no database URL is configured.
    pub fn require_database_url(&self) -> Result<&SecretString, ConfigError> {
        self.database_url
            .as_ref()
            .ok_or_else(|| ConfigError::MissingEnvVar("WORKSHOP_DATABASE_URL".to_string()))
    }

    /// Whether the console is served over HTTPS (drives the secure cookie flag).
    #[must_use]
    pub fn is_https(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Option<SecretString> {
    std::env::var(primary_key)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
        .map(SecretString::from)
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_addr() {
        let config = WorkshopConfig::default();
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3001);
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!(
            "show_all".parse::<UnscopedOrderVisibility>().unwrap(),
            UnscopedOrderVisibility::ShowAll
        );
        assert_eq!(
            "empty".parse::<UnscopedOrderVisibility>().unwrap(),
            UnscopedOrderVisibility::Empty
        );
        assert!("all".parse::<UnscopedOrderVisibility>().is_err());
        assert_eq!(
            "persist".parse::<ElfBoostPolicy>().unwrap(),
            ElfBoostPolicy::Persist
        );
        assert!("Persist".parse::<ElfBoostPolicy>().is_err());
    }

    #[test]
    fn test_defaults() {
        let config = WorkshopConfig::default();
        assert_eq!(config.project_id, "santa-s-workshop");
        assert_eq!(config.unscoped_orders, UnscopedOrderVisibility::ShowAll);
        assert_eq!(config.elf_boost, ElfBoostPolicy::Preview);
        assert_eq!(config.cache_max_age, Duration::from_secs(30));
        assert!(!config.is_https());
        assert!(matches!(
            config.require_database_url(),
            Err(ConfigError::MissingEnvVar(_))
        ));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = WorkshopConfig {
            database_url: Some(SecretString::from("postgres://elf:hunter2@db/workshop")),
            sentry_dsn: Some("https://key@sentry.example.com/1".to_string()),
            ..WorkshopConfig::default()
        };

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("santa-s-workshop"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("hunter2"));
        assert!(!debug_output.contains("key@sentry"));
    }

    #[test]
    fn test_parse_env_or_default_reports_key() {
        let err = parse_env_or_default::<u16>("WORKSHOP_TEST_UNSET_PORT", "not-a-port").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "WORKSHOP_TEST_UNSET_PORT"));
    }
}
