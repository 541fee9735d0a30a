//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BAZAAR_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `BAZAAR_JWT_SECRET` - HS256 signing secret (min 32 chars, high entropy)
//! - `GOOGLE_CLIENT_ID` - OAuth client ID that Google ID tokens must be issued for
//!
//! ## Optional
//! - `BAZAAR_HOST` - Bind address (default: 127.0.0.1)
//! - `BAZAAR_PORT` - Listen port (default: 5000)
//! - `BAZAAR_ALLOWED_ORIGINS` - Comma-separated SPA origins for CORS (default: `http://localhost:5173`)
//! - `BAZAAR_TOKEN_TTL_DAYS` - Lifetime of issued tokens in days (default: 7)
//! - `BAZAAR_CATALOG_CACHE_SECS` - Catalog cache TTL in seconds (default: 60)
//! - `BAZAAR_SEED_DEFAULT_ADMINS` - Create `admin1`/`admin2` on first login when no admin exists (default: false)
//! - `BAZAAR_LOG_FORMAT` - `json` or `text` (default: text)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_JWT_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// API application configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct ApiConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// HS256 signing secret for issued tokens
    pub jwt_secret: SecretString,
    /// Lifetime of issued tokens
    pub token_ttl: Duration,
    /// Google OAuth client ID (expected `aud` of ID tokens)
    pub google_client_id: String,
    /// Origins allowed to call the API from a browser
    pub allowed_origins: Vec<String>,
    /// How long the active catalog is cached
    pub catalog_cache_ttl: Duration,
    /// Create the two default admin accounts on first admin login
    pub seed_default_admins: bool,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("database_url", &"[REDACTED]")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("jwt_secret", &"[REDACTED]")
            .field("token_ttl", &self.token_ttl)
            .field("google_client_id", &self.google_client_id)
            .field("allowed_origins", &self.allowed_origins)
            .field("catalog_cache_ttl", &self.catalog_cache_ttl)
            .field("seed_default_admins", &self.seed_default_admins)
            .field("log_format", &self.log_format)
            .field("sentry_dsn", &self.sentry_dsn.as_ref().map(|_| "[SET]"))
            .field("sentry_environment", &self.sentry_environment)
            .finish()
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("BAZAAR_DATABASE_URL")?;
        let host = parse_env("BAZAAR_HOST", "127.0.0.1")?;
        let port = parse_env("BAZAAR_PORT", "5000")?;

        let jwt_secret = get_validated_secret("BAZAAR_JWT_SECRET")?;
        validate_secret_length(&jwt_secret, "BAZAAR_JWT_SECRET")?;

        let ttl_days: u64 = parse_env("BAZAAR_TOKEN_TTL_DAYS", "7")?;
        if ttl_days == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "BAZAAR_TOKEN_TTL_DAYS".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        let cache_secs: u64 = parse_env("BAZAAR_CATALOG_CACHE_SECS", "60")?;

        let allowed_origins = parse_origins(&get_env_or_default(
            "BAZAAR_ALLOWED_ORIGINS",
            "http://localhost:5173",
        ))?;

        let log_format = match get_env_or_default("BAZAAR_LOG_FORMAT", "text").as_str() {
            "json" => LogFormat::Json,
            "text" => LogFormat::Text,
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "BAZAAR_LOG_FORMAT".to_string(),
                    format!("expected 'json' or 'text', got '{other}'"),
                ));
            }
        };

        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret,
            token_ttl: Duration::from_secs(ttl_days * 24 * 60 * 60),
            google_client_id: get_required_env("GOOGLE_CLIENT_ID")?,
            allowed_origins,
            catalog_cache_ttl: Duration::from_secs(cache_secs),
            seed_default_admins: parse_env("BAZAAR_SEED_DEFAULT_ADMINS", "false")?,
            log_format,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable (or its default) with `FromStr`.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a comma-separated list of origins, normalizing each to `scheme://host[:port]`.
fn parse_origins(raw: &str) -> Result<Vec<String>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            let url = url::Url::parse(s).map_err(|e| {
                ConfigError::InvalidEnvVar("BAZAAR_ALLOWED_ORIGINS".to_string(), format!("{s}: {e}"))
            })?;
            if url.host_str().is_none() {
                return Err(ConfigError::InvalidEnvVar(
                    "BAZAAR_ALLOWED_ORIGINS".to_string(),
                    format!("{s}: origin must have a host"),
                ));
            }
            Ok(url.origin().ascii_serialization())
        })
        .collect()
}

/// Validate that a signing secret meets minimum length requirements.
fn validate_secret_length(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_JWT_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

/// Configuration used by in-crate tests. Never reads the environment.
#[cfg(test)]
pub(crate) fn test_config() -> ApiConfig {
    ApiConfig {
        database_url: SecretString::from("postgres://localhost/bazaar_test"),
        host: IpAddr::from([127, 0, 0, 1]),
        port: 5000,
        jwt_secret: SecretString::from("kV8#qZ2!mP5$wX9@rT3&nL7*bH4^cF6%"),
        token_ttl: Duration::from_secs(7 * 24 * 60 * 60),
        google_client_id: "test-client.apps.googleusercontent.com".to_string(),
        allowed_origins: vec!["http://localhost:5173".to_string()],
        catalog_cache_ttl: Duration::from_secs(60),
        seed_default_admins: false,
        log_format: LogFormat::Text,
        sentry_dsn: None,
        sentry_environment: None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-jwt-key-goes-here", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength(&"ab".repeat(20), "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_secret_length() {
        assert!(validate_secret_length(&SecretString::from("short"), "T").is_err());
        assert!(validate_secret_length(&SecretString::from("a".repeat(32)), "T").is_ok());
    }

    #[test]
    fn test_parse_origins_normalizes() {
        let origins =
            parse_origins("http://localhost:5173/, https://shop.example.org/app").unwrap();
        assert_eq!(
            origins,
            vec![
                "http://localhost:5173".to_string(),
                "https://shop.example.org".to_string()
            ]
        );
    }

    #[test]
    fn test_parse_origins_rejects_garbage() {
        assert!(parse_origins("not a url").is_err());
    }

    #[test]
    fn test_socket_addr() {
        let addr = test_config().socket_addr();
        assert_eq!(addr.to_string(), "127.0.0.1:5000");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let debug_output = format!("{:?}", test_config());
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("kV8#qZ2"));
        assert!(!debug_output.contains("bazaar_test"));
        assert!(debug_output.contains("test-client.apps.googleusercontent.com"));
    }
}
