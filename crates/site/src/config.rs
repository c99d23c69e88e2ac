//! Site configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required in production (checked per request by the environment guard)
//! - `RESEND_API_KEY` - Transactional email API key
//! - `CONTACT_FROM_EMAIL` - Sender address for outbound email
//! - `CONTACT_TO_EMAIL` - Owner address that receives inquiries
//! - `SITE_URL` - Public site URL (email footer, canonical links)
//!
//! ## Optional
//! - `APP_ENV` - `production` enables the environment guard (default: development)
//! - `SITE_HOST` - Bind address (default: 127.0.0.1)
//! - `SITE_PORT` - Listen port (default: 3000)
//! - `SITE_STATIC_DIR` - Directory of pre-built pages served as the fallback
//! - `LOG_FORMAT` - `json` for structured logs (default: text)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0 to 1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Traces sample rate, 0.0 to 1.0 (default: 0.1)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

pub const RESEND_API_KEY: &str = "RESEND_API_KEY";
pub const CONTACT_FROM_EMAIL: &str = "CONTACT_FROM_EMAIL";
pub const CONTACT_TO_EMAIL: &str = "CONTACT_TO_EMAIL";
pub const SITE_URL: &str = "SITE_URL";

/// Configuration errors that can occur during loading or guarding.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variables: {}", .0.join(", "))]
    MissingEnvVars(Vec<String>),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Whether the process runs as the public deployment or locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuntimeMode {
    Production,
    #[default]
    Development,
}

impl RuntimeMode {
    /// `production` (case-insensitive) is production; anything else is development.
    #[must_use]
    pub fn from_env_value(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("production") {
            Self::Production
        } else {
            Self::Development
        }
    }

    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Development => "development",
        }
    }
}

/// External configuration the contact pipeline depends on.
///
/// Read once at startup and never mutated. Values are kept optional so the
/// guard can report every gap at once instead of failing on the first.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone, Default)]
pub struct EnvironmentConfig {
    /// Transactional email API key
    pub resend_api_key: Option<SecretString>,
    /// Sender address (From header)
    pub from_email: Option<String>,
    /// Owner address that receives notifications
    pub to_email: Option<String>,
    /// Public site URL
    pub site_url: Option<String>,
}

impl std::fmt::Debug for EnvironmentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvironmentConfig")
            .field(
                "resend_api_key",
                &self.resend_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("from_email", &self.from_email)
            .field("to_email", &self.to_email)
            .field("site_url", &self.site_url)
            .finish()
    }
}

impl EnvironmentConfig {
    /// Read the contact pipeline variables from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(get_optional_env)
    }

    /// Read the contact pipeline variables through `lookup`.
    ///
    /// Empty and whitespace-only values are treated as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            resend_api_key: read(RESEND_API_KEY).map(SecretString::from),
            from_email: read(CONTACT_FROM_EMAIL),
            to_email: read(CONTACT_TO_EMAIL),
            site_url: read(SITE_URL),
        }
    }

    /// Names of required variables that are missing or unusable.
    #[must_use]
    pub fn missing(&self) -> Vec<String> {
        let mut missing = Vec::new();

        if self.resend_api_key.is_none() {
            missing.push(RESEND_API_KEY.to_string());
        }
        if self.from_email.is_none() {
            missing.push(CONTACT_FROM_EMAIL.to_string());
        }
        if self.to_email.is_none() {
            missing.push(CONTACT_TO_EMAIL.to_string());
        }
        match self.site_url.as_deref() {
            None => missing.push(SITE_URL.to_string()),
            Some(url) if Url::parse(url).is_err() => {
                missing.push(format!("{SITE_URL} (not an absolute URL)"));
            }
            Some(_) => {}
        }

        missing
    }

    /// Environment guard.
    ///
    /// In production, fails with one error naming every missing variable.
    /// In development it always passes so the site runs without credentials.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVars` in production when anything is missing.
    pub fn guard(&self, mode: RuntimeMode) -> Result<(), ConfigError> {
        if !mode.is_production() {
            return Ok(());
        }

        let missing = self.missing();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::MissingEnvVars(missing))
        }
    }

    /// Placeholder pattern found in the API key, if any.
    #[must_use]
    pub fn api_key_placeholder(&self) -> Option<&'static str> {
        let key = self.resend_api_key.as_ref()?.expose_secret().to_lowercase();
        PLACEHOLDER_PATTERNS
            .iter()
            .copied()
            .find(|pattern| key.contains(pattern))
    }
}

/// Site application configuration.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Production or development
    pub mode: RuntimeMode,
    /// Pre-built pages served for any unmatched path
    pub static_dir: Option<PathBuf>,
    /// Emit JSON logs instead of text
    pub log_json: bool,
    /// Contact pipeline configuration
    pub environment: EnvironmentConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

impl SiteConfig {
    /// Configuration with local defaults for everything but the mode and
    /// contact pipeline settings.
    #[must_use]
    pub fn new(mode: RuntimeMode, environment: EnvironmentConfig) -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            mode,
            static_dir: None,
            log_json: false,
            environment,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.1,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present. Missing
    /// contact variables are not an error here; the environment guard
    /// reports them per request.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an optional variable is set but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("SITE_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("SITE_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("SITE_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SITE_PORT".to_string(), e.to_string()))?;
        let mode = RuntimeMode::from_env_value(&get_env_or_default("APP_ENV", "development"));
        let static_dir = get_optional_env("SITE_STATIC_DIR").map(PathBuf::from);
        let log_json = get_optional_env("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json"));

        Ok(Self {
            host,
            port,
            mode,
            static_dir,
            log_json,
            environment: EnvironmentConfig::from_env(),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: get_sample_rate("SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: get_sample_rate("SENTRY_TRACES_SAMPLE_RATE", 0.1)?,
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

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get a sample rate in `0.0..=1.0`, or the default when unset.
fn get_sample_rate(key: &str, default: f32) -> Result<f32, ConfigError> {
    let Some(raw) = get_optional_env(key) else {
        return Ok(default);
    };
    parse_sample_rate(key, &raw)
}

fn parse_sample_rate(key: &str, raw: &str) -> Result<f32, ConfigError> {
    let rate = raw
        .trim()
        .parse::<f32>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !(0.0..=1.0).contains(&rate) {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0.0 and 1.0 (got {rate})"),
        ));
    }
    Ok(rate)
}
