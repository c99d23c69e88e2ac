//! Environment check command.
//!
//! # Usage
//!
//! ```bash
//! bl-cli check-env
//! ```
//!
//! # Environment Variables
//!
//! - `RESEND_API_KEY` - Transactional email API key
//! - `CONTACT_FROM_EMAIL` - Sender address
//! - `CONTACT_TO_EMAIL` - Owner address
//! - `SITE_URL` - Public site URL

use blacklake_site::config::{ConfigError, EnvironmentConfig, RuntimeMode};

/// Run the environment guard as production would.
///
/// # Errors
///
/// Returns `ConfigError::MissingEnvVars` naming every missing variable.
pub fn check() -> Result<(), ConfigError> {
    dotenvy::dotenv().ok();

    let environment = EnvironmentConfig::from_env();
    check_config(&environment)?;

    tracing::info!("All required environment variables are set");
    Ok(())
}

fn check_config(environment: &EnvironmentConfig) -> Result<(), ConfigError> {
    if let Some(pattern) = environment.api_key_placeholder() {
        tracing::warn!(pattern, "RESEND_API_KEY looks like a placeholder");
    }
    environment.guard(RuntimeMode::Production)
}
