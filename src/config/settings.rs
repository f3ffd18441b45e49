//! Application settings loaded from `config.toml` with environment overrides.
//!
//! Every section is optional in the file; missing values fall back to defaults so a
//! bare checkout can start against a local `SQLite` file. Environment variables win
//! over the file:
//!
//! * `TOURDESK_HOST` / `TOURDESK_PORT` - listen address
//! * `TOURDESK_ADMIN_TOKEN_SHA256` - hex SHA-256 digest of the admin bearer token

use crate::core::notify::DeliveryMode;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Complete application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    /// HTTP listener
    #[serde(default)]
    pub server: ServerSettings,
    /// Admin authentication
    #[serde(default)]
    pub auth: AuthSettings,
    /// Outbound booking confirmations
    #[serde(default)]
    pub notifications: NotificationSettings,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    8000
}

/// Admin authentication settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthSettings {
    /// Hex-encoded SHA-256 digest of the admin token. Admin routes reject every
    /// request while this is unset.
    pub admin_token_sha256: Option<String>,
}

/// Booking confirmation settings
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationSettings {
    /// How confirmations are handed to the notifier
    #[serde(default)]
    pub delivery: DeliveryMode,
    /// Contact address printed in confirmation messages
    #[serde(default = "default_support_email")]
    pub support_email: String,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            delivery: DeliveryMode::default(),
            support_email: default_support_email(),
        }
    }
}

fn default_support_email() -> String {
    "support@example.com".to_string()
}

/// Parses settings from a TOML string.
pub fn parse_settings(contents: &str) -> Result<Settings> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads settings from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML is invalid.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();
    tracing::debug!("Loading configuration from {:?}", path);
    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path.display()),
    })?;
    parse_settings(&contents)
}

/// Loads `./config.toml` if present (defaults otherwise) and applies environment overrides.
pub fn load_default_settings() -> Result<Settings> {
    let path = Path::new("config.toml");
    let mut settings = if path.exists() {
        load_settings(path)?
    } else {
        tracing::info!("No config.toml found, using default settings");
        Settings::default()
    };
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok())?;
    Ok(settings)
}

/// Applies overrides from a key lookup (the process environment in production).
pub fn apply_env_overrides<F>(settings: &mut Settings, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = lookup("TOURDESK_HOST") {
        settings.server.host = host;
    }
    if let Some(port) = lookup("TOURDESK_PORT") {
        settings.server.port = port.parse().map_err(|e| Error::Config {
            message: format!("TOURDESK_PORT must be a port number: {e}"),
        })?;
    }
    if let Some(digest) = lookup("TOURDESK_ADMIN_TOKEN_SHA256") {
        settings.auth.admin_token_sha256 = Some(digest);
    }
    Ok(())
}
