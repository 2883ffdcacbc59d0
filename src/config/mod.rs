//! Configuration management
//!
//! Configuration is read from `config.yml` and can be overridden with
//! `ZUREE_*` environment variables. Missing values fall back to defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub mail: MailConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// Origin of the single-page frontend allowed by CORS
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
    /// Take the client IP from `X-Forwarded-For`/`X-Real-IP`. Enable only
    /// behind a reverse proxy that overwrites those headers.
    #[serde(default)]
    pub trust_proxy: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
            trust_proxy: false,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_cors_origin() -> String {
    "http://localhost:3000".to_string()
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database driver (sqlite or mysql)
    #[serde(default)]
    pub driver: DatabaseDriver,
    /// Database connection URL or SQLite file path
    #[serde(default = "default_database_url")]
    pub url: String,
    /// Upper bound of pooled connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            driver: DatabaseDriver::default(),
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

fn default_database_url() -> String {
    "data/zuree.db".to_string()
}

fn default_max_connections() -> u32 {
    10
}

/// Database driver type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseDriver {
    #[default]
    Sqlite,
    Mysql,
}

impl std::fmt::Display for DatabaseDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite => write!(f, "sqlite"),
            Self::Mysql => write!(f, "mysql"),
        }
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Lifetime of a session token in hours
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: i64,
    /// Whether visitors may self-register after the first (admin) account exists
    #[serde(default = "default_allow_registration")]
    pub allow_registration: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_hours: default_session_ttl_hours(),
            allow_registration: default_allow_registration(),
        }
    }
}

fn default_session_ttl_hours() -> i64 {
    24
}

fn default_allow_registration() -> bool {
    true
}

/// Outgoing mail configuration. Mail is disabled while `smtp_host` is unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    #[serde(default)]
    pub smtp_host: Option<String>,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Sender address, e.g. `Zuree Telecom <no-reply@zureetelecom.com>`
    #[serde(default)]
    pub from: Option<String>,
    /// Inbox that receives contact form notifications
    #[serde(default)]
    pub notify_to: Option<String>,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: None,
            smtp_port: default_smtp_port(),
            username: None,
            password: None,
            from: None,
            notify_to: None,
        }
    }
}

fn default_smtp_port() -> u16 {
    587
}

impl MailConfig {
    /// Whether an SMTP relay is configured
    pub fn is_enabled(&self) -> bool {
        self.smtp_host.as_deref().is_some_and(|h| !h.trim().is_empty())
    }
}

/// Error type for configuration parsing
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

impl Config {
    /// Load configuration from file
    ///
    /// A missing or empty file yields the default configuration.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: format_yaml_error(&e),
        })
    }

    /// Load configuration from file, apply environment overrides and validate
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges and cross-field requirements
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError("server.port must be non-zero".into()));
        }
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::ValidationError("database.url must not be empty".into()));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "database.max_connections must be at least 1".into(),
            ));
        }
        if self.auth.session_ttl_hours < 1 {
            return Err(ConfigError::ValidationError(
                "auth.session_ttl_hours must be at least 1".into(),
            ));
        }
        if self.mail.is_enabled() && (self.mail.from.is_none() || self.mail.notify_to.is_none()) {
            return Err(ConfigError::ValidationError(
                "mail.from and mail.notify_to are required when mail.smtp_host is set".into(),
            ));
        }
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("ZUREE_SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = env_parse::<u16>("ZUREE_SERVER_PORT") {
            self.server.port = port;
        }
        if let Ok(origin) = std::env::var("ZUREE_SERVER_CORS_ORIGIN") {
            self.server.cors_origin = origin;
        }
        if let Some(trust) = env_parse::<bool>("ZUREE_SERVER_TRUST_PROXY") {
            self.server.trust_proxy = trust;
        }

        if let Ok(driver) = std::env::var("ZUREE_DATABASE_DRIVER") {
            match driver.to_lowercase().as_str() {
                "sqlite" => self.database.driver = DatabaseDriver::Sqlite,
                "mysql" => self.database.driver = DatabaseDriver::Mysql,
                _ => {}
            }
        }
        if let Ok(url) = std::env::var("ZUREE_DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(max) = env_parse::<u32>("ZUREE_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = max;
        }

        if let Some(ttl) = env_parse::<i64>("ZUREE_AUTH_SESSION_TTL_HOURS") {
            self.auth.session_ttl_hours = ttl;
        }

        if let Ok(host) = std::env::var("ZUREE_MAIL_SMTP_HOST") {
            self.mail.smtp_host = Some(host);
        }
        if let Some(port) = env_parse::<u16>("ZUREE_MAIL_SMTP_PORT") {
            self.mail.smtp_port = port;
        }
        if let Ok(username) = std::env::var("ZUREE_MAIL_USERNAME") {
            self.mail.username = Some(username);
        }
        if let Ok(password) = std::env::var("ZUREE_MAIL_PASSWORD") {
            self.mail.password = Some(password);
        }
        if let Ok(from) = std::env::var("ZUREE_MAIL_FROM") {
            self.mail.from = Some(from);
        }
        if let Ok(to) = std::env::var("ZUREE_MAIL_NOTIFY_TO") {
            self.mail.notify_to = Some(to);
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

/// Format YAML parsing error with location
fn format_yaml_error(e: &serde_yaml::Error) -> String {
    match e.location() {
        Some(location) => format!(
            "at line {}, column {}: {}",
            location.line(),
            location.column(),
            e
        ),
        None => e.to_string(),
    }
}

#[cfg(test)]
static CONFIG_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());
