use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://training_catalog.db";
pub const DEFAULT_OPERATIONS_MAILBOX: &str = "hr@sunvivatechnologies.com";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_MAIL_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} has an invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub bind_addr: SocketAddr,
    /// `None` allows any origin.
    pub cors_allowed_origins: Option<Vec<String>>,
    pub operations_mailbox: String,
    /// `None` when the mail transport is not configured; sends then fail and are reported
    /// on the contact response instead of blocking startup.
    pub mail: Option<MailConfig>,
}

#[derive(Clone, Debug)]
pub struct MailConfig {
    pub api_url: String,
    pub api_token: String,
    pub from_address: String,
    pub timeout: Duration,
}

impl AppConfig {
    pub fn new_from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
        let max_connections = parse_var("DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?;
        let bind_addr = parse_var("BIND_ADDR", SocketAddr::from(([127, 0, 0, 1], 8000)))?;

        let cors_allowed_origins = non_empty_var("CORS_ALLOWED_ORIGINS").map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect()
        });

        let operations_mailbox =
            non_empty_var("OPERATIONS_MAILBOX").unwrap_or_else(|| DEFAULT_OPERATIONS_MAILBOX.to_string());

        Ok(Self {
            database_url,
            max_connections,
            bind_addr,
            cors_allowed_origins,
            operations_mailbox,
            mail: MailConfig::new_from_env()?,
        })
    }
}

impl MailConfig {
    /// Reads `MAIL_API_URL`, `MAIL_API_TOKEN` and `MAIL_FROM`; `None` if any is missing.
    pub fn new_from_env() -> Result<Option<Self>, ConfigError> {
        let (Some(api_url), Some(api_token), Some(from_address)) = (
            non_empty_var("MAIL_API_URL"),
            non_empty_var("MAIL_API_TOKEN"),
            non_empty_var("MAIL_FROM"),
        ) else {
            return Ok(None);
        };
        let timeout_secs = parse_var("MAIL_TIMEOUT_SECS", DEFAULT_MAIL_TIMEOUT_SECS)?;

        Ok(Some(Self {
            api_url,
            api_token,
            from_address,
            timeout: Duration::from_secs(timeout_secs),
        }))
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match non_empty_var(name) {
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}
