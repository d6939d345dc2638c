use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "Carebook";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn default_log_filter() -> String {
    "carebook=info".to_string()
}

/// Get the application data directory
/// ~/Carebook/ on all platforms (user-visible)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Carebook")
}

pub fn default_db_path() -> PathBuf {
    app_data_dir().join("carebook.db")
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid listen address: {0}")]
    InvalidAddr(String),
}

/// Payment gateway credentials. The secret never leaves this process;
/// only `key_id` is handed to clients.
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    pub key_id: String,
    pub secret: String,
}

/// Mail relay credentials. All three must be present for outbound
/// mail to be enabled; otherwise sends are skipped, not failed.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub relay_url: String,
    pub relay_token: String,
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub db_path: PathBuf,
    pub payment: PaymentConfig,
    pub mail: Option<MailConfig>,
}

impl Config {
    /// Read configuration from the environment.
    ///
    /// `PAYMENT_KEY_ID` and `PAYMENT_SECRET` are required — the
    /// booking flow cannot run without the verification gate.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_addr = match std::env::var("CAREBOOK_ADDR") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigError::InvalidAddr(raw))?,
            Err(_) => SocketAddr::from(([127, 0, 0, 1], 5000)),
        };

        let db_path = std::env::var("CAREBOOK_DB")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_db_path());

        let payment = PaymentConfig {
            key_id: std::env::var("PAYMENT_KEY_ID")
                .map_err(|_| ConfigError::MissingVar("PAYMENT_KEY_ID"))?,
            secret: std::env::var("PAYMENT_SECRET")
                .map_err(|_| ConfigError::MissingVar("PAYMENT_SECRET"))?,
        };

        let mail = match (
            std::env::var("MAIL_RELAY_URL"),
            std::env::var("MAIL_RELAY_TOKEN"),
            std::env::var("MAIL_FROM"),
        ) {
            (Ok(relay_url), Ok(relay_token), Ok(from)) => Some(MailConfig {
                relay_url,
                relay_token,
                from,
            }),
            _ => None,
        };

        Ok(Self {
            bind_addr,
            db_path,
            payment,
            mail,
        })
    }
}
