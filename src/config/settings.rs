use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

use crate::audit::DEFAULT_LOG_CAPACITY;
use crate::providers::DeploymentMode;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub mode: DeploymentMode,
    #[serde(default)]
    pub channels: ChannelSettings,
    #[serde(default)]
    pub email: EmailSettings,
    #[serde(default)]
    pub sms: SmsSettings,
    #[serde(default)]
    pub push: PushSettings,
    #[serde(default)]
    pub log: LogSettings,
}

/// Per-channel enable flags
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelSettings {
    #[serde(default = "default_enabled")]
    pub email: bool,
    #[serde(default = "default_enabled")]
    pub sms: bool,
    #[serde(default = "default_enabled")]
    pub push: bool,
    #[serde(default = "default_enabled")]
    pub in_app: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailSettings {
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(default = "default_from")]
    pub from: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SmsSettings {
    pub gateway_url: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PushSettings {
    pub endpoint: Option<String>,
    pub server_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    /// Maximum retained audit log entries
    #[serde(default = "default_log_capacity")]
    pub capacity: usize,
}

fn default_enabled() -> bool {
    true
}

fn default_smtp_host() -> String {
    "localhost".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_from() -> String {
    "no-reply@example.com".to_string()
}

fn default_log_capacity() -> usize {
    DEFAULT_LOG_CAPACITY
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            // Start with default values
            .set_default("mode", "simulated")?
            .set_default("log.capacity", DEFAULT_LOG_CAPACITY as i64)?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables
            // MODE, CHANNELS__SMS, EMAIL__SMTP_HOST, LOG__CAPACITY, etc.
            .add_source(Environment::default().separator("__").try_parsing(true));

        builder.build()?.try_deserialize()
    }
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            email: true,
            sms: true,
            push: true,
            in_app: true,
        }
    }
}

impl Default for EmailSettings {
    fn default() -> Self {
        Self {
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            username: None,
            password: None,
            from: default_from(),
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            capacity: default_log_capacity(),
        }
    }
}
