//! Handles settings for the application. Configuration is read from an
//! optional `settings.toml` in the working directory and from `SHORTLET__*`
//! environment variables, the latter taking precedence.
//!
//! ```toml
//! [app]
//! level = "info"
//!
//! [server]
//! bind = "0.0.0.0"
//! port = 3000
//! database = { sqlite = "shortlet.db" }
//!
//! [notifier]
//! webhook_url = "https://hooks.example.com/bookings"
//! timeout_secs = 5
//! ```
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

#[derive(Debug, Deserialize)]
pub struct Notifier {
    pub webhook_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    5
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Option<Server>,
    pub notifier: Option<Notifier>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(
                Environment::with_prefix("SHORTLET")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    #[cfg(test)]
    fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        use config::FileFormat;

        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}
