use crate::error::ExporterError;
use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub qsan: QsanConfig,
    #[serde(default)]
    pub zabbix: ZabbixConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct QsanConfig {
    #[serde(default)]
    pub host: String,
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_password")]
    pub password: SecretString,
    #[serde(default = "default_use_tls")]
    pub use_tls: bool,
    #[serde(default = "default_verify_ssl")]
    pub verify_ssl: bool,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ZabbixConfig {
    /// Host name the array is registered under in Zabbix
    #[serde(default = "default_zabbix_host")]
    pub host: String,
}

impl Default for ZabbixConfig {
    fn default() -> Self {
        Self {
            host: default_zabbix_host(),
        }
    }
}

impl Default for QsanConfig {
    fn default() -> Self {
        Self::for_host(String::new())
    }
}

impl QsanConfig {
    /// Config for `host` with every other field at its default.
    pub fn for_host(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            username: default_username(),
            password: default_password(),
            use_tls: default_use_tls(),
            verify_ssl: default_verify_ssl(),
            timeout_seconds: default_timeout(),
        }
    }

    /// Rejects settings no session can be opened with.
    pub fn validate(&self) -> std::result::Result<(), ExporterError> {
        if self.host.trim().is_empty() {
            return Err(ExporterError::Config(
                "no QSAN host configured (use --host, QSAN_HOST or qsan.host)".to_string(),
            ));
        }
        if self.timeout_seconds == 0 {
            return Err(ExporterError::Config(
                "qsan.timeout_seconds must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn base_url(&self) -> String {
        let scheme = if self.use_tls { "https" } else { "http" };
        format!("{}://{}", scheme, self.host)
    }
}

fn default_username() -> String {
    "user".to_string()
}

fn default_password() -> SecretString {
    SecretString::from("1234")
}

fn default_use_tls() -> bool {
    false
}

fn default_verify_ssl() -> bool {
    true
}

fn default_timeout() -> u64 {
    30
}

fn default_zabbix_host() -> String {
    "zabbix host undefined".to_string()
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        // Load environment variables from .env if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("QSAN_EXPORTER").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}
