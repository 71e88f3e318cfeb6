use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub mail: MailConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: Option<u16>,
    pub unix_socket: Option<PathBuf>,
    #[serde(default = "default_num_threads")]
    pub num_threads: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for access tokens.
    pub jwt_secret: String,
    /// Sliding-expiry window in seconds: every valid use pushes the
    /// expiry this far into the future.
    #[serde(default = "default_token_lifetime")]
    pub token_lifetime: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    /// Mail gateway endpoint confirmation codes are POSTed to.
    pub endpoint: String,
    pub from_address: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_wal_path")]
    pub wal_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            wal_path: default_wal_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_console")]
    pub console: bool,
}

// Default value functions
fn default_num_threads() -> usize {
    num_cpus::get()
}

fn default_token_lifetime() -> i64 {
    86_400 // 24 hours
}

fn default_wal_path() -> PathBuf {
    PathBuf::from("ratehub.wal")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_console() -> bool {
    false
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.server.port.is_none() && self.server.unix_socket.is_none() {
            bail!("Either port or unix_socket must be specified in server config");
        }

        if let Some(port) = self.server.port {
            if port == 0 {
                bail!("Server port must be greater than 0");
            }
        }

        if self.server.num_threads == 0 {
            bail!("num_threads must be greater than 0");
        }

        if self.auth.jwt_secret.len() < 32 {
            bail!("jwt_secret must be at least 32 characters");
        }

        if self.auth.token_lifetime <= 0 {
            bail!("token_lifetime must be greater than 0");
        }

        if self.mail.endpoint.is_empty() {
            bail!("mail endpoint must not be empty");
        }

        if !self.mail.from_address.contains('@') {
            bail!("mail from_address must be an email address");
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            bail!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.logging.level
            );
        }

        let valid_formats = ["json", "console"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            bail!(
                "Invalid log format '{}'. Must be one of: json, console",
                self.logging.format
            );
        }

        Ok(())
    }
}
