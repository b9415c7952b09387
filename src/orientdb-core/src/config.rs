use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Server URL and database name, e.g. `http://localhost:2480/demo`
    #[serde(default = "default_database_path")]
    pub database_path: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,

    /// Parse response bodies as JSON (false keeps them as text)
    #[serde(default = "default_structured_responses")]
    pub structured_responses: bool,

    /// Per-request timeout; requests wait indefinitely when unset
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub console: ConsoleConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    /// Env filter directives used when RUST_LOG is not set
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_dir() -> String {
    "./logs".to_string()
}

fn default_log_filter() -> String {
    "orientdb_console=info,orientdb_rs=debug,orientdb_core=debug".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            filter: default_log_filter(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ConsoleConfig {
    /// Limit applied to console queries when none is given
    #[serde(default)]
    pub default_limit: Option<String>,
    /// Fetch plan applied to console queries when none is given
    #[serde(default)]
    pub default_fetch_plan: Option<String>,
}

fn default_database_path() -> String {
    "http://localhost:2480/demo".to_string()
}

fn default_structured_responses() -> bool {
    true
}

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        tracing::debug!(path, database = %config.database_path, "Loaded configuration");
        Ok(config)
    }

    /// Username and password, only when both are configured
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some((user.as_str(), pass.as_str())),
            _ => None,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            username: None,
            password: None,
            structured_responses: default_structured_responses(),
            timeout_secs: None,
            logging: LoggingConfig::default(),
            console: ConsoleConfig::default(),
        }
    }
}
