use crate::validation::retry::RetryPolicy;
use log::{info, warn};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const CONFIG_FILENAME: &str = "phonecheck.toml";
const CONFIG_PATH_ENV: &str = "PHONECHECK_CONFIG";
const API_KEY_ENV: &str = "API_KEY";
const HOST_ENV: &str = "PHONECHECK_HOST";
const PORT_ENV: &str = "PHONECHECK_PORT";

/// Default configuration embedded in the binary.
const DEFAULT_CONFIG: &str = r#"
[server]
host = "127.0.0.1"
port = 5000
max_upload_bytes = 10485760

[upstream]
base_url = "https://api.apilayer.com/number_verification/validate"
api_key = ""
timeout_secs = 30

[retry]
attempts = 3
delay_ms = 1000

[batch]
concurrency = 1
retain_finished_jobs = 20
"#;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    MissingConfigFile(PathBuf),
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid PHONECHECK_PORT value: {0}")]
    InvalidPort(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub retry: RetryConfig,
    pub batch: BatchConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
    pub attempts: u32,
    pub delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BatchConfig {
    /// Numbers of one batch validated at the same time.
    pub concurrency: usize,
    /// Finished file jobs kept for results and downloads; older ones are
    /// dropped.
    pub retain_finished_jobs: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.apilayer.com/number_verification/validate".to_string(),
            api_key: String::new(),
            timeout_secs: 30,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay_ms: 1000,
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: 1,
            retain_finished_jobs: 20,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.attempts, Duration::from_millis(self.delay_ms))
    }
}

/// Loads configuration.
///
/// Sources, later ones win:
/// 1. Embedded defaults
/// 2. The file named by `PHONECHECK_CONFIG`, or `phonecheck.toml` in the
///    working directory when it exists
/// 3. `API_KEY`, `PHONECHECK_HOST` and `PHONECHECK_PORT`
pub fn load_config() -> Result<AppConfig> {
    let mut config = match env::var_os(CONFIG_PATH_ENV) {
        Some(path) => load_from_path(Path::new(&path))?,
        None => {
            let local = Path::new(CONFIG_FILENAME);
            if local.exists() {
                load_from_path(local)?
            } else {
                info!("Using default embedded configuration");
                embedded_config()?
            }
        }
    };

    apply_env_overrides(&mut config, |key| env::var(key).ok())?;

    if config.upstream.api_key.trim().is_empty() {
        warn!("No API key configured; upstream validation calls will fail");
    }
    Ok(config)
}

fn embedded_config() -> Result<AppConfig> {
    toml::from_str(DEFAULT_CONFIG).map_err(|source| ConfigError::Parse {
        path: PathBuf::from("<embedded>"),
        source,
    })
}

pub fn load_from_path(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Err(ConfigError::MissingConfigFile(path.to_path_buf()));
    }
    info!("Loading config from: {}", path.display());
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = lookup(API_KEY_ENV) {
        config.upstream.api_key = key;
    }
    if let Some(host) = lookup(HOST_ENV).filter(|h| !h.trim().is_empty()) {
        config.server.host = host;
    }
    if let Some(port) = lookup(PORT_ENV) {
        config.server.port = port
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidPort(port.clone()))?;
    }
    Ok(())
}
