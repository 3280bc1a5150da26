//! Configuration loading for sitedash
//!
//! Resolution follows a fixed priority order for every setting:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Default bind address for the dashboard service
pub const DEFAULT_HOST: &str = "127.0.0.1";
/// Default port for the dashboard service
pub const DEFAULT_PORT: u16 = 5780;

/// Environment variable naming the config file path
pub const ENV_CONFIG_PATH: &str = "SITEDASH_CONFIG";
/// Environment variable overriding the bind host
pub const ENV_HOST: &str = "SITEDASH_HOST";
/// Environment variable overriding the bind port
pub const ENV_PORT: &str = "SITEDASH_PORT";

/// Logging section of the TOML config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// tracing filter directive, e.g. "info" or "sitedash_ui=debug"
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// On-disk TOML configuration (all fields optional)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Directory of static dashboard assets to serve at `/`
    pub static_assets: Option<PathBuf>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub static_assets: Option<PathBuf>,
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            static_assets: None,
            log_level: LoggingConfig::default().level,
        }
    }
}

/// Default configuration file path for the platform
/// (`~/.config/sitedash/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("sitedash").join("config.toml"))
}

/// Read and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read config failed ({}): {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse config failed ({}): {}", path.display(), e)))
}

/// Resolve the effective service configuration
///
/// `cli_config`, `cli_host` and `cli_port` come from command-line flags and
/// take precedence over the environment, which takes precedence over the
/// TOML file. A missing config file is not an error; a file that exists but
/// fails to parse is.
pub fn resolve(
    cli_config: Option<&Path>,
    cli_host: Option<&str>,
    cli_port: Option<u16>,
) -> Result<ServiceConfig> {
    // Locate the TOML file: CLI flag > env var > platform default.
    let toml_path = cli_config
        .map(PathBuf::from)
        .or_else(|| std::env::var(ENV_CONFIG_PATH).ok().map(PathBuf::from))
        .or_else(default_config_path);

    let toml_config = match toml_path {
        Some(ref path) if path.exists() => load_toml_config(path)?,
        Some(ref path) if cli_config.is_some() => {
            // An explicitly requested file that does not exist is an error;
            // the implicit default path is allowed to be absent.
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        _ => TomlConfig::default(),
    };

    let host = cli_host
        .map(str::to_string)
        .or_else(|| std::env::var(ENV_HOST).ok())
        .or(toml_config.host)
        .unwrap_or_else(|| DEFAULT_HOST.to_string());

    let env_port = std::env::var(ENV_PORT).ok().and_then(|v| match v.parse() {
        Ok(p) => Some(p),
        Err(_) => {
            warn!("Ignoring non-numeric {}: {:?}", ENV_PORT, v);
            None
        }
    });
    let port = cli_port
        .or(env_port)
        .or(toml_config.port)
        .unwrap_or(DEFAULT_PORT);

    Ok(ServiceConfig {
        host,
        port,
        static_assets: toml_config.static_assets,
        log_level: toml_config.logging.level,
    })
}
