use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ErrorCode;
use crate::export::EXPORT_FILE_NAME;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "JD_DATA_DIR";

const APP_DIR: &str = "jd-requests";
const FALLBACK_DATA_DIR: &str = ".jd";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::ConfigParseError
    }
}

/// Per-data-set settings, read from `<data_dir>/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_export_file_name")]
    pub file_name: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_name: default_export_file_name(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

impl StorageConfig {
    #[must_use]
    pub const fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

/// Per-user settings, read from `<config_dir>/jd-requests/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

/// # Errors
///
/// Returns [`ConfigError`] when the file exists but cannot be read or parsed.
pub fn load_data_config(data_dir: &Path) -> Result<DataConfig, ConfigError> {
    load_toml(&data_dir.join("config.toml"))
}

/// # Errors
///
/// Returns [`ConfigError`] when the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig, ConfigError> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };
    load_toml(&config_dir.join(APP_DIR).join("config.toml"))
}

fn load_toml<T: Default + for<'de> Deserialize<'de>>(path: &Path) -> Result<T, ConfigError> {
    if !path.exists() {
        return Ok(T::default());
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str::<T>(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolve the data directory.
///
/// Precedence: CLI flag, `JD_DATA_DIR`, user config, platform data dir,
/// then `./.jd`.
#[must_use]
pub fn resolve_data_dir(cli_flag: Option<&Path>, user: &UserConfig) -> PathBuf {
    let env_dir = std::env::var_os(DATA_DIR_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from);
    resolve_data_dir_inner(cli_flag, env_dir, user.data_dir.as_deref(), dirs::data_dir())
}

fn resolve_data_dir_inner(
    cli_flag: Option<&Path>,
    env_dir: Option<PathBuf>,
    user_dir: Option<&Path>,
    platform_dir: Option<PathBuf>,
) -> PathBuf {
    if let Some(dir) = cli_flag {
        return dir.to_path_buf();
    }
    if let Some(dir) = env_dir {
        return dir;
    }
    if let Some(dir) = user_dir {
        return dir.to_path_buf();
    }
    platform_dir.map_or_else(|| PathBuf::from(FALLBACK_DATA_DIR), |dir| dir.join(APP_DIR))
}

fn default_export_file_name() -> String {
    EXPORT_FILE_NAME.to_string()
}

const fn default_lock_timeout_ms() -> u64 {
    2000
}
