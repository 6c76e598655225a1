//! Configuration for durable-status display.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (DURABLE_STATUS_HISTORY_LIMIT, DURABLE_STATUS_SHOW_EXTRA)
//! 2. Config file (.durable-status/config.yaml, or ~/.config/durable-status/config.yaml)
//! 3. Defaults
//!
//! Config file discovery:
//! - Searches current directory and parents for .durable-status/config.yaml
//! - Falls back to the user config directory

use std::env::VarError;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

const CONFIG_DIR: &str = ".durable-status";
const CONFIG_FILE: &str = "config.yaml";

const ENV_HISTORY_LIMIT: &str = "DURABLE_STATUS_HISTORY_LIMIT";
const ENV_SHOW_EXTRA: &str = "DURABLE_STATUS_SHOW_EXTRA";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DisplayConfig {
    /// Maximum history events printed by `show --history`
    pub history_limit: Option<usize>,
    /// Whether extra (undeclared) fields are printed
    pub show_extra: Option<bool>,
}

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    /// Display settings
    pub display: DisplaySettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplaySettings {
    pub history_limit: usize,
    pub show_extra: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            history_limit: 20,
            show_extra: true,
        }
    }
}

/// Find config file by searching `start` and its parents
fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_DIR).join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    let user_config = dirs::config_dir()?.join("durable-status").join(CONFIG_FILE);
    user_config.exists().then_some(user_config)
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Raw environment overrides, read before any parsing
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub history_limit: Option<String>,
    pub show_extra: Option<String>,
}

impl EnvOverrides {
    /// Read overrides from the process environment
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            history_limit: read_env(ENV_HISTORY_LIMIT)?,
            show_extra: read_env(ENV_SHOW_EXTRA)?,
        })
    }
}

/// Read a variable, treating only an absent one as unset
fn read_env(name: &str) -> Result<Option<String>> {
    match std::env::var(name) {
        Ok(raw) => Ok(Some(raw)),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(raw)) => {
            anyhow::bail!("Invalid value for {}: {:?} (not valid unicode)", name, raw)
        }
    }
}

fn parse_override<T: FromStr>(name: &str, raw: Option<&str>) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    raw.map(|raw| {
        raw.trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid value for {}: {:?} ({})", name, raw, e))
    })
    .transpose()
}

/// Layer environment overrides over config file values over defaults
fn resolve_display(file: &DisplayConfig, env: &EnvOverrides) -> Result<DisplaySettings> {
    let defaults = DisplaySettings::default();

    let history_limit = parse_override(ENV_HISTORY_LIMIT, env.history_limit.as_deref())?
        .or(file.history_limit)
        .unwrap_or(defaults.history_limit);

    let show_extra = parse_override(ENV_SHOW_EXTRA, env.show_extra.as_deref())?
        .or(file.show_extra)
        .unwrap_or(defaults.show_extra);

    Ok(DisplaySettings {
        history_limit,
        show_extra,
    })
}

/// Load configuration, searching for a config file from `start`
fn load_config_from(start: &Path, env: &EnvOverrides) -> Result<ResolvedConfig> {
    let config_file = find_config_file(start);

    let file_display = match config_file {
        Some(ref path) => load_config_file(path)?.display,
        None => DisplayConfig::default(),
    };

    Ok(ResolvedConfig {
        display: resolve_display(&file_display, env)?,
        config_file,
    })
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    load_config_from(&cwd, &EnvOverrides::from_env()?)
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| format!("{:#}", e)));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}
