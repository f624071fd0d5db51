use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::template;

const APP_DIR_NAME: &str = "quickcuts";
const CONFIG_FILE_NAME: &str = "config.json";
const HISTORY_DB_FILE_NAME: &str = "history.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Template of the program that prints one command per line.
    pub command_list_program: String,
    /// Template of the program that receives `<template args> <command> <user args>`.
    pub command_execute_program: String,
    pub history_db_path: PathBuf,
    pub log_to_file: bool,
    pub path_search_max_depth: u16,
    pub path_search_budget_ms: u64,
    #[serde(skip)]
    pub config_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let base = stable_app_data_dir();
        Self {
            command_list_program: "quickcuts list".to_string(),
            command_execute_program: "quickcuts run".to_string(),
            history_db_path: base.join(HISTORY_DB_FILE_NAME),
            log_to_file: false,
            path_search_max_depth: 32,
            path_search_budget_ms: 2_000,
            config_path: base.join(CONFIG_FILE_NAME),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(String),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(error) => write!(f, "io error: {error}"),
            Self::Parse(error) => write!(f, "parse error: {error}"),
            Self::Invalid(error) => write!(f, "invalid config: {error}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

pub fn stable_app_data_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(app_data) = std::env::var_os("APPDATA").filter(|v| !v.is_empty()) {
            return PathBuf::from(app_data).join("QuickCuts");
        }
    }

    #[cfg(not(target_os = "windows"))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
            return PathBuf::from(xdg).join(APP_DIR_NAME);
        }
        if let Some(home) = std::env::var_os("HOME").filter(|v| !v.is_empty()) {
            return PathBuf::from(home).join(".config").join(APP_DIR_NAME);
        }
    }

    std::env::temp_dir().join(APP_DIR_NAME)
}

pub fn validate(cfg: &Config) -> Result<(), String> {
    template::parse(&cfg.command_list_program)
        .map_err(|e| format!("command_list_program: {e}"))?;
    template::parse(&cfg.command_execute_program)
        .map_err(|e| format!("command_execute_program: {e}"))?;

    if cfg.path_search_max_depth < 1 || cfg.path_search_max_depth > 256 {
        return Err("path_search_max_depth out of range".into());
    }

    if cfg.path_search_budget_ms < 50 || cfg.path_search_budget_ms > 60_000 {
        return Err("path_search_budget_ms out of range".into());
    }

    if cfg.history_db_path.as_os_str().is_empty() {
        return Err("history_db_path is required".into());
    }

    if cfg.config_path.as_os_str().is_empty() {
        return Err("config_path is required".into());
    }

    Ok(())
}

/// Loads the config at `path` (or the default location). A missing file
/// yields defaults bound to that path.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| Config::default().config_path);

    let mut cfg = if config_path.exists() {
        let raw = std::fs::read_to_string(&config_path)?;
        parse_config(&raw, &config_path)?
    } else {
        Config::default()
    };
    cfg.config_path = config_path;

    validate(&cfg).map_err(ConfigError::Invalid)?;
    Ok(cfg)
}

pub fn save(cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = cfg.config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let encoded = encode_config(cfg)?;
    std::fs::write(&cfg.config_path, encoded)?;
    Ok(())
}

/// Restores defaults at `path`, keeping the file location.
pub fn reset(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut cfg = Config::default();
    if let Some(path) = path {
        cfg.config_path = path.to_path_buf();
    }
    save(&cfg)?;
    Ok(cfg)
}

fn is_toml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
}

fn parse_config(raw: &str, path: &Path) -> Result<Config, ConfigError> {
    if is_toml(path) {
        return toml::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()));
    }
    json5::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))
}

fn encode_config(cfg: &Config) -> Result<String, ConfigError> {
    if is_toml(&cfg.config_path) {
        return toml::to_string_pretty(cfg).map_err(|e| ConfigError::Parse(e.to_string()));
    }
    serde_json::to_string_pretty(cfg).map_err(|e| ConfigError::Parse(e.to_string()))
}
