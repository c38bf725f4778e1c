// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Contributors

//! Engine configuration: defaults for timeouts/retries/workers, the data
//! and workflow directories, and the HTTP control surface's listen
//! address and auth token.
//!
//! Resolution order for the data directory mirrors the daemon-style tools
//! in this space: an explicit env var wins, then `XDG_DATA_HOME`, then a
//! platform data dir from `dirs`, finally `~/.local/share/devflow`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("failed to parse config file {path}: {source}")]
    Parse { path: PathBuf, source: serde_yaml::Error },
    #[error("failed to write config file {path}: {source}")]
    Write { path: PathBuf, source: std::io::Error },
    #[error("invalid name {0:?}: must not be empty, contain '/', '\\\\', \"..\", or start with '.'")]
    InvalidName(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

fn default_max_workers() -> usize {
    4
}

fn default_step_timeout_secs() -> u64 {
    600
}

fn default_step_retries() -> u32 {
    0
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_listen_addr() -> String {
    "127.0.0.1:4590".to_string()
}

/// Engine-wide defaults, loaded from `<data_dir>/config.yaml` and
/// overridable per-workflow at the step level.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub default_step_timeout_secs: u64,
    pub default_step_retries: u32,
    pub max_parallel_workers: usize,
    pub data_dir: PathBuf,
    pub workflow_dir: PathBuf,
    pub debounce_ms: u64,
    pub api_key: Option<String>,
    pub cors_allow_list: Vec<String>,
    pub listen_addr: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let data_dir = default_data_dir();
        Self {
            default_step_timeout_secs: default_step_timeout_secs(),
            default_step_retries: default_step_retries(),
            max_parallel_workers: default_max_workers(),
            workflow_dir: data_dir.join("workflows"),
            data_dir,
            debounce_ms: default_debounce_ms(),
            api_key: None,
            cors_allow_list: Vec::new(),
            listen_addr: default_listen_addr(),
        }
    }
}

impl EngineConfig {
    /// Load `<data_dir>/config.yaml` if present, falling back to defaults
    /// (with `data_dir` resolved via [`default_data_dir`]) when it isn't.
    pub fn load() -> Result<Self> {
        let data_dir = default_data_dir();
        Self::load_from_dir(&data_dir)
    }

    pub fn load_from_dir(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join("config.yaml");
        if !path.exists() {
            let mut config = Self::default();
            config.data_dir = data_dir.to_path_buf();
            config.workflow_dir = data_dir.join("workflows");
            return Ok(config);
        }
        let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read { path: path.clone(), source })?;
        let mut config: Self = serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse { path: path.clone(), source })?;
        config.max_parallel_workers = devflow_engine::clamp_workers(config.max_parallel_workers);
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir).map_err(|source| ConfigError::Write { path: self.data_dir.clone(), source })?;
        let path = self.data_dir.join("config.yaml");
        let raw = serde_yaml::to_string(self).map_err(|source| ConfigError::Parse { path: path.clone(), source })?;
        std::fs::write(&path, raw).map_err(|source| ConfigError::Write { path, source })
    }
}

/// `DEVFLOW_DATA_DIR` > `XDG_DATA_HOME/devflow` > `dirs::data_dir()/devflow`
/// > `~/.local/share/devflow`.
pub fn default_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("DEVFLOW_DATA_DIR") {
        return PathBuf::from(dir);
    }
    if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(xdg).join("devflow");
    }
    if let Some(dir) = dirs::data_dir() {
        return dir.join("devflow");
    }
    PathBuf::from(".devflow")
}

/// Names used as profile names or workflow filenames: no path separators,
/// no `..`, and no leading `.` (so they can't escape their directory or
/// collide with hidden marker files like `.active`).
pub fn validate_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains("..")
        && !name.starts_with('.');
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidName(name.to_string()))
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
