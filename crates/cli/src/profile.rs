// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Contributors

//! Profiles let one machine keep several independent data directories
//! (e.g. separate work-item sources) side by side. Each profile is a YAML
//! file under `profiles/<name>.yaml`; an `.active` marker file names the
//! one `devflow` uses when `--profile` isn't passed explicitly.

use crate::config::{validate_name, ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub data_dir: PathBuf,
    pub created_at: u64,
}

fn profiles_dir(root: &Path) -> PathBuf {
    root.join("profiles")
}

fn profile_path(root: &Path, name: &str) -> PathBuf {
    profiles_dir(root).join(format!("{name}.yaml"))
}

fn active_marker_path(root: &Path) -> PathBuf {
    root.join(".active")
}

impl Profile {
    pub fn create(root: &Path, name: &str, data_dir: PathBuf, created_at: u64) -> Result<Self> {
        validate_name(name)?;
        let profile = Self { name: name.to_string(), data_dir, created_at };
        let dir = profiles_dir(root);
        std::fs::create_dir_all(&dir).map_err(|source| ConfigError::Write { path: dir.clone(), source })?;
        let path = profile_path(root, name);
        let raw = serde_yaml::to_string(&profile).map_err(|source| ConfigError::Parse { path: path.clone(), source })?;
        std::fs::write(&path, raw).map_err(|source| ConfigError::Write { path, source })?;
        Ok(profile)
    }

    pub fn load(root: &Path, name: &str) -> Result<Self> {
        validate_name(name)?;
        let path = profile_path(root, name);
        let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read { path: path.clone(), source })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse { path, source })
    }

    pub fn list(root: &Path) -> Result<Vec<Self>> {
        let dir = profiles_dir(root);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut profiles = Vec::new();
        let entries = std::fs::read_dir(&dir).map_err(|source| ConfigError::Read { path: dir.clone(), source })?;
        for entry in entries {
            let entry = entry.map_err(|source| ConfigError::Read { path: dir.clone(), source })?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("yaml") {
                continue;
            }
            let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read { path: path.clone(), source })?;
            profiles.push(serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse { path, source })?);
        }
        profiles.sort_by(|a: &Self, b: &Self| a.name.cmp(&b.name));
        Ok(profiles)
    }

    pub fn set_active(root: &Path, name: &str) -> Result<()> {
        validate_name(name)?;
        let path = active_marker_path(root);
        std::fs::create_dir_all(root).map_err(|source| ConfigError::Write { path: root.to_path_buf(), source })?;
        std::fs::write(&path, name).map_err(|source| ConfigError::Write { path, source })
    }

    pub fn active(root: &Path) -> Result<Option<String>> {
        let path = active_marker_path(root);
        if !path.exists() {
            return Ok(None);
        }
        let name = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read { path, source })?;
        Ok(Some(name.trim().to_string()))
    }
}

#[cfg(test)]
#[path = "profile_tests.rs"]
mod tests;
