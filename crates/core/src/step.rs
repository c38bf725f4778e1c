// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Contributors

//! Step template: one stage of a workflow, as defined by the workflow file.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_timeout() -> Duration {
    Duration::from_secs(600)
}

fn default_retries() -> u32 {
    0
}

/// A single named stage in a workflow, as parsed from the workflow definition.
///
/// `name` is canonicalized (trimmed, lowercased, spaces replaced with `-`) on
/// construction so it can be used as a stable map key and as a CLI argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepTemplate {
    pub name: String,
    pub prompt_template: String,
    #[serde(with = "humantime_duration", default = "default_timeout")]
    pub timeout: Duration,
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default)]
    pub skip_if: Option<String>,
    #[serde(default)]
    pub allow_failure: bool,
    #[serde(default)]
    pub env: IndexMap<String, String>,
    #[serde(default)]
    pub working_dir: Option<String>,
}

impl StepTemplate {
    pub fn new(name: impl Into<String>, prompt_template: impl Into<String>) -> Self {
        Self {
            name: canonicalize_name(&name.into()),
            prompt_template: prompt_template.into(),
            timeout: default_timeout(),
            retries: default_retries(),
            skip_if: None,
            allow_failure: false,
            env: IndexMap::new(),
            working_dir: None,
        }
    }
}

/// Canonicalize a step name: trim, lowercase, collapse internal whitespace
/// runs to a single `-`.
pub fn canonicalize_name(raw: &str) -> String {
    let trimmed = raw.trim().to_lowercase();
    let mut out = String::with_capacity(trimmed.len());
    let mut last_was_space = false;
    for ch in trimmed.chars() {
        if ch.is_whitespace() {
            if !last_was_space && !out.is_empty() {
                out.push('-');
            }
            last_was_space = true;
        } else {
            out.push(ch);
            last_was_space = false;
        }
    }
    out.trim_end_matches('-').to_string()
}

mod humantime_duration {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        d.as_secs().serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(d)?;
        Ok(Duration::from_secs(secs))
    }
}

/// An ordered collection of steps, keyed by their canonical name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Workflow {
    pub name: String,
    pub steps: Vec<StepTemplate>,
}

impl Workflow {
    pub fn step(&self, name: &str) -> Option<&StepTemplate> {
        let canon = canonicalize_name(name);
        self.steps.iter().find(|s| s.name == canon)
    }

    pub fn first_step(&self) -> Option<&StepTemplate> {
        self.steps.first()
    }

    /// The step immediately following `name`, or `None` if `name` is the last
    /// step or is not present.
    pub fn next_step(&self, name: &str) -> Option<&StepTemplate> {
        let canon = canonicalize_name(name);
        let idx = self.steps.iter().position(|s| s.name == canon)?;
        self.steps.get(idx + 1)
    }
}

#[cfg(test)]
#[path = "step_tests.rs"]
mod tests;
