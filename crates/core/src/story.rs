// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Contributors

//! Work item identity and status.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Semantic status of a work item, as recorded in the source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StoryStatus {
    InProgress,
    ReadyForDev,
    Backlog,
    Done,
    Blocked,
}

crate::simple_display! {
    StoryStatus {
        InProgress => "in-progress",
        ReadyForDev => "ready-for-dev",
        Backlog => "backlog",
        Done => "done",
        Blocked => "blocked",
    }
}

impl StoryStatus {
    /// Parse one of the five status strings used in the source file.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "in-progress" => Some(Self::InProgress),
            "ready-for-dev" => Some(Self::ReadyForDev),
            "backlog" => Some(Self::Backlog),
            "done" => Some(Self::Done),
            "blocked" => Some(Self::Blocked),
            _ => None,
        }
    }
}

/// One unit of work drawn from the source file.
///
/// `Key` matches `<epic>-<index>-<slug>`; `Epic` is the leading integer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    pub key: String,
    pub epic: u32,
    pub status: StoryStatus,
    pub title: String,
    pub file_path: PathBuf,
    pub file_exists: bool,
}

impl Story {
    /// Build a work item from a parsed key/status pair and a stories directory
    /// used to probe for the expected on-disk file.
    ///
    /// Returns `None` if `key` does not match `^\d+-\d+-.+$`.
    pub fn from_key(key: &str, status: StoryStatus, stories_dir: &std::path::Path) -> Option<Self> {
        let epic = leading_epic(key)?;
        let file_path = stories_dir.join(format!("{key}.md"));
        let file_exists = file_path.exists();
        Some(Self {
            key: key.to_string(),
            epic,
            status,
            title: key.to_string(),
            file_path,
            file_exists,
        })
    }
}

/// Extract the leading `<epic>` integer from a key matching `^\d+-\d+-.+$`.
pub fn leading_epic(key: &str) -> Option<u32> {
    let mut parts = key.splitn(3, '-');
    let epic = parts.next()?;
    let index = parts.next()?;
    let slug = parts.next()?;
    if epic.is_empty() || index.is_empty() || slug.is_empty() {
        return None;
    }
    if !epic.chars().all(|c| c.is_ascii_digit()) || !index.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    epic.parse().ok()
}

/// Sort key for ascending `(epic, key)` ordering.
pub fn sort_key(story: &Story) -> (u32, &str) {
    (story.epic, story.key.as_str())
}

#[cfg(test)]
#[path = "story_tests.rs"]
mod tests;
