// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Contributors

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Loads the work-item source file: the YAML manifest that lists every
//! story, its status, and the directory its detail file lives in.

use devflow_core::error::EngineError;
use devflow_core::story::{Story, StoryStatus};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct SourceFile {
    #[serde(default = "default_stories_dir")]
    stories_dir: PathBuf,
    items: Vec<SourceItem>,
}

fn default_stories_dir() -> PathBuf {
    PathBuf::from("stories")
}

#[derive(Debug, Deserialize)]
struct SourceItem {
    key: String,
    status: String,
    #[serde(default)]
    title: Option<String>,
}

/// Parse a source file and resolve each item against its stories
/// directory (relative to the source file's own directory, unless
/// `stories_dir` is absolute).
///
/// Items whose `key` doesn't match `^\d+-\d+-.+$` or whose `status` isn't
/// one of the five recognized values are skipped with a warning rather
/// than aborting the whole load — one malformed row shouldn't block every
/// other story in the backlog.
pub fn load_source(path: &Path) -> Result<Vec<Story>, EngineError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| EngineError::ConfigError(format!("failed to read source file {}: {e}", path.display())))?;
    let source: SourceFile =
        serde_yaml::from_str(&text).map_err(|e| EngineError::ConfigError(format!("invalid source file YAML: {e}")))?;

    let base = path.parent().unwrap_or_else(|| Path::new("."));
    let stories_dir = if source.stories_dir.is_absolute() { source.stories_dir } else { base.join(source.stories_dir) };

    let mut stories = Vec::with_capacity(source.items.len());
    for item in source.items {
        let Some(status) = StoryStatus::parse(&item.status) else {
            tracing::warn!(key = %item.key, status = %item.status, "skipping item with unrecognized status");
            continue;
        };
        let Some(mut story) = Story::from_key(&item.key, status, &stories_dir) else {
            tracing::warn!(key = %item.key, "skipping item with malformed key");
            continue;
        };
        if let Some(title) = item.title {
            story.title = title;
        }
        stories.push(story);
    }

    stories.sort_by(|a, b| devflow_core::story::sort_key(a).cmp(&devflow_core::story::sort_key(b)));
    Ok(stories)
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
