// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Contributors

//! Builds the `{Story.*}` variable map available to step prompt templates.

use devflow_core::story::Story;
use indexmap::IndexMap;

pub fn story_vars(story: &Story) -> IndexMap<String, String> {
    let mut vars = IndexMap::new();
    vars.insert("Story.Key".to_string(), story.key.clone());
    vars.insert("Story.Epic".to_string(), story.epic.to_string());
    vars.insert("Story.Status".to_string(), story.status.to_string());
    vars.insert("Story.Title".to_string(), story.title.clone());
    vars.insert("Story.FilePath".to_string(), story.file_path.display().to_string());
    vars
}

#[cfg(test)]
#[path = "vars_tests.rs"]
mod tests;
