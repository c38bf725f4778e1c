// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Contributors

use super::*;

fn write_source(dir: &Path, yaml: &str) -> PathBuf {
    let path = dir.join("source.yaml");
    std::fs::write(&path, yaml).unwrap();
    path
}

#[test]
fn loads_and_sorts_by_epic_then_key() {
    let dir = tempfile::tempdir().unwrap();
    let yaml = r#"
stories_dir: stories
items:
  - key: "2-1-gamma"
    status: backlog
  - key: "1-2-beta"
    status: ready-for-dev
  - key: "1-1-alpha"
    status: done
"#;
    let path = write_source(dir.path(), yaml);
    let stories = load_source(&path).unwrap();
    let keys: Vec<_> = stories.iter().map(|s| s.key.as_str()).collect();
    assert_eq!(keys, vec!["1-1-alpha", "1-2-beta", "2-1-gamma"]);
}

#[test]
fn resolves_stories_dir_relative_to_source_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("stories")).unwrap();
    std::fs::write(dir.path().join("stories/1-1-alpha.md"), "# alpha").unwrap();
    let yaml = "stories_dir: stories\nitems:\n  - key: \"1-1-alpha\"\n    status: backlog\n";
    let path = write_source(dir.path(), yaml);
    let stories = load_source(&path).unwrap();
    assert!(stories[0].file_exists);
}

#[test]
fn skips_items_with_unrecognized_status() {
    let dir = tempfile::tempdir().unwrap();
    let yaml = "items:\n  - key: \"1-1-alpha\"\n    status: not-a-real-status\n";
    let path = write_source(dir.path(), yaml);
    let stories = load_source(&path).unwrap();
    assert!(stories.is_empty());
}

#[test]
fn skips_items_with_malformed_keys() {
    let dir = tempfile::tempdir().unwrap();
    let yaml = "items:\n  - key: \"not-a-key\"\n    status: backlog\n";
    let path = write_source(dir.path(), yaml);
    let stories = load_source(&path).unwrap();
    assert!(stories.is_empty());
}

#[test]
fn explicit_title_overrides_the_default() {
    let dir = tempfile::tempdir().unwrap();
    let yaml = "items:\n  - key: \"1-1-alpha\"\n    status: backlog\n    title: \"Alpha feature\"\n";
    let path = write_source(dir.path(), yaml);
    let stories = load_source(&path).unwrap();
    assert_eq!(stories[0].title, "Alpha feature");
}

#[test]
fn missing_source_file_is_a_config_error() {
    let err = load_source(Path::new("/nonexistent/source.yaml")).unwrap_err();
    assert!(matches!(err, EngineError::ConfigError(_)));
}
