// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Contributors

use super::*;

const YAML: &str = r#"
name: custom
steps:
  - name: Plan
    prompt_template: "plan {Story.Key}"
    timeout: 120
    retries: 2
  - name: Implement
    prompt_template: "implement {Story.Key}"
"#;

#[test]
fn loads_and_canonicalizes_step_names() {
    let workflow = load_from_str(YAML).unwrap();
    assert_eq!(workflow.name, "custom");
    assert_eq!(workflow.steps[0].name, "plan");
    assert_eq!(workflow.steps[0].retries, 2);
    assert_eq!(workflow.steps[1].name, "implement");
}

#[test]
fn rejects_empty_workflow() {
    let err = load_from_str("name: empty\nsteps: []").unwrap_err();
    assert!(matches!(err, EngineError::ConfigError(_)));
}

#[test]
fn rejects_duplicate_step_names_after_canonicalization() {
    let yaml = r#"
name: dup
steps:
  - name: Plan
    prompt_template: "a"
  - name: "  plan  "
    prompt_template: "b"
"#;
    let err = load_from_str(yaml).unwrap_err();
    assert!(err.to_string().contains("duplicate"));
}

#[test]
fn default_workflow_has_five_steps_in_order() {
    let workflow = default_workflow();
    let names: Vec<_> = workflow.steps.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["plan", "implement", "test", "review", "commit"]);
}

#[test]
fn load_from_path_reads_file_contents() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("workflow.yaml");
    std::fs::write(&path, YAML).unwrap();
    let workflow = load_from_path(&path).unwrap();
    assert_eq!(workflow.name, "custom");
}

#[test]
fn load_from_path_reports_missing_file() {
    let err = load_from_path(std::path::Path::new("/nonexistent/workflow.yaml")).unwrap_err();
    assert!(matches!(err, EngineError::ConfigError(_)));
}
