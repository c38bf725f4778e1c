// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Contributors

//! YAML workflow definitions.

use devflow_core::error::EngineError;
use devflow_core::step::{canonicalize_name, StepTemplate, Workflow};

/// Parse a workflow definition from YAML text.
///
/// Step names are canonicalized after parsing, so `Plan`, `plan`, and
/// `  PLAN  ` in the source file all resolve to the same step.
pub fn load_from_str(yaml: &str) -> Result<Workflow, EngineError> {
    let mut workflow: Workflow =
        serde_yaml::from_str(yaml).map_err(|e| EngineError::ConfigError(format!("invalid workflow YAML: {e}")))?;
    for step in &mut workflow.steps {
        step.name = canonicalize_name(&step.name);
    }
    validate(&workflow)?;
    Ok(workflow)
}

pub fn load_from_path(path: &std::path::Path) -> Result<Workflow, EngineError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| EngineError::ConfigError(format!("failed to read workflow file {}: {e}", path.display())))?;
    load_from_str(&text)
}

fn validate(workflow: &Workflow) -> Result<(), EngineError> {
    if workflow.steps.is_empty() {
        return Err(EngineError::ConfigError("workflow must define at least one step".into()));
    }
    let mut seen = std::collections::HashSet::new();
    for step in &workflow.steps {
        if !seen.insert(step.name.clone()) {
            return Err(EngineError::ConfigError(format!("duplicate step name '{}'", step.name)));
        }
    }
    Ok(())
}

/// The workflow used when no workflow file is configured: a plan/implement/
/// test/review/commit pipeline suitable for driving a coding agent through
/// one work item end to end.
pub fn default_workflow() -> Workflow {
    Workflow {
        name: "default".to_string(),
        steps: vec![
            StepTemplate::new("plan", "Read {Story.FilePath} and write an implementation plan for {Story.Key}: {Story.Title}."),
            StepTemplate::new("implement", "Implement {Story.Key} following the plan from the previous step."),
            StepTemplate::new("test", "Run the project's test suite and fix any failures caused by this change."),
            StepTemplate::new("review", "Review the diff for {Story.Key} for correctness and style issues, and fix anything found."),
            StepTemplate::new("commit", "Commit the changes for {Story.Key} with a descriptive commit message."),
        ],
    }
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
