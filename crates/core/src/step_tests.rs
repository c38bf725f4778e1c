// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Contributors

use super::*;

#[test]
fn canonicalize_trims_and_lowercases() {
    assert_eq!(canonicalize_name("  Run Tests  "), "run-tests");
}

#[test]
fn canonicalize_collapses_whitespace_runs() {
    assert_eq!(canonicalize_name("Run    All   Tests"), "run-all-tests");
}

#[test]
fn new_applies_canonicalization_to_name() {
    let step = StepTemplate::new("Implement Story", "do the thing");
    assert_eq!(step.name, "implement-story");
    assert_eq!(step.timeout, Duration::from_secs(600));
    assert_eq!(step.retries, 0);
}

#[test]
fn workflow_step_lookup_canonicalizes_query() {
    let wf = Workflow { name: "default".into(), steps: vec![StepTemplate::new("Plan", "p"), StepTemplate::new("Implement", "i")] };
    assert!(wf.step("  PLAN ").is_some());
    assert_eq!(wf.step("missing"), None);
}

#[test]
fn next_step_returns_none_past_the_end() {
    let wf = Workflow { name: "default".into(), steps: vec![StepTemplate::new("plan", "p"), StepTemplate::new("implement", "i")] };
    assert_eq!(wf.next_step("implement"), None);
    assert_eq!(wf.next_step("plan").unwrap().name, "implement");
}

#[test]
fn first_step_is_none_for_empty_workflow() {
    let wf = Workflow::default();
    assert!(wf.first_step().is_none());
}
