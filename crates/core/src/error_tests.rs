// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Contributors

use super::*;

#[test]
fn kind_is_stable_across_message_content() {
    let a = EngineError::StepFailure { step: "plan".into(), message: "boom".into() };
    let b = EngineError::StepFailure { step: "implement".into(), message: "other".into() };
    assert_eq!(a.kind(), b.kind());
    assert_eq!(a.kind(), "step_failure");
}

#[test]
fn display_includes_context() {
    let err = EngineError::Timeout { step: "plan".into(), timeout_secs: 30 };
    assert_eq!(err.to_string(), "step 'plan' timed out after 30s");
}

#[test]
fn every_kind_has_a_distinct_name() {
    let kinds = [
        EngineError::Timeout { step: "s".into(), timeout_secs: 1 }.kind(),
        EngineError::Cancelled.kind(),
        EngineError::StepFailure { step: "s".into(), message: "m".into() }.kind(),
        EngineError::TemplateError("m".into()).kind(),
        EngineError::PredicateError("m".into()).kind(),
        EngineError::StorageError("m".into()).kind(),
        EngineError::ConfigError("m".into()).kind(),
        EngineError::AuthError("m".into()).kind(),
    ];
    let unique: std::collections::HashSet<_> = kinds.iter().collect();
    assert_eq!(unique.len(), kinds.len());
}
