// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Contributors

use super::*;

fn vars(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

#[test]
fn substitutes_simple_placeholder() {
    let vars = vars(&[("Story.Key", "1-2-add-login")]);
    assert_eq!(interpolate("work on {Story.Key}", &vars).unwrap(), "work on 1-2-add-login");
}

#[test]
fn unresolved_placeholder_is_a_hard_error() {
    let vars = vars(&[]);
    let err = interpolate("work on {Story.Key}", &vars).unwrap_err();
    assert!(matches!(err, EngineError::TemplateError(_)));
    assert!(err.to_string().contains("Story.Key"));
}

#[test]
fn lists_every_missing_placeholder_once() {
    let vars = vars(&[]);
    let err = interpolate("{A} and {B} and {A} again", &vars).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("A"));
    assert!(msg.contains("B"));
}

#[test]
fn shell_variant_escapes_single_quotes() {
    let vars = vars(&[("Title", "it's a test")]);
    let rendered = interpolate_shell("echo '{Title}'", &vars).unwrap();
    assert_eq!(rendered, "echo 'it'\\''s a test'");
}

#[test]
fn plain_variant_does_not_escape() {
    let vars = vars(&[("Title", "it's a test")]);
    let rendered = interpolate("{Title}", &vars).unwrap();
    assert_eq!(rendered, "it's a test");
}
