// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Contributors

//! Prompt template interpolation.
//!
//! Placeholders use single braces (`{Story.Key}`), unlike shell-style
//! `${var}` expansion, and any placeholder left unresolved after
//! substitution is a hard error rather than being passed through
//! verbatim: a prompt with a typo'd variable should never silently reach
//! the agent with the literal placeholder text in it.

use devflow_core::error::EngineError;
use indexmap::IndexMap;
use regex::Regex;
use std::sync::LazyLock;

/// Matches `{name}` or `{namespace.name}` placeholders.
#[allow(clippy::expect_used)]
static VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([a-zA-Z_][a-zA-Z0-9_]*(?:\.[a-zA-Z_][a-zA-Z0-9_-]*)*)\}")
        .expect("constant regex pattern is valid")
});

/// Escape a string for safe use inside a single-quoted shell context.
pub fn escape_for_shell(s: &str) -> String {
    s.replace('\'', "'\\''")
}

/// Substitute every `{name}` placeholder in `template` with its value from
/// `vars`.
///
/// Returns [`EngineError::TemplateError`] naming every placeholder that had
/// no matching entry in `vars`; none are substituted partially.
pub fn interpolate(template: &str, vars: &IndexMap<String, String>) -> Result<String, EngineError> {
    interpolate_inner(template, vars, false)
}

/// Like [`interpolate`], but shell-escapes substituted values. Use this to
/// render a step's command; use [`interpolate`] for the prompt text itself.
pub fn interpolate_shell(template: &str, vars: &IndexMap<String, String>) -> Result<String, EngineError> {
    interpolate_inner(template, vars, true)
}

fn interpolate_inner(template: &str, vars: &IndexMap<String, String>, shell_escape: bool) -> Result<String, EngineError> {
    let mut missing = Vec::new();
    let rendered = VAR_PATTERN
        .replace_all(template, |caps: &regex::Captures| {
            let name = &caps[1];
            match vars.get(name) {
                Some(val) if shell_escape => escape_for_shell(val),
                Some(val) => val.clone(),
                None => {
                    missing.push(name.to_string());
                    String::new()
                }
            }
        })
        .to_string();

    if missing.is_empty() {
        Ok(rendered)
    } else {
        missing.sort();
        missing.dedup();
        Err(EngineError::TemplateError(format!("unresolved placeholder(s): {}", missing.join(", "))))
    }
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
