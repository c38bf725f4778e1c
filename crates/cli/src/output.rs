// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Contributors

//! Shared output formatting for commands that print executions, queue
//! items, and stats either as plain text or as JSON (for scripting).

use clap::ValueEnum;
use devflow_core::execution::Execution;
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Format a millisecond epoch timestamp as relative time ("5s", "2m", "1h", "3d").
pub fn format_time_ago(epoch_ms: u64) -> String {
    if epoch_ms == 0 {
        return "-".to_string();
    }
    let now_ms = std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).unwrap_or_default().as_millis() as u64;
    let elapsed_secs = now_ms.saturating_sub(epoch_ms) / 1000;
    format_elapsed(elapsed_secs)
}

fn format_elapsed(secs: u64) -> String {
    match secs {
        0..=59 => format!("{secs}s"),
        60..=3599 => format!("{}m", secs / 60),
        3600..=86399 => format!("{}h", secs / 3600),
        _ => format!("{}d", secs / 86400),
    }
}

pub fn print_execution(execution: &Execution, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(execution),
        OutputFormat::Text => {
            println!(
                "{}  {}  {}  {}",
                execution.id,
                execution.story_key,
                crate::color::status(&execution.status.to_string()),
                format_time_ago(execution.started_at),
            );
            for step in &execution.steps {
                println!("  {:<20} {}", step.step_name, crate::color::status(&step.status.to_string()));
            }
        }
    }
}

pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => eprintln!("failed to serialize output: {e}"),
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
