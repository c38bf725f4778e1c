// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Contributors

//! Runtime record of one attempt to run a step.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Output lines kept per step execution. Older lines are dropped once this
/// cap is reached; the in-memory record never grows past it regardless of
/// how long the underlying process runs.
pub const MAX_OUTPUT_LINES: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
    TimedOut,
    Cancelled,
    Skipped,
}

crate::simple_display! {
    StepStatus {
        Pending => "pending",
        Running => "running",
        Succeeded => "succeeded",
        Failed => "failed",
        TimedOut => "timed_out",
        Cancelled => "cancelled",
        Skipped => "skipped",
    }
}

impl StepStatus {
    /// Whether this status represents a step that has stopped running,
    /// successfully or otherwise.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending | Self::Running)
    }

    pub fn is_success(self) -> bool {
        matches!(self, Self::Succeeded | Self::Skipped)
    }
}

/// Bounded FIFO buffer of captured process output lines.
///
/// Invariant: `len() <= MAX_OUTPUT_LINES` always holds; pushing past the cap
/// evicts the oldest line first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputBuffer {
    lines: std::collections::VecDeque<String>,
    truncated: bool,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: impl Into<String>) {
        if self.lines.len() >= MAX_OUTPUT_LINES {
            self.lines.pop_front();
            self.truncated = true;
        }
        self.lines.push_back(line.into());
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// True once at least one line has been evicted.
    pub fn truncated(&self) -> bool {
        self.truncated
    }
}

/// One attempt of one step within an execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepExecution {
    pub step_name: String,
    pub status: StepStatus,
    pub attempt: u32,
    pub command: Option<String>,
    pub start_time: Option<u64>,
    pub end_time: Option<u64>,
    pub output: OutputBuffer,
    pub error: Option<String>,
}

impl StepExecution {
    pub fn new(step_name: impl Into<String>) -> Self {
        Self {
            step_name: step_name.into(),
            status: StepStatus::Pending,
            attempt: 0,
            command: None,
            start_time: None,
            end_time: None,
            output: OutputBuffer::new(),
            error: None,
        }
    }

    /// Wall-clock duration of this attempt, or `None` until both timestamps
    /// are recorded.
    pub fn duration(&self) -> Option<Duration> {
        let start = self.start_time?;
        let end = self.end_time?;
        Some(Duration::from_millis(end.saturating_sub(start)))
    }
}

#[cfg(test)]
#[path = "step_execution_tests.rs"]
mod tests;
