// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Contributors

//! Execution: the full run of a workflow against a single work item.

use crate::step_execution::{StepExecution, StepStatus};
use serde::{Deserialize, Serialize};

crate::define_id! {
    pub struct ExecutionId("exc-");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

crate::simple_display! {
    ExecutionStatus {
        Running => "running",
        Succeeded => "succeeded",
        Failed => "failed",
        Cancelled => "cancelled",
    }
}

impl ExecutionStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Running)
    }
}

/// The run of a workflow's steps against a single work item.
///
/// Invariant: `current` is always a valid index into `steps` while
/// `status == Running`, and `progress_percent()` is monotonically
/// non-decreasing across the lifetime of an execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Execution {
    pub id: ExecutionId,
    pub story_key: String,
    /// Denormalized snapshot of the story at the time the execution
    /// started, so history survives the backlog item being edited or
    /// removed later. `story_epic` is derived from the key; the rest are
    /// `None` until [`Execution::with_story_meta`] is called.
    #[serde(default)]
    pub story_epic: Option<u32>,
    #[serde(default)]
    pub story_status: Option<String>,
    #[serde(default)]
    pub story_title: Option<String>,
    pub status: ExecutionStatus,
    pub steps: Vec<StepExecution>,
    pub current: usize,
    pub started_at: u64,
    pub ended_at: Option<u64>,
    pub error: Option<String>,
}

impl Execution {
    pub fn new(story_key: impl Into<String>, step_names: &[String], started_at: u64) -> Self {
        let story_key = story_key.into();
        let story_epic = crate::story::leading_epic(&story_key);
        Self {
            id: ExecutionId::new(),
            story_key,
            story_epic,
            story_status: None,
            story_title: None,
            status: ExecutionStatus::Running,
            steps: step_names.iter().map(StepExecution::new).collect(),
            current: 0,
            started_at,
            ended_at: None,
            error: None,
        }
    }

    /// Attach the story's status and title at the moment the execution
    /// started. Only the real production call site has a full `Story` in
    /// scope, so this is additive rather than folded into `new`.
    pub fn with_story_meta(mut self, story_status: impl Into<String>, story_title: impl Into<String>) -> Self {
        self.story_status = Some(story_status.into());
        self.story_title = Some(story_title.into());
        self
    }

    /// Percentage of steps that have reached a terminal status, in `[0, 100]`.
    /// Returns `100` for an execution with no steps, since there is nothing
    /// left to wait for.
    pub fn progress_percent(&self) -> u8 {
        if self.steps.is_empty() {
            return 100;
        }
        let done = self.steps.iter().filter(|s| s.status.is_terminal()).count();
        ((done * 100) / self.steps.len()) as u8
    }

    pub fn current_step(&self) -> Option<&StepExecution> {
        self.steps.get(self.current)
    }

    pub fn current_step_mut(&mut self) -> Option<&mut StepExecution> {
        self.steps.get_mut(self.current)
    }

    /// Advance to the next step if the current one finished successfully.
    /// Returns `true` if there was a next step to advance to.
    pub fn advance(&mut self) -> bool {
        if self.current + 1 < self.steps.len() {
            self.current += 1;
            true
        } else {
            false
        }
    }

    pub fn finish(&mut self, status: ExecutionStatus, ended_at: u64, error: Option<String>) {
        self.status = status;
        self.ended_at = Some(ended_at);
        self.error = error;
    }
}

#[cfg(test)]
#[path = "execution_tests.rs"]
mod tests;
