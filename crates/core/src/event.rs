// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Contributors

//! Events broadcast to subscribers (WebSocket clients, log sinks) as the
//! engine runs.

use crate::execution::ExecutionStatus;
use crate::step_execution::StepStatus;
use serde::{Deserialize, Serialize};

/// Something that happened in the engine, timestamped at emission.
///
/// Tagged with `type` so clients can dispatch on the wire without first
/// deserializing the full payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    #[serde(rename = "execution:started")]
    ExecutionStarted { execution_id: String, story_key: String, at: u64 },

    #[serde(rename = "step:started")]
    StepStarted { execution_id: String, step_name: String, attempt: u32, at: u64 },

    #[serde(rename = "step:output")]
    StepOutput { execution_id: String, step_name: String, line: String },

    #[serde(rename = "step:completed")]
    StepCompleted { execution_id: String, step_name: String, status: StepStatus, at: u64 },

    #[serde(rename = "execution:completed")]
    ExecutionCompleted { execution_id: String, status: ExecutionStatus, at: u64 },

    #[serde(rename = "queue:item_started")]
    QueueItemStarted { queue_item_id: String, story_key: String },

    #[serde(rename = "queue:item_completed")]
    QueueItemCompleted { queue_item_id: String, story_key: String, status: StepStatus },

    #[serde(rename = "queue:completed")]
    QueueCompleted { at: u64 },

    #[serde(rename = "queue:updated")]
    QueueUpdated { len: usize },

    #[serde(rename = "parallel:progress")]
    ParallelProgress { total: usize, completed: usize, running: usize },

    #[serde(rename = "system:refresh")]
    Refresh,

    #[serde(rename = "system:storage_error")]
    StorageError { message: String },

    #[serde(other, skip_serializing)]
    Custom,
}

impl Event {
    /// Stable wire name for logging and metrics, matching the `type` tag.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ExecutionStarted { .. } => "execution:started",
            Self::StepStarted { .. } => "step:started",
            Self::StepOutput { .. } => "step:output",
            Self::StepCompleted { .. } => "step:completed",
            Self::ExecutionCompleted { .. } => "execution:completed",
            Self::QueueItemStarted { .. } => "queue:item_started",
            Self::QueueItemCompleted { .. } => "queue:item_completed",
            Self::QueueCompleted { .. } => "queue:completed",
            Self::QueueUpdated { .. } => "queue:updated",
            Self::ParallelProgress { .. } => "parallel:progress",
            Self::Refresh => "system:refresh",
            Self::StorageError { .. } => "system:storage_error",
            Self::Custom => "custom",
        }
    }

    /// High-frequency events that are safe to drop under back-pressure
    /// without losing state a client can't recover by re-fetching.
    pub fn is_high_frequency(&self) -> bool {
        matches!(self, Self::StepOutput { .. } | Self::ParallelProgress { .. })
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
