// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Contributors

//! A single entry in the batch execution queue.

use serde::{Deserialize, Serialize};

crate::define_id! {
    pub struct QueueItemId("qit-");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueItemStatus {
    Waiting,
    Running,
    Done,
    Failed,
}

crate::simple_display! {
    QueueItemStatus {
        Waiting => "waiting",
        Running => "running",
        Done => "done",
        Failed => "failed",
    }
}

/// One story queued for batch execution, in line-up order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueItem {
    pub id: QueueItemId,
    pub story_key: String,
    pub position: usize,
    pub status: QueueItemStatus,
    pub added_at: u64,
}

impl QueueItem {
    pub fn new(story_key: impl Into<String>, position: usize, added_at: u64) -> Self {
        Self { id: QueueItemId::new(), story_key: story_key.into(), position, status: QueueItemStatus::Waiting, added_at }
    }
}
