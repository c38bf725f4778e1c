// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Contributors

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Domain types shared by every `devflow-*` crate: work items, workflow
//! step templates, execution records, the batch queue, the event bus, and
//! the error type they all report through.

pub mod bus;
pub mod clock;
pub mod error;
pub mod event;
pub mod execution;
pub mod id;
mod macros;
pub mod queue;
pub mod queue_item;
pub mod step;
pub mod step_average;
pub mod step_execution;
pub mod story;

pub use bus::EventBus;
pub use clock::{Clock, FakeClock, SystemClock};
pub use error::EngineError;
pub use event::Event;
pub use execution::{Execution, ExecutionId, ExecutionStatus};
pub use queue::Queue;
pub use queue_item::{QueueItem, QueueItemId, QueueItemStatus};
pub use step::{StepTemplate, Workflow};
pub use step_average::StepAverage;
pub use step_execution::{OutputBuffer, StepExecution, StepStatus, MAX_OUTPUT_LINES};
pub use story::{Story, StoryStatus};
