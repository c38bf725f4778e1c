// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Contributors

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! The execution engine: runs one story's workflow to completion, drives
//! the batch queue, fans a batch out across a worker pool, and watches
//! the work-item source for changes.

pub mod batch;
pub mod executor;
pub mod parallel;
pub mod watcher;

pub use batch::run_queue;
pub use executor::{AgentCommand, ExecuteError, Executor, ExecutionControl, MAX_STEP_ATTEMPTS};
pub use parallel::{clamp_workers, run_parallel, JOB_CHANNEL_CAPACITY, MAX_WORKERS, MIN_WORKERS};
pub use watcher::{watch, DEFAULT_DEBOUNCE};
