// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Contributors

//! Bounded worker pool for running several stories' workflows
//! concurrently. Workers complete out of order; callers get results back
//! in whatever order they finish, not submission order.

use crate::executor::{ExecuteError, ExecutionControl, Executor};
use devflow_core::clock::Clock;
use devflow_core::event::Event;
use devflow_core::execution::Execution;
use devflow_core::step::Workflow;
use devflow_core::story::Story;
use devflow_core::EventBus;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Workers are clamped to this range regardless of what's requested, so a
/// caller can't accidentally launch zero or an unbounded number of agent
/// subprocesses at once.
pub const MIN_WORKERS: usize = 1;
pub const MAX_WORKERS: usize = 10;

/// Job queue capacity. Stories beyond this back up the submitting side
/// rather than being buffered unboundedly in memory.
pub const JOB_CHANNEL_CAPACITY: usize = 100;

pub fn clamp_workers(requested: usize) -> usize {
    requested.clamp(MIN_WORKERS, MAX_WORKERS)
}

/// Run `stories` against `workflow` using up to `workers` concurrent
/// workers, returning each story's finished execution. Returns early with
/// the first infrastructure error encountered; stories still running at
/// that point are abandoned via `cancel`.
pub async fn run_parallel<C: Clock>(
    executor: Arc<Executor<C>>,
    workers: usize,
    stories: Vec<Story>,
    workflow: Arc<Workflow>,
    bus: Arc<EventBus>,
    cancel: CancellationToken,
) -> Result<Vec<Execution>, ExecuteError> {
    let workers = clamp_workers(workers);
    let total = stories.len();
    let (job_tx, job_rx) = mpsc::channel::<Story>(JOB_CHANNEL_CAPACITY.min(total.max(1)));
    let job_rx = Arc::new(tokio::sync::Mutex::new(job_rx));

    let completed = Arc::new(AtomicUsize::new(0));
    let running = Arc::new(AtomicUsize::new(0));
    let (result_tx, mut result_rx) = mpsc::channel::<Result<Execution, ExecuteError>>(total.max(1));

    let mut handles = Vec::with_capacity(workers);
    for _ in 0..workers {
        let job_rx = Arc::clone(&job_rx);
        let executor = Arc::clone(&executor);
        let workflow = Arc::clone(&workflow);
        let bus = Arc::clone(&bus);
        let cancel = cancel.clone();
        let result_tx = result_tx.clone();
        let completed = Arc::clone(&completed);
        let running = Arc::clone(&running);
        let total = total;

        handles.push(tokio::spawn(async move {
            loop {
                let story = {
                    let mut rx = job_rx.lock().await;
                    rx.recv().await
                };
                let Some(story) = story else { break };
                if cancel.is_cancelled() {
                    break;
                }

                running.fetch_add(1, Ordering::SeqCst);
                let control = ExecutionControl::new_with_cancel(cancel.clone());
                let result = executor.run_execution(&story, &workflow, &control).await;
                running.fetch_sub(1, Ordering::SeqCst);
                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;

                bus.publish(Event::ParallelProgress { total, completed: done, running: running.load(Ordering::SeqCst) });

                if result_tx.send(result).await.is_err() {
                    break;
                }
            }
        }));
    }
    drop(result_tx);

    for story in stories {
        if job_tx.send(story).await.is_err() {
            break;
        }
    }
    drop(job_tx);

    let mut executions = Vec::with_capacity(total);
    let mut first_error = None;
    while let Some(result) = result_rx.recv().await {
        match result {
            Ok(execution) => executions.push(execution),
            Err(err) if first_error.is_none() => first_error = Some(err),
            Err(_) => {}
        }
    }

    for handle in handles {
        let _ = handle.await;
    }

    if let Some(err) = first_error {
        return Err(err);
    }
    Ok(executions)
}

#[cfg(test)]
#[path = "parallel_tests.rs"]
mod tests;
