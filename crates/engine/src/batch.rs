// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Contributors

//! Drives the batch queue one story at a time, in queue order.

use crate::executor::{ExecuteError, ExecutionControl, Executor};
use devflow_core::clock::Clock;
use devflow_core::event::Event;
use devflow_core::queue::Queue;
use devflow_core::queue_item::QueueItemStatus;
use devflow_core::step::Workflow;
use devflow_core::story::Story;
use devflow_core::EventBus;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Runs every waiting item in `queue` sequentially against `workflow`,
/// looking each story up by key in `stories` (items whose story has since
/// disappeared are marked failed and skipped).
pub async fn run_queue<C: Clock>(
    executor: &Executor<C>,
    clock: &C,
    queue: &Arc<Mutex<Queue>>,
    bus: &Arc<EventBus>,
    stories: &[Story],
    workflow: &Workflow,
    cancel: CancellationToken,
) -> Result<(), ExecuteError> {
    loop {
        if cancel.is_cancelled() {
            break;
        }
        let next = {
            let q = queue.lock();
            q.next_waiting().cloned()
        };
        let Some(item) = next else { break };

        let Some(story) = stories.iter().find(|s| s.key == item.story_key) else {
            queue.lock().set_status(item.id, QueueItemStatus::Failed);
            continue;
        };

        queue.lock().set_status(item.id, QueueItemStatus::Running);
        bus.publish(Event::QueueItemStarted { queue_item_id: item.id.to_string(), story_key: story.key.clone() });

        let control = ExecutionControl::new_with_cancel(cancel.clone());
        let execution = executor.run_execution(story, workflow, &control).await?;
        let final_status = execution_status_to_step_status(execution.status);

        {
            let mut q = queue.lock();
            for step in &execution.steps {
                if let Some(duration) = step.duration() {
                    q.record_step_duration(&step.step_name, duration.as_millis() as f64);
                }
            }
        }

        let item_status = if execution.status == devflow_core::execution::ExecutionStatus::Succeeded {
            QueueItemStatus::Done
        } else {
            QueueItemStatus::Failed
        };
        queue.lock().set_status(item.id, item_status);
        bus.publish(Event::QueueItemCompleted { queue_item_id: item.id.to_string(), story_key: story.key.clone(), status: final_status });
        bus.publish(Event::QueueUpdated { len: queue.lock().len() });
    }

    bus.publish(Event::QueueCompleted { at: clock.epoch_ms() });
    Ok(())
}

fn execution_status_to_step_status(status: devflow_core::execution::ExecutionStatus) -> devflow_core::step_execution::StepStatus {
    use devflow_core::execution::ExecutionStatus::*;
    use devflow_core::step_execution::StepStatus;
    match status {
        Succeeded => StepStatus::Succeeded,
        Failed => StepStatus::Failed,
        Cancelled => StepStatus::Cancelled,
        Running => StepStatus::Running,
    }
}

#[cfg(test)]
#[path = "batch_tests.rs"]
mod tests;
