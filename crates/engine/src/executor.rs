// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Contributors

//! Drives one [`Execution`] through its workflow's steps end to end,
//! spawning the configured agent command for each step and persisting
//! progress as it goes.

use devflow_core::clock::Clock;
use devflow_core::error::EngineError;
use devflow_core::event::Event;
use devflow_core::execution::{Execution, ExecutionStatus};
use devflow_core::step::{StepTemplate, Workflow};
use devflow_core::step_execution::StepStatus;
use devflow_core::story::Story;
use devflow_core::EventBus;
use devflow_runner::{run, RunRequest};
use devflow_storage::Store;
use devflow_workflow::{interpolate, interpolate_shell, story_vars};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

/// Hard ceiling on attempts for a single step regardless of its configured
/// `retries`, so a misconfigured workflow (e.g. `retries: 1000000`) can't
/// keep an execution running forever.
pub const MAX_STEP_ATTEMPTS: u32 = 20;

#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Storage(#[from] devflow_storage::StorageError),
}

/// Template for turning a rendered prompt into the shell command that
/// invokes the configured coding agent. Must contain a `{Prompt}`
/// placeholder.
#[derive(Debug, Clone)]
pub struct AgentCommand {
    pub template: String,
}

impl AgentCommand {
    pub fn render(&self, prompt: &str) -> Result<String, EngineError> {
        let mut vars = indexmap::IndexMap::new();
        vars.insert("Prompt".to_string(), prompt.to_string());
        interpolate_shell(&self.template, &vars)
    }
}

/// Shared handle for the idempotent control operations (`Pause`, `Resume`,
/// `Cancel`, `Skip`) from §4.2. Cheap to clone; every operation is a no-op
/// when the execution isn't in a state where it applies.
#[derive(Clone, Default)]
pub struct ExecutionControl {
    cancel: CancellationToken,
    paused: Arc<AtomicBool>,
    resume_notify: Arc<Notify>,
    skip_requested: Arc<AtomicBool>,
}

impl ExecutionControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a control handle around a `CancellationToken` the caller
    /// already owns (e.g. one shared across an entire batch run), so
    /// cancelling the batch also cancels this execution.
    pub fn new_with_cancel(cancel: CancellationToken) -> Self {
        Self { cancel, ..Self::default() }
    }

    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        if self.paused.swap(false, Ordering::SeqCst) {
            self.resume_notify.notify_waiters();
        }
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
        self.resume_notify.notify_waiters();
    }

    /// Force the step currently running (or about to run) to terminate as
    /// `skipped` and advance. Consumed by the executor the next time it
    /// checks between steps; a no-op if nothing is running.
    pub fn skip(&self) {
        self.skip_requested.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Park until `Resume`/`Cancel` while `Pause` is in effect. Returns
    /// immediately if not paused.
    async fn wait_while_paused(&self) {
        while self.is_paused() && !self.is_cancelled() {
            self.resume_notify.notified().await;
        }
    }

    fn take_skip_request(&self) -> bool {
        self.skip_requested.swap(false, Ordering::SeqCst)
    }
}

pub struct Executor<C: Clock> {
    store: Arc<Store>,
    bus: Arc<EventBus>,
    clock: C,
    agent_command: AgentCommand,
}

impl<C: Clock> Executor<C> {
    pub fn new(store: Arc<Store>, bus: Arc<EventBus>, clock: C, agent_command: AgentCommand) -> Self {
        Self { store, bus, clock, agent_command }
    }

    /// Run every step of `workflow` against `story`, publishing an event at
    /// every state transition and persisting the execution after each
    /// step. Returns the finished execution even when it ends in failure
    /// or cancellation — only infrastructure errors (storage, template
    /// rendering) are returned as `Err`.
    pub async fn run_execution(
        &self,
        story: &Story,
        workflow: &Workflow,
        control: &ExecutionControl,
    ) -> Result<Execution, ExecuteError> {
        let step_names: Vec<String> = workflow.steps.iter().map(|s| s.name.clone()).collect();
        let mut execution =
            Execution::new(&story.key, &step_names, self.clock.epoch_ms()).with_story_meta(story.status.to_string(), story.title.clone());
        self.store.save_execution(&execution)?;
        self.bus.publish(Event::ExecutionStarted {
            execution_id: execution.id.to_string(),
            story_key: story.key.clone(),
            at: execution.started_at,
        });

        for step in &workflow.steps {
            control.wait_while_paused().await;
            if control.is_cancelled() {
                execution.finish(ExecutionStatus::Cancelled, self.clock.epoch_ms(), Some("cancelled".into()));
                break;
            }

            if control.take_skip_request() {
                if let Some(exec_step) = execution.steps.iter_mut().find(|s| s.step_name == step.name) {
                    exec_step.status = StepStatus::Skipped;
                }
                self.bus.publish(Event::StepCompleted {
                    execution_id: execution.id.to_string(),
                    step_name: step.name.clone(),
                    status: StepStatus::Skipped,
                    at: self.clock.epoch_ms(),
                });
                self.store.save_execution(&execution)?;
                if !execution.advance() {
                    execution.finish(ExecutionStatus::Succeeded, self.clock.epoch_ms(), None);
                    break;
                }
                continue;
            }

            let outcome = self.run_step(story, step, &mut execution, control.cancellation_token()).await?;
            self.store.save_execution(&execution)?;

            match outcome {
                StepOutcome::Advance => {
                    if !execution.advance() {
                        execution.finish(ExecutionStatus::Succeeded, self.clock.epoch_ms(), None);
                        break;
                    }
                }
                StepOutcome::Stop(status, error) => {
                    execution.finish(status, self.clock.epoch_ms(), error);
                    break;
                }
            }
        }

        if execution.status == ExecutionStatus::Running {
            // Every step advanced without a stop signal and there was no
            // next step to move to; this only happens for an empty workflow.
            execution.finish(ExecutionStatus::Succeeded, self.clock.epoch_ms(), None);
        }

        self.store.save_execution(&execution)?;
        self.store.update_step_averages(self.clock.epoch_ms())?;
        self.bus.publish(Event::ExecutionCompleted {
            execution_id: execution.id.to_string(),
            status: execution.status,
            at: execution.ended_at.unwrap_or(self.clock.epoch_ms()),
        });
        Ok(execution)
    }

    async fn run_step(
        &self,
        story: &Story,
        step: &StepTemplate,
        execution: &mut Execution,
        cancel: CancellationToken,
    ) -> Result<StepOutcome, ExecuteError> {
        let vars = story_vars(story);

        if let Some(predicate) = &step.skip_if {
            let rendered = interpolate_shell(predicate, &vars)?;
            let skip = self.predicate_is_true(&rendered, step, cancel.clone()).await?;
            if skip {
                if let Some(exec_step) = execution.steps.iter_mut().find(|s| s.step_name == step.name) {
                    exec_step.status = StepStatus::Skipped;
                }
                return Ok(StepOutcome::Advance);
            }
        }

        let prompt = interpolate(&step.prompt_template, &vars)?;
        let command = self.agent_command.render(&prompt)?;

        let max_attempts = (step.retries + 1).min(MAX_STEP_ATTEMPTS);
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            self.bus.publish(Event::StepStarted {
                execution_id: execution.id.to_string(),
                step_name: step.name.clone(),
                attempt,
                at: self.clock.epoch_ms(),
            });

            let started_at = self.clock.epoch_ms();
            let execution_id = execution.id.to_string();
            let step_name = step.name.clone();
            let bus = Arc::clone(&self.bus);
            let req = RunRequest { command: &command, working_dir: step.working_dir.as_deref().map(std::path::Path::new), env: &step.env, timeout: step.timeout };
            let run_result = run(req, cancel.clone(), move |line| {
                bus.publish(Event::StepOutput {
                    execution_id: execution_id.clone(),
                    step_name: step_name.clone(),
                    line: line.to_string(),
                });
            })
            .await?;
            let ended_at = self.clock.epoch_ms();

            if let Some(exec_step) = execution.steps.iter_mut().find(|s| s.step_name == step.name) {
                exec_step.attempt = attempt;
                exec_step.command = Some(command.clone());
                exec_step.start_time = Some(started_at);
                exec_step.end_time = Some(ended_at);
                exec_step.status = run_result.status;
                exec_step.error = run_result.error.clone();
                exec_step.output = run_result.output;
            }

            self.bus.publish(Event::StepCompleted {
                execution_id: execution.id.to_string(),
                step_name: step.name.clone(),
                status: run_result.status,
                at: ended_at,
            });

            match run_result.status {
                StepStatus::Succeeded => return Ok(StepOutcome::Advance),
                StepStatus::Cancelled => return Ok(StepOutcome::Stop(ExecutionStatus::Cancelled, run_result.error)),
                StepStatus::TimedOut | StepStatus::Failed => {
                    last_error = run_result.error;
                    if attempt == max_attempts {
                        if step.allow_failure {
                            return Ok(StepOutcome::Advance);
                        }
                        return Ok(StepOutcome::Stop(ExecutionStatus::Failed, last_error));
                    }
                }
                StepStatus::Pending | StepStatus::Running | StepStatus::Skipped => unreachable!("run() never returns a non-terminal status"),
            }
        }

        Ok(StepOutcome::Stop(ExecutionStatus::Failed, last_error))
    }

    async fn predicate_is_true(&self, rendered: &str, step: &StepTemplate, cancel: CancellationToken) -> Result<bool, ExecuteError> {
        let req = RunRequest { command: rendered, working_dir: step.working_dir.as_deref().map(std::path::Path::new), env: &step.env, timeout: step.timeout };
        let outcome = run(req, cancel, |_| {}).await?;
        Ok(outcome.status == StepStatus::Succeeded)
    }
}

enum StepOutcome {
    Advance,
    Stop(ExecutionStatus, Option<String>),
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
