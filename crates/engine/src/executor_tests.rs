// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Contributors

use super::*;
use devflow_core::clock::SystemClock;
use devflow_core::story::StoryStatus;
use devflow_workflow::StepTemplate;
use std::time::Duration;

fn story() -> Story {
    Story {
        key: "1-1-example".into(),
        epic: 1,
        status: StoryStatus::InProgress,
        title: "Example".into(),
        file_path: "/tmp/1-1-example.md".into(),
        file_exists: false,
    }
}

fn harness() -> (tempfile::TempDir, Arc<Store>, Arc<EventBus>) {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(Store::open(&dir.path().join("db.sqlite")).unwrap());
    let bus = Arc::new(EventBus::new());
    (dir, store, bus)
}

fn echo_agent() -> AgentCommand {
    AgentCommand { template: "echo '{Prompt}'".to_string() }
}

#[tokio::test]
async fn successful_workflow_runs_every_step_in_order() {
    let (_dir, store, bus) = harness();
    let mut rx = bus.subscribe(64);
    let executor = Executor::new(store, bus, SystemClock, echo_agent());
    let workflow = Workflow { name: "w".into(), steps: vec![StepTemplate::new("plan", "plan {Story.Key}"), StepTemplate::new("implement", "implement {Story.Key}")] };

    let execution = executor.run_execution(&story(), &workflow, &ExecutionControl::new()).await.unwrap();

    assert_eq!(execution.status, ExecutionStatus::Succeeded);
    assert!(execution.steps.iter().all(|s| s.status == StepStatus::Succeeded));

    let mut saw_completed = false;
    while let Ok(event) = rx.try_recv() {
        if matches!(event, Event::ExecutionCompleted { .. }) {
            saw_completed = true;
        }
    }
    assert!(saw_completed);
}

#[tokio::test]
async fn failed_step_stops_the_execution_without_allow_failure() {
    let (_dir, store, bus) = harness();
    let executor = Executor::new(store, bus, SystemClock, AgentCommand { template: "exit 1".to_string() });
    let workflow = Workflow { name: "w".into(), steps: vec![StepTemplate::new("plan", "plan"), StepTemplate::new("implement", "implement")] };

    let execution = executor.run_execution(&story(), &workflow, &ExecutionControl::new()).await.unwrap();

    assert_eq!(execution.status, ExecutionStatus::Failed);
    assert_eq!(execution.steps[0].status, StepStatus::Failed);
    assert_eq!(execution.steps[1].status, StepStatus::Pending);
}

#[tokio::test]
async fn allow_failure_step_lets_execution_continue() {
    let (_dir, store, bus) = harness();
    // The prompt text itself is the shell command here (template is a
    // pass-through), so each step's outcome is driven by its own prompt.
    let executor = Executor::new(store, bus, SystemClock, AgentCommand { template: "{Prompt}".to_string() });
    let mut failing = StepTemplate::new("plan", "exit 1");
    failing.allow_failure = true;
    let workflow = Workflow { name: "w".into(), steps: vec![failing, StepTemplate::new("implement", "echo done")] };

    let execution = executor.run_execution(&story(), &workflow, &ExecutionControl::new()).await.unwrap();
    assert_eq!(execution.steps[0].status, StepStatus::Failed);
    assert_eq!(execution.steps[1].status, StepStatus::Succeeded);
    assert_eq!(execution.status, ExecutionStatus::Succeeded);
}

#[tokio::test]
async fn retries_are_exhausted_before_failing() {
    let (_dir, store, bus) = harness();
    let executor = Executor::new(store, bus, SystemClock, AgentCommand { template: "exit 1".to_string() });
    let mut step = StepTemplate::new("plan", "plan");
    step.retries = 2;
    let workflow = Workflow { name: "w".into(), steps: vec![step] };

    let execution = executor.run_execution(&story(), &workflow, &ExecutionControl::new()).await.unwrap();
    assert_eq!(execution.status, ExecutionStatus::Failed);
    assert_eq!(execution.steps[0].attempt, 3);
}

#[tokio::test]
async fn skip_if_predicate_skips_the_step() {
    let (_dir, store, bus) = harness();
    let executor = Executor::new(store, bus, SystemClock, echo_agent());
    let mut step = StepTemplate::new("plan", "plan");
    step.skip_if = Some("true".to_string());
    let workflow = Workflow { name: "w".into(), steps: vec![step] };

    let execution = executor.run_execution(&story(), &workflow, &ExecutionControl::new()).await.unwrap();
    assert_eq!(execution.status, ExecutionStatus::Succeeded);
    assert_eq!(execution.steps[0].status, StepStatus::Skipped);
}

#[tokio::test]
async fn already_cancelled_token_short_circuits_the_first_step() {
    let (_dir, store, bus) = harness();
    let executor = Executor::new(store, bus, SystemClock, echo_agent());
    let workflow = Workflow { name: "w".into(), steps: vec![StepTemplate::new("plan", "plan")] };

    let control = ExecutionControl::new();
    control.cancel();
    let execution = executor.run_execution(&story(), &workflow, &control).await.unwrap();
    assert_eq!(execution.status, ExecutionStatus::Cancelled);
}

#[tokio::test]
async fn skip_forces_the_running_step_to_terminate_as_skipped() {
    let (_dir, store, bus) = harness();
    let executor = Executor::new(store, bus, SystemClock, echo_agent());
    let workflow = Workflow { name: "w".into(), steps: vec![StepTemplate::new("plan", "plan"), StepTemplate::new("implement", "implement")] };

    let control = ExecutionControl::new();
    control.skip();
    let execution = executor.run_execution(&story(), &workflow, &control).await.unwrap();
    assert_eq!(execution.steps[0].status, StepStatus::Skipped);
    assert_eq!(execution.steps[1].status, StepStatus::Succeeded);
}

#[tokio::test]
async fn pause_then_resume_lets_the_execution_continue() {
    let (_dir, store, bus) = harness();
    let executor = Arc::new(Executor::new(store, bus, SystemClock, echo_agent()));
    let workflow = Arc::new(Workflow { name: "w".into(), steps: vec![StepTemplate::new("plan", "plan")] });

    let control = ExecutionControl::new();
    control.pause();
    assert!(control.is_paused());

    let executor2 = Arc::clone(&executor);
    let workflow2 = Arc::clone(&workflow);
    let control2 = control.clone();
    let s = story();
    let handle = tokio::spawn(async move { executor2.run_execution(&s, &workflow2, &control2).await });

    tokio::time::sleep(Duration::from_millis(20)).await;
    control.resume();
    let execution = handle.await.unwrap().unwrap();
    assert_eq!(execution.status, ExecutionStatus::Succeeded);
}

#[tokio::test]
async fn timeout_marks_the_step_timed_out() {
    let (_dir, store, bus) = harness();
    let executor = Executor::new(store, bus, SystemClock, AgentCommand { template: "sleep 30".to_string() });
    let mut step = StepTemplate::new("plan", "plan");
    step.timeout = Duration::from_millis(50);
    let workflow = Workflow { name: "w".into(), steps: vec![step] };

    let execution = executor.run_execution(&story(), &workflow, &ExecutionControl::new()).await.unwrap();
    assert_eq!(execution.steps[0].status, StepStatus::TimedOut);
    assert_eq!(execution.status, ExecutionStatus::Failed);
}
