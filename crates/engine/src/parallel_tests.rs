// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Contributors

use super::*;
use crate::executor::AgentCommand;
use devflow_core::clock::SystemClock;
use devflow_core::execution::ExecutionStatus;
use devflow_core::step::StepTemplate;
use devflow_core::story::StoryStatus;
use devflow_storage::Store;

fn story(key: &str) -> Story {
    Story { key: key.into(), epic: 1, status: StoryStatus::Backlog, title: key.into(), file_path: format!("/tmp/{key}.md").into(), file_exists: false }
}

#[test]
fn clamp_workers_stays_within_bounds() {
    assert_eq!(clamp_workers(0), MIN_WORKERS);
    assert_eq!(clamp_workers(3), 3);
    assert_eq!(clamp_workers(1000), MAX_WORKERS);
}

#[tokio::test]
async fn runs_all_stories_and_returns_every_execution() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(Store::open(&dir.path().join("db.sqlite")).unwrap());
    let bus = Arc::new(EventBus::new());
    let executor = Arc::new(Executor::new(store, Arc::clone(&bus), SystemClock, AgentCommand { template: "echo '{Prompt}'".to_string() }));
    let workflow = Arc::new(Workflow { name: "w".into(), steps: vec![StepTemplate::new("plan", "go")] });

    let stories = vec![story("1-1-a"), story("1-2-b"), story("1-3-c")];
    let executions = run_parallel(executor, 2, stories, workflow, bus, CancellationToken::new()).await.unwrap();

    assert_eq!(executions.len(), 3);
    assert!(executions.iter().all(|e| e.status == ExecutionStatus::Succeeded));
}

#[tokio::test]
async fn emits_progress_events_for_every_completion() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(Store::open(&dir.path().join("db.sqlite")).unwrap());
    let bus = Arc::new(EventBus::new());
    let mut rx = bus.subscribe(64);
    let executor = Arc::new(Executor::new(store, Arc::clone(&bus), SystemClock, AgentCommand { template: "echo '{Prompt}'".to_string() }));
    let workflow = Arc::new(Workflow { name: "w".into(), steps: vec![StepTemplate::new("plan", "go")] });

    let stories = vec![story("1-1-a"), story("1-2-b")];
    run_parallel(executor, 2, stories, workflow, bus, CancellationToken::new()).await.unwrap();

    let mut progress_events = 0;
    while let Ok(event) = rx.try_recv() {
        if matches!(event, Event::ParallelProgress { .. }) {
            progress_events += 1;
        }
    }
    assert_eq!(progress_events, 2);
}
