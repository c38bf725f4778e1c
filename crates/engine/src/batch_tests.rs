// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Contributors

use super::*;
use crate::executor::AgentCommand;
use devflow_core::clock::SystemClock;
use devflow_core::step::StepTemplate;
use devflow_core::story::StoryStatus;
use devflow_storage::Store;

fn story(key: &str) -> Story {
    Story { key: key.into(), epic: 1, status: StoryStatus::Backlog, title: key.into(), file_path: format!("/tmp/{key}.md").into(), file_exists: false }
}

#[tokio::test]
async fn runs_every_queued_item_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(Store::open(&dir.path().join("db.sqlite")).unwrap());
    let bus = Arc::new(EventBus::new());
    let executor = Executor::new(Arc::clone(&store), Arc::clone(&bus), SystemClock, AgentCommand { template: "echo '{Prompt}'".to_string() });

    let stories = vec![story("1-1-a"), story("1-2-b")];
    let queue = Arc::new(Mutex::new(Queue::new()));
    queue.lock().add("1-1-a", 0);
    queue.lock().add("1-2-b", 0);

    let workflow = Workflow { name: "w".into(), steps: vec![StepTemplate::new("plan", "go")] };
    run_queue(&executor, &SystemClock, &queue, &bus, &stories, &workflow, CancellationToken::new()).await.unwrap();

    let q = queue.lock();
    assert!(q.items().iter().all(|i| i.status == QueueItemStatus::Done));
}

#[tokio::test]
async fn missing_story_marks_item_failed_without_blocking_the_rest() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(Store::open(&dir.path().join("db.sqlite")).unwrap());
    let bus = Arc::new(EventBus::new());
    let executor = Executor::new(Arc::clone(&store), Arc::clone(&bus), SystemClock, AgentCommand { template: "echo '{Prompt}'".to_string() });

    let stories = vec![story("1-2-b")];
    let queue = Arc::new(Mutex::new(Queue::new()));
    queue.lock().add("1-1-missing", 0);
    queue.lock().add("1-2-b", 0);

    let workflow = Workflow { name: "w".into(), steps: vec![StepTemplate::new("plan", "go")] };
    run_queue(&executor, &SystemClock, &queue, &bus, &stories, &workflow, CancellationToken::new()).await.unwrap();

    let q = queue.lock();
    assert_eq!(q.items()[0].status, QueueItemStatus::Failed);
    assert_eq!(q.items()[1].status, QueueItemStatus::Done);
}
