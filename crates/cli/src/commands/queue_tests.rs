// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Contributors

use super::*;
use crate::config::EngineConfig;

fn test_context() -> (tempfile::TempDir, Context) {
    let dir = tempfile::tempdir().unwrap();
    let mut config = EngineConfig::default();
    config.data_dir = dir.path().to_path_buf();
    let ctx = Context::open(config).unwrap();
    (dir, ctx)
}

#[tokio::test]
async fn add_then_list_then_remove() {
    let (_dir, ctx) = test_context();
    let queue = Arc::new(Mutex::new(Queue::new()));

    handle(&ctx, &queue, QueueCommand::Add { story_key: "1-1-a".to_string() }).await.unwrap();
    assert_eq!(queue.lock().len(), 1);
    let id = queue.lock().items()[0].id;

    handle(&ctx, &queue, QueueCommand::Remove { id: id.to_string() }).await.unwrap();
    assert_eq!(queue.lock().len(), 0);
}

#[tokio::test]
async fn removing_an_unknown_id_is_an_error() {
    let (_dir, ctx) = test_context();
    let queue = Arc::new(Mutex::new(Queue::new()));
    let err = handle(&ctx, &queue, QueueCommand::Remove { id: "qit-doesnotexist00000".to_string() }).await.unwrap_err();
    assert!(err.to_string().contains("no queue item"));
}

#[tokio::test]
async fn clear_empties_the_queue() {
    let (_dir, ctx) = test_context();
    let queue = Arc::new(Mutex::new(Queue::new()));
    handle(&ctx, &queue, QueueCommand::Add { story_key: "1-1-a".to_string() }).await.unwrap();
    handle(&ctx, &queue, QueueCommand::Clear).await.unwrap();
    assert_eq!(queue.lock().len(), 0);
}
