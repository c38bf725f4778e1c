// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Contributors

use super::*;
use devflow_core::EventBus;
use std::sync::atomic::{AtomicUsize, Ordering};

#[tokio::test]
async fn file_modification_triggers_a_debounced_refresh() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("source.yaml");
    std::fs::write(&path, "items: []").unwrap();

    let bus = Arc::new(EventBus::new());
    let mut events = bus.subscribe(16);
    let cancel = CancellationToken::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_clone = Arc::clone(&calls);

    let watch_cancel = cancel.clone();
    let watch_path = path.clone();
    let handle = tokio::spawn(async move {
        watch(&watch_path, Duration::from_millis(50), bus, watch_cancel, move || {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        })
        .await
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    std::fs::write(&path, "items: [{}]").unwrap();

    tokio::time::timeout(Duration::from_secs(2), events.recv()).await.unwrap().unwrap();
    assert!(calls.load(Ordering::SeqCst) >= 1);

    cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(1), handle).await;
}
