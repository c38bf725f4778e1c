// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Contributors

//! Watches the work-item source file (and its stories directory) for
//! changes and triggers a debounced refresh.

use devflow_core::event::Event;
use devflow_core::EventBus;
use notify::{EventKind, RecursiveMode, Watcher};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Default quiet period after the last filesystem event before a refresh
/// fires, so a save that touches several files in quick succession only
/// triggers one re-ingest.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Watch `path`'s parent directory and invoke `on_change` at most once per
/// debounce window, publishing [`Event::Refresh`] alongside it. Runs until
/// `cancel` is triggered.
pub async fn watch(
    path: &Path,
    debounce: Duration,
    bus: Arc<EventBus>,
    cancel: CancellationToken,
    mut on_change: impl FnMut() + Send + 'static,
) -> notify::Result<()> {
    let (tx, mut rx) = tokio::sync::mpsc::channel(16);
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        if let Ok(event) = res {
            if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)) {
                let _ = tx.blocking_send(());
            }
        }
    })?;
    let watch_dir = path.parent().unwrap_or(path);
    watcher.watch(watch_dir, RecursiveMode::Recursive)?;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            signal = rx.recv() => {
                if signal.is_none() {
                    break;
                }
                // Drain anything else that arrived during the debounce
                // window so a burst of saves collapses to one refresh.
                tokio::select! {
                    _ = tokio::time::sleep(debounce) => {}
                    _ = cancel.cancelled() => break,
                }
                while rx.try_recv().is_ok() {}
                on_change();
                bus.publish(Event::Refresh);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "watcher_tests.rs"]
mod tests;
