// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Contributors

//! Fan-out event bus with per-subscriber back-pressure.
//!
//! Each subscriber gets its own bounded channel so one slow consumer (a
//! laggy WebSocket client) can't stall delivery to the others. A full
//! channel drops the event rather than blocking the publisher; a
//! subscriber that overflows repeatedly is dropped entirely so a dead
//! connection doesn't accumulate drops forever.

use crate::event::Event;
use parking_lot::Mutex;
use tokio::sync::mpsc;

/// Default channel capacity for an ordinary subscriber (a WebSocket client).
pub const DEFAULT_SUBSCRIBER_CAPACITY: usize = 64;

/// Channel capacity for the primary internal subscriber (e.g. the storage
/// writer), which must not lose events under normal load.
pub const PRIMARY_SUBSCRIBER_CAPACITY: usize = 256;

/// Consecutive full-channel drops before a subscriber is disconnected.
const MAX_CONSECUTIVE_OVERFLOWS: u32 = 20;

struct Subscriber {
    tx: mpsc::Sender<Event>,
    consecutive_overflows: u32,
}

#[derive(Default)]
pub struct EventBus {
    subscribers: Mutex<Vec<Subscriber>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber with the given channel capacity.
    pub fn subscribe(&self, capacity: usize) -> mpsc::Receiver<Event> {
        let (tx, rx) = mpsc::channel(capacity);
        self.subscribers.lock().push(Subscriber { tx, consecutive_overflows: 0 });
        rx
    }

    /// Current number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    /// Broadcast an event to every subscriber, dropping it for any
    /// subscriber whose channel is full and disconnecting subscribers that
    /// stay full for too many events in a row.
    pub fn publish(&self, event: Event) {
        let mut subscribers = self.subscribers.lock();
        subscribers.retain_mut(|sub| match sub.tx.try_send(event.clone()) {
            Ok(()) => {
                sub.consecutive_overflows = 0;
                true
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                sub.consecutive_overflows += 1;
                if sub.consecutive_overflows >= MAX_CONSECUTIVE_OVERFLOWS {
                    tracing::warn!(event = event.name(), "disconnecting subscriber after repeated overflow");
                    false
                } else {
                    true
                }
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        });
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
