// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Contributors

use super::*;

#[tokio::test]
async fn delivers_published_events_to_subscriber() {
    let bus = EventBus::new();
    let mut rx = bus.subscribe(4);
    bus.publish(Event::Refresh);
    let received = rx.recv().await.unwrap();
    assert_eq!(received.name(), "system:refresh");
}

#[tokio::test]
async fn fans_out_to_multiple_subscribers_independently() {
    let bus = EventBus::new();
    let mut a = bus.subscribe(4);
    let mut b = bus.subscribe(4);
    bus.publish(Event::Refresh);
    assert!(a.recv().await.is_some());
    assert!(b.recv().await.is_some());
}

#[tokio::test]
async fn drops_events_for_a_full_channel_without_blocking() {
    let bus = EventBus::new();
    let _rx = bus.subscribe(1);
    bus.publish(Event::Refresh);
    // Second publish finds the channel full; must not panic or block.
    bus.publish(Event::Refresh);
    assert_eq!(bus.subscriber_count(), 1);
}

#[tokio::test]
async fn disconnects_subscriber_after_repeated_overflow() {
    let bus = EventBus::new();
    let rx = bus.subscribe(1);
    // Fill the one slot, then overflow past the threshold without ever
    // draining, holding rx alive so Closed isn't hit before Full is.
    for _ in 0..(MAX_CONSECUTIVE_OVERFLOWS + 5) {
        bus.publish(Event::Refresh);
    }
    assert_eq!(bus.subscriber_count(), 0);
    drop(rx);
}

#[tokio::test]
async fn closed_receiver_is_pruned_on_next_publish() {
    let bus = EventBus::new();
    let rx = bus.subscribe(4);
    drop(rx);
    bus.publish(Event::Refresh);
    assert_eq!(bus.subscriber_count(), 0);
}
