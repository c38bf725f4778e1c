// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Contributors

use super::*;

#[test]
fn add_assigns_increasing_positions() {
    let mut q = Queue::new();
    q.add("1-1-a", 0);
    q.add("1-2-b", 0);
    let positions: Vec<_> = q.items().iter().map(|i| i.position).collect();
    assert_eq!(positions, vec![0, 1]);
}

#[test]
fn remove_closes_the_gap() {
    let mut q = Queue::new();
    q.add("1-1-a", 0);
    let mid = q.add("1-2-b", 0);
    q.add("1-3-c", 0);
    q.remove(mid);
    let keys: Vec<_> = q.items().iter().map(|i| i.story_key.clone()).collect();
    assert_eq!(keys, vec!["1-1-a", "1-3-c"]);
    let positions: Vec<_> = q.items().iter().map(|i| i.position).collect();
    assert_eq!(positions, vec![0, 1]);
}

#[test]
fn move_up_is_noop_at_head() {
    let mut q = Queue::new();
    let first = q.add("1-1-a", 0);
    q.add("1-2-b", 0);
    q.move_up(first);
    assert_eq!(q.items()[0].story_key, "1-1-a");
}

#[test]
fn move_down_swaps_with_successor() {
    let mut q = Queue::new();
    let first = q.add("1-1-a", 0);
    q.add("1-2-b", 0);
    q.move_down(first);
    let keys: Vec<_> = q.items().iter().map(|i| i.story_key.clone()).collect();
    assert_eq!(keys, vec!["1-2-b", "1-1-a"]);
    let positions: Vec<_> = q.items().iter().map(|i| i.position).collect();
    assert_eq!(positions, vec![0, 1]);
}

#[test]
fn clear_empties_the_queue() {
    let mut q = Queue::new();
    q.add("1-1-a", 0);
    q.clear();
    assert!(q.is_empty());
}

#[test]
fn next_waiting_skips_running_items() {
    let mut q = Queue::new();
    let first = q.add("1-1-a", 0);
    q.add("1-2-b", 0);
    q.set_status(first, QueueItemStatus::Running);
    assert_eq!(q.next_waiting().unwrap().story_key, "1-2-b");
}

#[test]
fn reorder_applies_the_requested_sequence() {
    let mut q = Queue::new();
    let a = q.add("1-1-a", 0);
    let b = q.add("1-2-b", 0);
    let c = q.add("1-3-c", 0);
    q.reorder(&[c, a, b]);
    let keys: Vec<_> = q.items().iter().map(|i| i.story_key.clone()).collect();
    assert_eq!(keys, vec!["1-3-c", "1-1-a", "1-2-b"]);
    let positions: Vec<_> = q.items().iter().map(|i| i.position).collect();
    assert_eq!(positions, vec![0, 1, 2]);
}

#[test]
fn reorder_appends_unmentioned_items_and_ignores_unknown_ids() {
    let mut q = Queue::new();
    let a = q.add("1-1-a", 0);
    let b = q.add("1-2-b", 0);
    q.reorder(&[b, QueueItemId::from_string("qit-doesnotexist00000".to_string())]);
    let keys: Vec<_> = q.items().iter().map(|i| i.story_key.clone()).collect();
    assert_eq!(keys, vec!["1-2-b", "1-1-a"]);
    let _ = a;
}

#[test]
fn record_step_duration_folds_into_the_iir_average() {
    let mut q = Queue::new();
    assert!(q.step_average("plan").is_none());
    let first = q.record_step_duration("plan", 1000.0);
    assert_eq!(first.avg_ms, 1000.0);
    let second = q.record_step_duration("plan", 2000.0);
    assert_eq!(second.avg_ms, 1500.0);
    assert_eq!(q.step_average("plan").unwrap().avg_ms, 1500.0);
}
