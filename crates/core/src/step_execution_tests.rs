// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Contributors

use super::*;

#[test]
fn output_buffer_evicts_oldest_past_cap() {
    let mut buf = OutputBuffer::new();
    for i in 0..(MAX_OUTPUT_LINES + 1) {
        buf.push(format!("line {i}"));
    }
    assert_eq!(buf.len(), MAX_OUTPUT_LINES);
    assert!(buf.truncated());
    assert_eq!(buf.lines().next(), Some("line 1"));
}

#[test]
fn output_buffer_not_truncated_under_cap() {
    let mut buf = OutputBuffer::new();
    buf.push("a");
    buf.push("b");
    assert_eq!(buf.len(), 2);
    assert!(!buf.truncated());
}

#[test]
fn duration_is_none_until_both_timestamps_set() {
    let mut exec = StepExecution::new("plan");
    assert!(exec.duration().is_none());
    exec.start_time = Some(1000);
    assert!(exec.duration().is_none());
    exec.end_time = Some(2500);
    assert_eq!(exec.duration(), Some(Duration::from_millis(1500)));
}

#[test]
fn status_is_terminal_distinguishes_in_flight_from_done() {
    assert!(!StepStatus::Pending.is_terminal());
    assert!(!StepStatus::Running.is_terminal());
    for done in [StepStatus::Succeeded, StepStatus::Failed, StepStatus::TimedOut, StepStatus::Cancelled, StepStatus::Skipped] {
        assert!(done.is_terminal());
    }
}

#[test]
fn status_is_success_includes_skipped() {
    assert!(StepStatus::Succeeded.is_success());
    assert!(StepStatus::Skipped.is_success());
    assert!(!StepStatus::Failed.is_success());
}
