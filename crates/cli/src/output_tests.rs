// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Contributors

use super::*;

#[test]
fn format_time_ago_handles_zero_as_unset() {
    assert_eq!(format_time_ago(0), "-");
}

#[test]
fn format_elapsed_buckets_by_unit() {
    assert_eq!(format_elapsed(5), "5s");
    assert_eq!(format_elapsed(90), "1m");
    assert_eq!(format_elapsed(7200), "2h");
    assert_eq!(format_elapsed(2 * 86400), "2d");
}
