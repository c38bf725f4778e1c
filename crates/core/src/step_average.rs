// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Contributors

//! Exponentially-weighted running average of step durations, used for ETA
//! display.
//!
//! This intentionally uses a simple IIR filter (`avg <- (avg + sample) / 2`)
//! rather than an arithmetic mean: it weighs recent runs more heavily and
//! needs no history beyond the current average, at the cost of diverging
//! from a plain `SUM(duration)/COUNT(*)` over the same rows.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepAverage {
    pub step_name: String,
    pub avg_ms: f64,
    pub sample_count: u64,
}

impl StepAverage {
    pub fn new(step_name: impl Into<String>) -> Self {
        Self { step_name: step_name.into(), avg_ms: 0.0, sample_count: 0 }
    }
}

impl PartialEq<&str> for StepAverage {
    fn eq(&self, other: &&str) -> bool {
        self.step_name == *other
    }
}

/// Fold one new sample into the running average.
///
/// The first sample for a step seeds the average directly (there is no
/// prior value to blend with); every subsequent sample applies the IIR
/// update. Feeding in `avg.avg_ms` again is a no-op: `(x + x) / 2 == x`.
pub fn update(avg: StepAverage, sample_ms: f64) -> StepAverage {
    let avg_ms = if avg.sample_count == 0 { sample_ms } else { (avg.avg_ms + sample_ms) / 2.0 };
    StepAverage { step_name: avg.step_name, avg_ms, sample_count: avg.sample_count + 1 }
}

#[cfg(test)]
#[path = "step_average_tests.rs"]
mod tests;
