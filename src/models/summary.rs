//! Aggregate run summary
//!
//! A pure fold over final handle states, computed only after every suite
//! pipeline has resolved.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::live::LiveTest;
use crate::models::{TestOutcome, TestStatus};

/// Summary of a completed (or closed) run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub pending: usize,
    pub total_duration_ms: u64,
}

impl RunSummary {
    pub fn from_tests(tests: &[Arc<LiveTest>]) -> Self {
        let mut summary = Self {
            total: tests.len(),
            passed: 0,
            failed: 0,
            errors: 0,
            pending: 0,
            total_duration_ms: 0,
        };

        for test in tests {
            summary.total_duration_ms += test.duration_ms();

            if test.status() != TestStatus::Complete {
                summary.pending += 1;
                continue;
            }

            match test.outcome() {
                Some(TestOutcome::Success) => summary.passed += 1,
                Some(TestOutcome::Failure(_)) => summary.failed += 1,
                // a complete handle without an outcome is treated as a fault
                Some(TestOutcome::Error(_)) | None => summary.errors += 1,
            }
        }

        summary
    }

    pub fn all_passed(&self) -> bool {
        self.passed == self.total
    }

    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.passed as f64 / self.total as f64) * 100.0
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Total: {} | Pass: {} | Fail: {} | Error: {} | Pending: {} ({:.1}%, {}ms)",
            self.total,
            self.passed,
            self.failed,
            self.errors,
            self.pending,
            self.pass_rate(),
            self.total_duration_ms
        )
    }
}
