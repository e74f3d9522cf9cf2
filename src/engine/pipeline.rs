//! Suite pipeline
//!
//! Sequential driver for one suite: runs its tests in declared order with no
//! overlap, honoring the engine's closed flag between tests.

use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing::debug;

use super::ScheduledSuite;
use crate::live::LiveTest;

/// Runs one suite's tests to completion, in order
pub(crate) struct Pipeline {
    closed: watch::Receiver<bool>,
    started: broadcast::Sender<Arc<LiveTest>>,
}

impl Pipeline {
    pub(crate) fn new(
        closed: watch::Receiver<bool>,
        started: broadcast::Sender<Arc<LiveTest>>,
    ) -> Self {
        Self { closed, started }
    }

    /// Execute the suite: for each test in order, stop if the engine has
    /// been closed; otherwise announce the test, run it to settlement, then
    /// yield so other pipelines' completions interleave fairly.
    pub(crate) async fn execute(&self, suite: ScheduledSuite) {
        debug!(
            "suite {} '{}': {} tests",
            suite.index,
            suite.name,
            suite.tests.len()
        );

        for test in &suite.tests {
            if *self.closed.borrow() {
                debug!(
                    "suite '{}' stopping before '{}': engine closed",
                    suite.name,
                    test.name()
                );
                break;
            }

            // announced strictly before the handle's first state event
            let _ = self.started.send(test.clone());
            test.run().await;

            tokio::task::yield_now().await;
        }
    }
}
