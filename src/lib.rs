//! suite-engine - Concurrent Test-Suite Execution Engine
//!
//! Runs independently-loaded test suites with a bounded degree of
//! concurrency: suites execute in parallel up to the pool size, tests within
//! a suite run strictly in declared order, and every test's live status is
//! observable while the run is in flight.
//!
//! ## Features
//!
//! - Suite-level concurrency gating through a FIFO slot pool
//! - Sequential in-suite execution with a fairness yield between tests
//! - Broadcast "test started" and per-test status event streams
//! - Cooperative shutdown: in-flight tests finish their own cleanup
//! - Three-valued run verdict: passed, failed, or closed early
//!
//! ## Usage
//!
//! ```no_run
//! use suite_engine::{Engine, Suite, TestDeclaration, TestOutcome};
//!
//! # async fn demo() {
//! let suite = Suite::new("smoke")
//!     .with_test(TestDeclaration::new("boots", |_signal| async {
//!         TestOutcome::Success
//!     }))
//!     .with_test(TestDeclaration::new("responds", |signal| async move {
//!         // cooperate with early shutdown between steps
//!         if signal.is_closed() {
//!             return TestOutcome::Failure("closed before assertion".into());
//!         }
//!         TestOutcome::Success
//!     }));
//!
//! let engine = Engine::new(vec![suite], 2);
//! let verdict = engine.run().await.expect("first run");
//! assert_eq!(verdict.as_bool(), Some(true));
//! # }
//! ```

pub mod engine;
pub mod error;
pub mod live;
pub mod models;
pub mod utils;

pub use engine::{Engine, Pool, PoolSlot, SuiteAttacher};
pub use error::EngineError;
pub use live::{CloseSignal, LiveTest};
pub use models::{RunSummary, RunVerdict, Suite, TestDeclaration, TestId, TestOutcome, TestStatus};
