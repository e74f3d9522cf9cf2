//! Core data model
//!
//! Defines suites, test declarations, lifecycle statuses, outcomes, run
//! verdicts, and the aggregate run summary.

mod status;
mod suite;
mod summary;

pub use status::{RunVerdict, TestOutcome, TestStatus};
pub use suite::{Suite, TestDeclaration, TestId};
pub use summary::RunSummary;
