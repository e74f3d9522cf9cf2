//! Engine error taxonomy
//!
//! Only programmer-misuse errors surface from engine operations. Per-test
//! failures and faults are recorded on the owning live test handle and
//! reported through its event stream, never as `Err` from the engine.

use thiserror::Error;

/// Errors returned by [`Engine`](crate::Engine) operations.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// `run()` was invoked more than once on the same engine.
    #[error("run() may only be called once per engine")]
    InvalidState,

    /// A suite was attached after the engine stopped accepting suites.
    #[error("engine is no longer accepting suites")]
    NotAccepting,
}
