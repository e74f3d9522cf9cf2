//! Lifecycle status, terminal outcome, and run verdict types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a single test.
///
/// Transitions are monotonic: `Pending` -> `Running` -> `Complete`, never
/// backwards. The `Ord` impl encodes that progression.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Pending,
    Running,
    Complete,
}

impl TestStatus {
    /// Whether this status is terminal
    pub fn is_terminal(&self) -> bool {
        matches!(self, TestStatus::Complete)
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestStatus::Pending => write!(f, "PENDING"),
            TestStatus::Running => write!(f, "RUNNING"),
            TestStatus::Complete => write!(f, "COMPLETE"),
        }
    }
}

/// Terminal outcome of a single test.
///
/// Meaningful only once the test's status is [`TestStatus::Complete`].
/// `Failure` is an assertion-style failure; `Error` is an unexpected fault,
/// including a panicking test body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", content = "message", rename_all = "lowercase")]
pub enum TestOutcome {
    Success,
    Failure(String),
    Error(String),
}

impl TestOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TestOutcome::Success)
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            TestOutcome::Success => "✓",
            TestOutcome::Failure(_) => "✗",
            TestOutcome::Error(_) => "!",
        }
    }

    /// Failure or error message, if any
    pub fn message(&self) -> Option<&str> {
        match self {
            TestOutcome::Success => None,
            TestOutcome::Failure(message) | TestOutcome::Error(message) => Some(message),
        }
    }
}

impl fmt::Display for TestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestOutcome::Success => write!(f, "PASS"),
            TestOutcome::Failure(message) => write!(f, "FAIL - {message}"),
            TestOutcome::Error(message) => write!(f, "ERROR - {message}"),
        }
    }
}

/// Overall result of an engine run.
///
/// `ClosedEarly` means the engine was closed before natural completion; it
/// carries no boolean verdict and must never be coerced to pass or fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunVerdict {
    Passed,
    Failed,
    ClosedEarly,
}

impl RunVerdict {
    /// The boolean outcome, or `None` for a run closed before completion
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            RunVerdict::Passed => Some(true),
            RunVerdict::Failed => Some(false),
            RunVerdict::ClosedEarly => None,
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, RunVerdict::ClosedEarly)
    }
}

impl fmt::Display for RunVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunVerdict::Passed => write!(f, "PASSED"),
            RunVerdict::Failed => write!(f, "FAILED"),
            RunVerdict::ClosedEarly => write!(f, "CLOSED EARLY"),
        }
    }
}
