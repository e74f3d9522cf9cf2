//! Suites and test declarations
//!
//! The input shape supplied by the loading collaborator: named suites of
//! named async test bodies. The engine converts each declaration into a
//! live test handle at registration time.

use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;

use crate::live::{BoxedBody, CloseSignal};
use crate::models::TestOutcome;

/// Positional identity of a test: suite order, then in-suite order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TestId {
    pub suite: usize,
    pub index: usize,
}

impl fmt::Display for TestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.suite, self.index)
    }
}

/// A declared test: a name plus the async body that executes it.
///
/// The body receives a [`CloseSignal`] it can poll or await to cooperate
/// with early shutdown; it resolves to the test's terminal outcome.
pub struct TestDeclaration {
    name: String,
    body: BoxedBody,
}

impl TestDeclaration {
    pub fn new<F, Fut>(name: impl Into<String>, body: F) -> Self
    where
        F: FnOnce(CloseSignal) -> Fut + Send + 'static,
        Fut: Future<Output = TestOutcome> + Send + 'static,
    {
        Self {
            name: name.into(),
            body: Box::new(move |signal| body(signal).boxed()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn into_parts(self) -> (String, BoxedBody) {
        (self.name, self.body)
    }
}

impl fmt::Debug for TestDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestDeclaration")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// An ordered group of test declarations sharing a loading context.
///
/// Immutable once handed to the engine; identity is its position in the
/// engine's input order.
#[derive(Debug)]
pub struct Suite {
    name: String,
    tests: Vec<TestDeclaration>,
}

impl Suite {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tests: Vec::new(),
        }
    }

    /// Append a test declaration, preserving declaration order
    pub fn with_test(mut self, test: TestDeclaration) -> Self {
        self.tests.push(test);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    pub(crate) fn into_parts(self) -> (String, Vec<TestDeclaration>) {
        (self.name, self.tests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display() {
        let id = TestId { suite: 2, index: 0 };
        assert_eq!(id.to_string(), "2.0");
    }

    #[test]
    fn test_suite_builder_preserves_order() {
        let suite = Suite::new("routing")
            .with_test(TestDeclaration::new("first", |_signal| async {
                TestOutcome::Success
            }))
            .with_test(TestDeclaration::new("second", |_signal| async {
                TestOutcome::Success
            }));

        assert_eq!(suite.name(), "routing");
        assert_eq!(suite.len(), 2);

        let (_, tests) = suite.into_parts();
        let names: Vec<_> = tests.iter().map(|t| t.name().to_string()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn test_empty_suite() {
        let suite = Suite::new("empty");
        assert!(suite.is_empty());
        assert_eq!(suite.len(), 0);
    }
}
