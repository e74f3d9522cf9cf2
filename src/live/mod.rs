//! Live test handles
//!
//! A [`LiveTest`] tracks one test's execution: monotonic status, broadcast
//! status-transition events, the recorded terminal outcome, and a
//! cooperative close signal. The engine drives handles; the test body
//! supplied in the declaration does the actual work.

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tokio::sync::{broadcast, watch};
use tracing::debug;

use crate::models::{TestDeclaration, TestId, TestOutcome, TestStatus};
use crate::utils::Timer;

/// Backlog per status stream; subscribers slower than this observe lag.
const EVENT_CAPACITY: usize = 64;

/// Type-erased test body: consumed exactly once by [`LiveTest::run`].
pub(crate) type BoxedBody =
    Box<dyn FnOnce(CloseSignal) -> futures::future::BoxFuture<'static, TestOutcome> + Send>;

/// Cooperative shutdown signal handed to every test body.
///
/// Close is advisory: the engine never aborts a running body, it only raises
/// this signal. Bodies that want to react early should poll [`is_closed`]
/// between steps or await [`closed`].
///
/// [`is_closed`]: CloseSignal::is_closed
/// [`closed`]: CloseSignal::closed
#[derive(Clone, Debug)]
pub struct CloseSignal {
    rx: watch::Receiver<bool>,
}

impl CloseSignal {
    pub fn is_closed(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once close has been requested
    pub async fn closed(&mut self) {
        let _ = self.rx.wait_for(|closed| *closed).await;
    }
}

/// Runtime handle for one test.
///
/// Status is monotonic (`Pending` -> `Running` -> `Complete`); each
/// transition is broadcast to subscribers. The outcome and duration are
/// recorded before the `Complete` event fires, so listeners reading them on
/// that event always see final values.
pub struct LiveTest {
    id: TestId,
    name: String,
    status: watch::Sender<TestStatus>,
    events: broadcast::Sender<TestStatus>,
    close_tx: watch::Sender<bool>,
    body: Mutex<Option<BoxedBody>>,
    outcome: Mutex<Option<TestOutcome>>,
    duration_ms: AtomicU64,
}

impl LiveTest {
    pub(crate) fn new(id: TestId, declaration: TestDeclaration) -> Self {
        let (name, body) = declaration.into_parts();
        let (status, _) = watch::channel(TestStatus::Pending);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let (close_tx, _) = watch::channel(false);

        Self {
            id,
            name,
            status,
            events,
            close_tx,
            body: Mutex::new(Some(body)),
            outcome: Mutex::new(None),
            duration_ms: AtomicU64::new(0),
        }
    }

    pub fn id(&self) -> TestId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current lifecycle status
    pub fn status(&self) -> TestStatus {
        *self.status.borrow()
    }

    /// Terminal outcome; `Some` once status is `Complete`
    pub fn outcome(&self) -> Option<TestOutcome> {
        self.outcome.lock().expect("outcome lock poisoned").clone()
    }

    /// Elapsed run time in milliseconds; 0 until the test completes
    pub fn duration_ms(&self) -> u64 {
        self.duration_ms.load(Ordering::Relaxed)
    }

    /// Subscribe to status transitions.
    ///
    /// Late subscribers miss events sent before subscription; the stream is
    /// terminal after `Complete`.
    pub fn subscribe(&self) -> broadcast::Receiver<TestStatus> {
        self.events.subscribe()
    }

    /// Drive the test body to completion.
    ///
    /// Invoked at most once per handle by the suite pipeline; a repeat call
    /// is a no-op. A panicking body is contained and recorded as
    /// [`TestOutcome::Error`]; it never propagates.
    pub async fn run(&self) {
        let body = self.body.lock().expect("body lock poisoned").take();
        let Some(body) = body else {
            debug!("{} already ran; ignoring repeat run()", self.name);
            return;
        };

        let timer = Timer::start();
        self.advance(TestStatus::Running);

        let signal = CloseSignal {
            rx: self.close_tx.subscribe(),
        };
        let outcome = match AssertUnwindSafe(body(signal)).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(panic) => TestOutcome::Error(panic_message(panic)),
        };

        self.duration_ms.store(timer.elapsed_ms(), Ordering::Relaxed);
        debug!("{} settled: {}", self.name, outcome);

        *self.outcome.lock().expect("outcome lock poisoned") = Some(outcome);
        self.advance(TestStatus::Complete);
    }

    /// Request early termination.
    ///
    /// Idempotent. Raises the close signal and resolves once the handle is
    /// no longer `Running`: immediately for a pending or complete test, and
    /// after the body finishes its own shutdown path for a running one.
    pub async fn close(&self) {
        self.close_tx.send_replace(true);

        let mut status = self.status.subscribe();
        let _ = status
            .wait_for(|status| *status != TestStatus::Running)
            .await;
    }

    /// Advance status monotonically, broadcasting the transition
    fn advance(&self, next: TestStatus) {
        let advanced = self.status.send_if_modified(|current| {
            if next > *current {
                *current = next;
                true
            } else {
                false
            }
        });

        if advanced {
            let _ = self.events.send(next);
        }
    }
}

impl std::fmt::Debug for LiveTest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveTest")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "test body panicked".to_string()
    }
}
