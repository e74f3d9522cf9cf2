//! Test execution engine
//!
//! Owns every suite's live test handles, gates suite pipelines through the
//! concurrency pool, broadcasts "test started" events, and aggregates the
//! overall run verdict. Shutdown is cooperative: closing prevents future
//! tests from starting and lets in-flight tests finish their own cleanup.

mod pipeline;
mod pool;

pub use pool::{Pool, PoolSlot};

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::error::EngineError;
use crate::live::LiveTest;
use crate::models::{RunSummary, RunVerdict, Suite, TestId};
use crate::utils::Timer;
use pipeline::Pipeline;

/// Backlog of the started-event stream; slow subscribers observe lag.
const EVENT_CAPACITY: usize = 64;

/// A registered suite: its positional index plus the live handles built
/// from its declarations, in declaration order.
pub(crate) struct ScheduledSuite {
    pub(crate) index: usize,
    pub(crate) name: String,
    pub(crate) tests: Vec<Arc<LiveTest>>,
}

/// Order-preserving registry of every live test handle across all suites.
struct Registry {
    tests: RwLock<Vec<Arc<LiveTest>>>,
    next_suite: AtomicUsize,
}

impl Registry {
    fn new() -> Self {
        Self {
            tests: RwLock::new(Vec::new()),
            next_suite: AtomicUsize::new(0),
        }
    }

    /// Build handles for a suite and append them to the flattened view
    fn register(&self, suite: Suite) -> ScheduledSuite {
        let index = self.next_suite.fetch_add(1, Ordering::SeqCst);
        let (name, declarations) = suite.into_parts();

        let tests: Vec<Arc<LiveTest>> = declarations
            .into_iter()
            .enumerate()
            .map(|(position, declaration)| {
                Arc::new(LiveTest::new(
                    TestId {
                        suite: index,
                        index: position,
                    },
                    declaration,
                ))
            })
            .collect();

        self.tests
            .write()
            .expect("registry lock poisoned")
            .extend(tests.iter().cloned());

        ScheduledSuite { index, name, tests }
    }

    /// Drop a suite's handles after a failed attach
    fn remove_suite(&self, index: usize) {
        self.tests
            .write()
            .expect("registry lock poisoned")
            .retain(|test| test.id().suite != index);
    }

    fn snapshot(&self) -> Vec<Arc<LiveTest>> {
        self.tests.read().expect("registry lock poisoned").clone()
    }

    fn suite_count(&self) -> usize {
        self.next_suite.load(Ordering::SeqCst)
    }
}

/// Concurrent test-suite execution engine.
///
/// Suites run concurrently up to the pool size; tests within a suite run
/// strictly in declared order. `run()` may be called once; `close()` any
/// number of times.
pub struct Engine {
    registry: Arc<Registry>,
    pool: Pool,
    closed: watch::Sender<bool>,
    started: broadcast::Sender<Arc<LiveTest>>,
    suite_tx: Mutex<Option<mpsc::UnboundedSender<ScheduledSuite>>>,
    suite_rx: Mutex<Option<mpsc::UnboundedReceiver<ScheduledSuite>>>,
}

impl Engine {
    /// Build an engine from an ordered collection of suites.
    ///
    /// One live test handle is created per declared test, preserving suite
    /// order and in-suite order. `concurrency` bounds how many suite
    /// pipelines may be active at once (clamped to at least 1).
    pub fn new(suites: Vec<Suite>, concurrency: usize) -> Self {
        let registry = Arc::new(Registry::new());
        let (suite_tx, suite_rx) = mpsc::unbounded_channel();

        for suite in suites {
            let scheduled = registry.register(suite);
            // the receiver is held by this engine, so send cannot fail here
            let _ = suite_tx.send(scheduled);
        }

        let (closed, _) = watch::channel(false);
        let (started, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            registry,
            pool: Pool::new(concurrency),
            closed,
            started,
            suite_tx: Mutex::new(Some(suite_tx)),
            suite_rx: Mutex::new(Some(suite_rx)),
        }
    }

    /// Fully sequential engine: one suite pipeline at a time
    pub fn sequential(suites: Vec<Suite>) -> Self {
        Self::new(suites, 1)
    }

    /// Subscribe to "test started" events.
    ///
    /// Each handle is announced exactly once, immediately before its
    /// pipeline invokes `run()` on it and strictly before the handle's first
    /// state-change event. Subscribers see events from the moment of
    /// subscription onward; subscribe before calling [`run`](Engine::run) to
    /// observe the first tests.
    pub fn on_test_started(&self) -> broadcast::Receiver<Arc<LiveTest>> {
        self.started.subscribe()
    }

    /// Order-preserving snapshot of every live test handle (suite order,
    /// then in-suite order); usable before, during, and after the run.
    pub fn live_tests(&self) -> Vec<Arc<LiveTest>> {
        self.registry.snapshot()
    }

    /// Whether close has been requested
    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    /// Aggregate summary over the current state of every handle
    pub fn summary(&self) -> RunSummary {
        RunSummary::from_tests(&self.live_tests())
    }

    /// Obtain a handle for attaching suites after construction.
    ///
    /// A pause collaborator holds a suite back, lets the engine run, and
    /// attaches it once its pause window completes; the run stays open until
    /// every outstanding attacher has attached or been dropped. Attachers
    /// must be created before `run()` begins.
    pub fn attacher(&self) -> Result<SuiteAttacher, EngineError> {
        let sender = self
            .suite_tx
            .lock()
            .expect("suite sender lock poisoned")
            .as_ref()
            .cloned()
            .ok_or(EngineError::NotAccepting)?;

        Ok(SuiteAttacher {
            registry: self.registry.clone(),
            sender,
        })
    }

    /// Run every suite to completion.
    ///
    /// Callable exactly once; subsequent calls fail with
    /// [`EngineError::InvalidState`]. Each suite pipeline acquires a pool
    /// slot, executes its tests in order, and releases the slot. Resolves
    /// only after every pipeline has resolved, with:
    ///
    /// - [`RunVerdict::Passed`] if every test's outcome is success,
    /// - [`RunVerdict::Failed`] if any test failed or errored,
    /// - [`RunVerdict::ClosedEarly`] if [`close`](Engine::close) was
    ///   requested before natural completion.
    pub async fn run(&self) -> Result<RunVerdict, EngineError> {
        let mut suite_rx = self
            .suite_rx
            .lock()
            .expect("suite receiver lock poisoned")
            .take()
            .ok_or(EngineError::InvalidState)?;

        // Release the engine's own sender so the suite channel closes once
        // outstanding attachers are gone.
        self.suite_tx
            .lock()
            .expect("suite sender lock poisoned")
            .take();

        let timer = Timer::start();
        info!(
            "starting run: {} suites, pool size {}",
            self.registry.suite_count(),
            self.pool.size()
        );

        let mut pipelines: JoinSet<()> = JoinSet::new();
        let mut closed_rx = self.closed.subscribe();
        let mut accepting = true;

        while accepting || !pipelines.is_empty() {
            tokio::select! {
                next = suite_rx.recv(), if accepting => match next {
                    Some(suite) => {
                        if *self.closed.borrow() {
                            debug!("engine closed; suite '{}' not scheduled", suite.name);
                            continue;
                        }
                        let pool = self.pool.clone();
                        let pipeline = Pipeline::new(self.closed.subscribe(), self.started.clone());
                        pipelines.spawn(async move {
                            let _slot = pool.acquire().await;
                            pipeline.execute(suite).await;
                        });
                    }
                    None => accepting = false,
                },
                _ = closed_rx.wait_for(|closed| *closed), if accepting => {
                    // stop waiting for further suites; running pipelines
                    // notice the flag between tests
                    accepting = false;
                }
                Some(joined) = pipelines.join_next(), if !pipelines.is_empty() => {
                    if let Err(err) = joined {
                        warn!("suite pipeline task failed: {err}");
                    }
                }
            }
        }

        if *self.closed.borrow() {
            info!("run closed early after {}ms", timer.elapsed_ms());
            return Ok(RunVerdict::ClosedEarly);
        }

        let summary = self.summary();
        info!("run finished in {}ms: {}", timer.elapsed_ms(), summary);

        Ok(if summary.all_passed() {
            RunVerdict::Passed
        } else {
            RunVerdict::Failed
        })
    }

    /// Request cooperative shutdown.
    ///
    /// Idempotent. Sets the closed flag, which stops every pipeline from
    /// advancing past its current test, and forwards a close request to
    /// every currently-known handle. Resolves once all those requests have
    /// resolved; in-flight tests finish their own shutdown path and are
    /// never forcibly killed. Repeat calls return immediately: each handle
    /// receives at most one close request.
    pub async fn close(&self) {
        let was_closed = self.closed.send_replace(true);
        if was_closed {
            debug!("close requested again; handles already notified");
            return;
        }
        info!("closing engine");

        let tests = self.live_tests();
        futures::future::join_all(tests.iter().map(|test| test.close())).await;
    }
}

/// Handle for attaching an externally-held suite to a constructed engine.
///
/// While an attacher is outstanding, [`Engine::run`] stays open waiting for
/// its suite; dropping the attacher without attaching releases the run.
pub struct SuiteAttacher {
    registry: Arc<Registry>,
    sender: mpsc::UnboundedSender<ScheduledSuite>,
}

impl std::fmt::Debug for SuiteAttacher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuiteAttacher").finish_non_exhaustive()
    }
}

impl SuiteAttacher {
    /// Register and schedule a suite.
    ///
    /// Fails with [`EngineError::NotAccepting`] once the engine's run has
    /// finished or was never able to accept the suite; a suite registered in
    /// a failed attach is rolled back so it never appears in
    /// [`Engine::live_tests`].
    pub fn attach(&self, suite: Suite) -> Result<(), EngineError> {
        if self.sender.is_closed() {
            return Err(EngineError::NotAccepting);
        }

        let scheduled = self.registry.register(suite);
        let index = scheduled.index;

        if self.sender.send(scheduled).is_err() {
            self.registry.remove_suite(index);
            return Err(EngineError::NotAccepting);
        }

        Ok(())
    }
}
