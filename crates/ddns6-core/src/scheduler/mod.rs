//! Fixed-period pass scheduler
//!
//! The scheduler turns a fallible pass into an unattended loop:
//!
//! 1. Every `period` a new pass is spawned as its own task
//! 2. Errors are logged, panics are caught at the task boundary, slow passes
//!    are cut off by the optional pass timeout
//! 3. Nothing a pass does can stop the next tick
//! 4. When the shutdown future resolves, ticking stops and in-flight passes
//!    get a drain window before they are aborted
//!
//! ## Overlap
//!
//! Passes are not mutually excluded. If a pass outlives the period the next
//! one starts anyway, exactly like a plain interval timer would. Provider
//! calls are keyed by record id, so two overlapping passes converge on the
//! same record state. The pass timeout bounds how many can pile up.

use crate::config::SchedulerConfig;
use crate::error::Result;
use crate::reconciler::log_pass_failure;
use std::future::Future;
use std::time::Duration;
use tokio::task::{JoinError, JoinSet};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Counters collected over the scheduler's lifetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerReport {
    /// Passes spawned
    pub started: u64,
    /// Passes that returned `Ok`
    pub succeeded: u64,
    /// Passes that returned `Err`
    pub failed: u64,
    /// Passes cut off by the pass timeout
    pub timed_out: u64,
    /// Passes that panicked
    pub panicked: u64,
    /// Passes still running when the drain window closed
    pub abandoned: u64,
}

impl SchedulerReport {
    /// Passes that finished, one way or another
    pub fn finished(&self) -> u64 {
        self.succeeded + self.failed + self.timed_out + self.panicked + self.abandoned
    }

    fn record(&mut self, joined: std::result::Result<PassResult, JoinError>) {
        match joined {
            Ok(PassResult::Succeeded) => self.succeeded += 1,
            Ok(PassResult::Failed) => self.failed += 1,
            Ok(PassResult::TimedOut) => self.timed_out += 1,
            Err(e) if e.is_panic() => {
                error!("Reconciliation pass panicked: {}", e);
                self.panicked += 1;
            }
            Err(_) => self.abandoned += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PassResult {
    Succeeded,
    Failed,
    TimedOut,
}

/// Drives a pass on a fixed period
///
/// ## Lifecycle
///
/// 1. Create with [`Scheduler::new()`] or [`Scheduler::from_config()`]
/// 2. Start with [`Scheduler::run()`], handing it a shutdown future
/// 3. `run()` returns a [`SchedulerReport`] once shut down
#[derive(Debug, Clone)]
pub struct Scheduler {
    /// Period between passes
    period: Duration,

    /// Upper bound for a single pass
    pass_timeout: Option<Duration>,

    /// How long to wait for in-flight passes on shutdown
    drain_timeout: Duration,
}

impl Scheduler {
    /// Create a scheduler with no pass timeout and a five second drain window
    pub fn new(period: Duration) -> Self {
        Self {
            // tokio::time::interval panics on a zero period
            period: period.max(Duration::from_millis(1)),
            pass_timeout: None,
            drain_timeout: Duration::from_secs(5),
        }
    }

    /// Create a scheduler from configuration
    pub fn from_config(config: &SchedulerConfig) -> Self {
        Self::new(config.interval())
            .with_pass_timeout(config.pass_timeout())
            .with_drain_timeout(config.drain_timeout())
    }

    /// Set the per-pass timeout (`None` disables it)
    pub fn with_pass_timeout(mut self, pass_timeout: Option<Duration>) -> Self {
        self.pass_timeout = pass_timeout;
        self
    }

    /// Set the shutdown drain window
    pub fn with_drain_timeout(mut self, drain_timeout: Duration) -> Self {
        self.drain_timeout = drain_timeout;
        self
    }

    /// Period between passes
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Run until `shutdown` resolves
    ///
    /// # Parameters
    ///
    /// - `pass`: called once per tick; the returned future runs as its own task
    /// - `shutdown`: resolves when the scheduler should stop
    ///
    /// The first pass starts immediately.
    pub async fn run<F, Fut, T, S>(&self, mut pass: F, shutdown: S) -> SchedulerReport
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
        S: Future<Output = ()>,
    {
        let mut report = SchedulerReport::default();
        let mut in_flight: JoinSet<PassResult> = JoinSet::new();

        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tokio::pin!(shutdown);

        info!("Scheduler started, period {:?}", self.period);

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    info!("Shutdown signal received, stopping scheduler");
                    break;
                }

                Some(joined) = in_flight.join_next() => {
                    report.record(joined);
                }

                _ = ticker.tick() => {
                    report.started += 1;
                    debug!("Starting reconciliation pass #{}", report.started);
                    in_flight.spawn(run_pass(pass(), self.pass_timeout));
                }
            }
        }

        if !in_flight.is_empty() {
            debug!(
                "Waiting up to {:?} for {} in-flight pass(es)",
                self.drain_timeout,
                in_flight.len()
            );

            let drained = tokio::time::timeout(self.drain_timeout, async {
                while let Some(joined) = in_flight.join_next().await {
                    report.record(joined);
                }
            })
            .await;

            if drained.is_err() {
                warn!(
                    "Abandoning {} in-flight pass(es) after {:?}",
                    in_flight.len(),
                    self.drain_timeout
                );
                in_flight.abort_all();
                while let Some(joined) = in_flight.join_next().await {
                    report.record(joined);
                }
            }
        }

        info!(
            "Scheduler stopped: {} pass(es) started, {} succeeded, {} failed, {} timed out, {} panicked, {} abandoned",
            report.started,
            report.succeeded,
            report.failed,
            report.timed_out,
            report.panicked,
            report.abandoned
        );

        report
    }
}

/// Run one pass to completion, logging its failure
async fn run_pass<Fut, T>(pass: Fut, timeout: Option<Duration>) -> PassResult
where
    Fut: Future<Output = Result<T>>,
{
    let result = match timeout {
        Some(limit) => match tokio::time::timeout(limit, pass).await {
            Ok(result) => result,
            Err(_) => {
                error!("Reconciliation pass timed out after {:?}", limit);
                return PassResult::TimedOut;
            }
        },
        None => pass.await,
    };

    match result {
        Ok(_) => PassResult::Succeeded,
        Err(e) => {
            log_pass_failure(&e);
            PassResult::Failed
        }
    }
}
