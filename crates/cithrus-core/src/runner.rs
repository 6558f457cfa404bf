//! Running a pipeline on its own thread.
//!
//! [`AsyncPipelineRunner`] takes ownership of a [`Pipeline`] and ticks it on a
//! dedicated thread until asked to stop. Errors and panics escaping a tick
//! end that thread only: they are caught at the thread boundary, logged, and
//! reported in the [`RunnerReport`]. Other runners are unaffected.
//!
//! Cancellation is cooperative and checked between ticks. A component that
//! hangs inside `process()` hangs its runner.

use std::any::Any;
use std::fmt;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::pipeline::Pipeline;

/// Runner settings.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Minimum time between tick starts. `None` ticks as fast as possible.
    pub tick_interval: Option<Duration>,
    /// Name of the spawned thread.
    pub thread_name: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            tick_interval: None,
            thread_name: "cithrus-pipeline".to_owned(),
        }
    }
}

/// Why a runner's thread ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Stopped on request.
    Stopped,
    /// A tick returned an error.
    Failed(String),
    /// A tick panicked.
    Panicked(String),
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stopped => f.write_str("stopped"),
            Self::Failed(msg) => write!(f, "failed: {msg}"),
            Self::Panicked(msg) => write!(f, "panicked: {msg}"),
        }
    }
}

/// Final state of a runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerReport {
    /// Ticks completed successfully.
    pub ticks: u64,
    /// How the thread ended.
    pub outcome: RunOutcome,
}

impl RunnerReport {
    /// Returns `true` if the runner stopped on request.
    pub fn is_clean(&self) -> bool {
        self.outcome == RunOutcome::Stopped
    }
}

/// Ticks a pipeline on a dedicated thread.
///
/// Dropping the runner requests a stop and joins the thread; the pipeline is
/// torn down on the runner thread before the join returns.
pub struct AsyncPipelineRunner {
    stop: Arc<AtomicBool>,
    ticks: Arc<AtomicU64>,
    handle: Option<JoinHandle<RunnerReport>>,
}

impl AsyncPipelineRunner {
    /// Starts ticking `pipeline` with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the thread cannot be spawned.
    pub fn spawn(pipeline: Pipeline) -> io::Result<Self> {
        Self::spawn_with(pipeline, RunnerConfig::default())
    }

    /// Starts ticking `pipeline` with `config`.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the thread cannot be spawned.
    pub fn spawn_with(pipeline: Pipeline, config: RunnerConfig) -> io::Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let ticks = Arc::new(AtomicU64::new(0));

        let handle = thread::Builder::new().name(config.thread_name.clone()).spawn({
            let stop = Arc::clone(&stop);
            let ticks = Arc::clone(&ticks);
            move || run_loop(pipeline, config.tick_interval, &stop, &ticks)
        })?;

        Ok(Self {
            stop,
            ticks,
            handle: Some(handle),
        })
    }

    /// Ticks completed so far.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Returns `true` once the runner thread has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Requests a stop, waits for the thread, and returns its report.
    pub fn stop(mut self) -> RunnerReport {
        self.shutdown()
    }

    fn shutdown(&mut self) -> RunnerReport {
        self.stop.store(true, Ordering::Release);
        let Some(handle) = self.handle.take() else {
            return RunnerReport {
                ticks: self.ticks(),
                outcome: RunOutcome::Stopped,
            };
        };
        handle.thread().unpark();
        match handle.join() {
            Ok(report) => report,
            Err(payload) => RunnerReport {
                ticks: self.ticks(),
                outcome: RunOutcome::Panicked(panic_message(&*payload)),
            },
        }
    }
}

impl Drop for AsyncPipelineRunner {
    fn drop(&mut self) {
        if self.handle.is_some() {
            let report = self.shutdown();
            tracing::debug!("runner dropped after {} ticks ({})", report.ticks, report.outcome);
        }
    }
}

impl fmt::Debug for AsyncPipelineRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncPipelineRunner")
            .field("ticks", &self.ticks())
            .field("finished", &self.is_finished())
            .finish()
    }
}

fn run_loop(
    mut pipeline: Pipeline,
    interval: Option<Duration>,
    stop: &AtomicBool,
    ticks: &AtomicU64,
) -> RunnerReport {
    tracing::info!(
        "runner: starting pipeline [{}]",
        pipeline.component_names().join(" → ")
    );

    let mut completed = 0;
    let outcome = loop {
        if stop.load(Ordering::Acquire) {
            break RunOutcome::Stopped;
        }
        let started = Instant::now();

        match panic::catch_unwind(AssertUnwindSafe(|| pipeline.run())) {
            Ok(Ok(())) => {
                completed += 1;
                ticks.store(completed, Ordering::Relaxed);
            }
            Ok(Err(e)) => {
                tracing::error!("runner: tick {completed} failed: {e}");
                break RunOutcome::Failed(e.to_string());
            }
            Err(payload) => {
                let msg = panic_message(&*payload);
                tracing::error!("runner: tick {completed} panicked: {msg}");
                break RunOutcome::Panicked(msg);
            }
        }

        if let Some(interval) = interval {
            let deadline = started + interval;
            while !stop.load(Ordering::Acquire) {
                let now = Instant::now();
                if now >= deadline {
                    break;
                }
                thread::park_timeout(deadline - now);
            }
        }
    };

    drop(pipeline);
    tracing::info!("runner: {outcome} after {completed} ticks");
    RunnerReport {
        ticks: completed,
        outcome,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
