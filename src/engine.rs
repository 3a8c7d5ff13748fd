//! Parallel search: shared state, the trial coordinator and the worker pool.

use std::ops::ControlFlow;
use std::path::Path;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use rayon::ThreadPoolBuilder;
use rayon::iter::{ParallelBridge, ParallelIterator};
use tracing::{debug, error, warn};

use crate::config::SearchConfig;
use crate::error::{Result, TrialError};
use crate::report::Reporter;
use crate::shard::shards;
use crate::trial::PdfOpener;

/// Trial errors after the first are only logged once per this many.
const ERROR_LOG_STRIDE: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Wrong,
}

/// The password that latched the search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Winner {
    pub password: String,
    pub attempts: u64,
    pub elapsed: Duration,
    /// Set when the password was right but the decrypted copy could not be written.
    pub save_error: Option<String>,
}

/// State shared by every worker. Mutated only through atomics.
#[derive(Debug)]
pub struct EngineState {
    found: AtomicBool,
    attempts: AtomicU64,
    errors: AtomicU64,
    started: Instant,
    winner: OnceLock<Winner>,
}

impl EngineState {
    pub fn new() -> Self {
        Self {
            found: AtomicBool::new(false),
            attempts: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            started: Instant::now(),
            winner: OnceLock::new(),
        }
    }

    pub fn is_found(&self) -> bool {
        self.found.load(Ordering::Acquire)
    }

    pub fn found_flag(&self) -> &AtomicBool {
        &self.found
    }

    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }

    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn winner(&self) -> Option<&Winner> {
        self.winner.get()
    }

    /// Latches `found`. Returns `true` only for the first caller.
    fn latch(&self) -> bool {
        self.found
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Counts a trial error and decides whether it should be logged.
    fn record_error(&self) -> Option<u64> {
        let count = self.errors.fetch_add(1, Ordering::Relaxed) + 1;
        (count == 1 || count % ERROR_LOG_STRIDE == 0).then_some(count)
    }
}

impl Default for EngineState {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs candidates through the trial primitive and owns the shared state.
pub struct TrialCoordinator<'a, O: PdfOpener, R: Reporter> {
    opener: &'a O,
    reporter: &'a R,
    output_path: &'a Path,
    progress_stride: u64,
    state: EngineState,
}

impl<'a, O: PdfOpener, R: Reporter> TrialCoordinator<'a, O, R> {
    pub fn new(opener: &'a O, reporter: &'a R, output_path: &'a Path, progress_stride: u64) -> Self {
        Self {
            opener,
            reporter,
            output_path,
            progress_stride: progress_stride.max(1),
            state: EngineState::new(),
        }
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    /// Counted trial used by the workers.
    ///
    /// Skips all work once the search has latched. Errors other than a wrong
    /// password are logged and treated as a miss.
    pub fn try_candidate(&self, candidate: &str) -> Verdict {
        if self.state.is_found() {
            return Verdict::Wrong;
        }

        let attempts = self.state.attempts.fetch_add(1, Ordering::Relaxed) + 1;
        self.reporter.attempt();
        if attempts % self.progress_stride == 0 {
            self.reporter
                .progress(attempts, self.state.elapsed(), candidate);
        }

        match self.opener.open(candidate) {
            Ok(doc) => {
                self.claim(candidate, doc, attempts);
                Verdict::Correct
            }
            Err(e) => {
                self.log_trial_error(candidate, &e);
                Verdict::Wrong
            }
        }
    }

    /// Uncounted trial used by the warm-up phase. Silent on errors; the caller
    /// decides how to surface them.
    pub fn probe(&self, candidate: &str) -> std::result::Result<O::Unlocked, TrialError> {
        self.opener.open(candidate)
    }

    /// Latches the search for `password` and writes the decrypted copy.
    ///
    /// Only the first caller writes output and emits the success record.
    pub fn claim(&self, password: &str, doc: O::Unlocked, attempts: u64) -> bool {
        if !self.state.latch() {
            debug!(password, "password also accepted after the search latched");
            return false;
        }

        let elapsed = self.state.elapsed();
        let save_error = match self.opener.strip_security_and_save(doc, self.output_path) {
            Ok(()) => None,
            Err(e) => {
                error!(
                    output = %self.output_path.display(),
                    error = %e,
                    "Password accepted but the decrypted copy could not be written"
                );
                Some(e.to_string())
            }
        };

        self.reporter.found(password, attempts, elapsed);
        let _ = self.state.winner.set(Winner {
            password: password.to_string(),
            attempts,
            elapsed,
            save_error,
        });
        true
    }

    pub fn log_trial_error(&self, candidate: &str, e: &TrialError) {
        if e.is_wrong_password() {
            return;
        }
        if let Some(count) = self.state.record_error() {
            warn!(candidate, error = %e, errors = count, "Trial failed, treating as wrong password");
        }
    }
}

/// How the main phase ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Found(Winner),
    Exhausted { attempts: u64, elapsed: Duration },
}

/// Enumerates every shard on a fixed pool of `num_threads` workers.
///
/// Workers pull shards from the lazy partitioner in order, so pending work
/// never outgrows the pool. Returns once a password latches or every shard
/// is exhausted.
pub fn run_search<O: PdfOpener, R: Reporter>(
    config: &SearchConfig,
    charset: &[char],
    coordinator: &TrialCoordinator<'_, O, R>,
) -> Result<SearchOutcome> {
    let pool = ThreadPoolBuilder::new()
        .num_threads(config.num_threads)
        .thread_name(|i| format!("search-worker-{}", i))
        .build()?;

    let state = coordinator.state();
    let found = state.found_flag();

    pool.install(|| {
        let _ = shards(config, charset).par_bridge().try_for_each(|shard| {
            if state.is_found() {
                return Err(());
            }
            let _ = shard.for_each_candidate(charset, found, |candidate| {
                match coordinator.try_candidate(candidate) {
                    Verdict::Correct => ControlFlow::Break(()),
                    Verdict::Wrong => ControlFlow::Continue(()),
                }
            });
            Ok(())
        });
    });

    if state.errors() > 0 {
        warn!(errors = state.errors(), "Some trials failed with errors other than a wrong password");
    }

    Ok(match state.winner() {
        Some(winner) => SearchOutcome::Found(winner.clone()),
        None => SearchOutcome::Exhausted {
            attempts: state.attempts(),
            elapsed: state.elapsed(),
        },
    })
}
