//! Throughput calibration before the main search.

use std::time::{Duration, Instant};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::error;

use crate::config::SearchConfig;
use crate::engine::TrialCoordinator;
use crate::report::Reporter;
use crate::trial::PdfOpener;

/// Longest body length the warm-up samples.
const WARMUP_MAX_BODY_LEN: usize = 7;

/// Timing of the sampled trials.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WarmupEstimate {
    pub attempts: usize,
    pub elapsed: Duration,
    /// Trials that failed for a reason other than a wrong password.
    pub errors: usize,
}

impl WarmupEstimate {
    pub fn avg_seconds_per_attempt(&self) -> f64 {
        if self.attempts == 0 {
            return 0.0;
        }
        self.elapsed.as_secs_f64() / self.attempts as f64
    }

    /// Serial time to try every candidate.
    pub fn worst_case_seconds(&self, total: u64) -> f64 {
        total as f64 * self.avg_seconds_per_attempt()
    }

    pub fn average_case_seconds(&self, total: u64) -> f64 {
        self.worst_case_seconds(total) / 2.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Warmup {
    /// A sampled candidate opened the document; it has been written out.
    Found { password: String, attempts: usize },
    Estimated(WarmupEstimate),
}

/// Body lengths drawn by the warm-up, kept near the short end of the range.
pub fn sample_lengths(min_len: usize, max_len: usize) -> (usize, usize) {
    let hi = (min_len + 2).min(WARMUP_MAX_BODY_LEN).min(max_len);
    (min_len, hi.max(min_len))
}

/// Draws `count` reproducible candidates from the search space.
pub fn sample_candidates(config: &SearchConfig, charset: &[char], count: usize) -> Vec<String> {
    let mut rng = ChaCha8Rng::seed_from_u64(config.scramble_seed);
    let (lo, hi) = sample_lengths(config.min_len, config.max_len);

    (0..count)
        .map(|_| {
            let prefix = &config.prefixes[rng.gen_range(0..config.prefixes.len())];
            let suffix = &config.suffixes[rng.gen_range(0..config.suffixes.len())];
            let body_len = rng.gen_range(lo..=hi);

            let mut candidate = String::with_capacity(prefix.len() + body_len + suffix.len());
            candidate.push_str(prefix);
            for _ in 0..body_len {
                candidate.push(charset[rng.gen_range(0..charset.len())]);
            }
            candidate.push_str(suffix);
            candidate
        })
        .collect()
}

/// Times `config.warmup_attempts` serial trials on the calling thread.
///
/// A candidate that opens the document is claimed through `coordinator`, which
/// writes the output, and the warm-up stops there.
pub fn run_warmup<O: PdfOpener, R: Reporter>(
    config: &SearchConfig,
    charset: &[char],
    coordinator: &TrialCoordinator<'_, O, R>,
) -> Warmup {
    let candidates = sample_candidates(config, charset, config.warmup_attempts);
    let mut errors = 0;

    let start = Instant::now();
    for (i, candidate) in candidates.iter().enumerate() {
        match coordinator.probe(candidate) {
            Ok(doc) => {
                let attempts = i + 1;
                coordinator.claim(candidate, doc, attempts as u64);
                return Warmup::Found {
                    password: candidate.clone(),
                    attempts,
                };
            }
            Err(e) if e.is_wrong_password() => {}
            Err(e) => {
                if errors == 0 {
                    error!(candidate = %candidate, error = %e, "Warm-up trial failed");
                }
                errors += 1;
            }
        }
    }

    Warmup::Estimated(WarmupEstimate {
        attempts: candidates.len(),
        elapsed: start.elapsed(),
        errors,
    })
}
