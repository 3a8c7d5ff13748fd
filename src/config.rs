//! Search parameters and wordlist loading.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::ConfigError;

/// Seed for the charset shuffle and warm-up sampling, fixed so runs are reproducible.
pub const SCRAMBLE_SEED: u64 = 42;

/// Number of sampled trials timed before the main search.
pub const WARMUP_ATTEMPTS: usize = 1000;

/// A progress line is emitted whenever the attempt counter reaches a multiple of this.
pub const PROGRESS_STRIDE: u64 = 10_000;

pub const DEFAULT_MIN_LEN: usize = 1;
pub const DEFAULT_MAX_LEN: usize = 5;
pub const DEFAULT_CHARS: &str = "abc123";
pub const DEFAULT_PREFIX_FILE: &str = "prefix.txt";
pub const DEFAULT_SUFFIX_FILE: &str = "suffix.txt";

/// Leaves one logical CPU for the orchestrator and the PDF library's own I/O.
pub fn default_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .saturating_sub(1)
        .max(1)
}

/// Immutable description of the password space and where to put the result.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub min_len: usize,
    pub max_len: usize,
    pub allowed_chars: Vec<char>,
    pub scramble: bool,
    pub scramble_seed: u64,
    pub num_threads: usize,
    /// Never empty; a missing wordlist is a single empty string.
    pub prefixes: Vec<String>,
    pub suffixes: Vec<String>,
    pub warmup_attempts: usize,
    pub progress_stride: u64,
}

impl SearchConfig {
    /// Builds a config with default tuning and no prefixes or suffixes.
    pub fn new(
        input_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
        min_len: usize,
        max_len: usize,
        allowed_chars: &str,
    ) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
            min_len,
            max_len,
            allowed_chars: allowed_chars.chars().collect(),
            scramble: false,
            scramble_seed: SCRAMBLE_SEED,
            num_threads: default_threads(),
            prefixes: vec![String::new()],
            suffixes: vec![String::new()],
            warmup_attempts: WARMUP_ATTEMPTS,
            progress_stride: PROGRESS_STRIDE,
        }
    }

    pub fn with_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = num_threads;
        self
    }

    pub fn with_scramble(mut self, scramble: bool) -> Self {
        self.scramble = scramble;
        self
    }

    pub fn with_affixes(mut self, prefixes: Vec<String>, suffixes: Vec<String>) -> Self {
        self.prefixes = non_empty(prefixes);
        self.suffixes = non_empty(suffixes);
        self
    }

    pub fn with_warmup_attempts(mut self, attempts: usize) -> Self {
        self.warmup_attempts = attempts;
        self
    }

    pub fn with_progress_stride(mut self, stride: u64) -> Self {
        self.progress_stride = stride.max(1);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_len == 0 {
            return Err(ConfigError::ZeroMinLength);
        }
        if self.min_len > self.max_len {
            return Err(ConfigError::LengthRange {
                min: self.min_len,
                max: self.max_len,
            });
        }
        if self.num_threads == 0 {
            return Err(ConfigError::ZeroThreads);
        }
        if self.allowed_chars.is_empty() {
            return Err(ConfigError::EmptyCharset);
        }
        if self.prefixes.is_empty() || self.suffixes.is_empty() {
            return Err(ConfigError::EmptyAffixes);
        }
        Ok(())
    }
}

fn non_empty(words: Vec<String>) -> Vec<String> {
    if words.is_empty() {
        vec![String::new()]
    } else {
        words
    }
}

/// Reads one entry per line. Blank lines and trailing whitespace are kept.
///
/// An unreadable or empty file degrades to a single empty string so the body
/// alone is still attempted.
pub fn load_wordlist(path: &Path) -> Vec<String> {
    match fs::read_to_string(path) {
        Ok(contents) => non_empty(split_lines(&contents)),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Error reading wordlist, using empty entry");
            vec![String::new()]
        }
    }
}

fn split_lines(contents: &str) -> Vec<String> {
    if contents.is_empty() {
        return Vec::new();
    }
    contents
        .strip_suffix('\n')
        .unwrap_or(contents)
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect()
}
