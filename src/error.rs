//! Error types shared across the search engine.

use thiserror::Error;

/// Invalid search parameters, surfaced to the user as usage errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("--min must be at least 1")]
    ZeroMinLength,

    #[error("--min ({min}) must be less than or equal to --max ({max})")]
    LengthRange { min: usize, max: usize },

    #[error("--threads must be at least 1")]
    ZeroThreads,

    #[error("--chars must contain at least one character")]
    EmptyCharset,

    #[error("prefix and suffix lists need at least one entry")]
    EmptyAffixes,
}

/// Outcome of a single failed trial against the PDF.
#[derive(Error, Debug)]
pub enum TrialError {
    #[error("incorrect password")]
    WrongPassword,

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("owner password accepted, but this security handler needs the user password to decrypt")]
    OwnerPasswordOnly,

    #[error("document unavailable: {0}")]
    Unavailable(String),
}

impl TrialError {
    pub fn is_wrong_password(&self) -> bool {
        matches!(self, TrialError::WrongPassword)
    }
}

/// Top-level failure of a recovery session.
#[derive(Error, Debug)]
pub enum RecoverError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to initialize thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RecoverError>;
