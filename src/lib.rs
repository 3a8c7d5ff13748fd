//! pdf-recover - exhaustive password recovery for your own encrypted PDFs
//!
//! The candidate space is every `prefix + body + suffix` where the body is a
//! string over an optionally shuffled charset with a bounded length. The
//! space is split into shards keyed by prefix, suffix, body length and first
//! body character, and a fixed rayon pool works through them until one
//! candidate opens the document.

pub mod charset;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod report;
pub mod session;
pub mod shard;
pub mod space;
pub mod trial;
pub mod warmup;

pub use config::SearchConfig;
pub use engine::{EngineState, SearchOutcome, TrialCoordinator, Verdict, Winner, run_search};
pub use error::{ConfigError, RecoverError, TrialError};
pub use report::{ConsoleReporter, Reporter};
pub use session::{Outcome, Phase, Session};
pub use trial::{LopdfOpener, PdfOpener};
