//! Command-line surface.

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use clap::builder::BoolishValueParser;

use crate::config::{
    DEFAULT_CHARS, DEFAULT_MAX_LEN, DEFAULT_MIN_LEN, DEFAULT_PREFIX_FILE, DEFAULT_SUFFIX_FILE,
    SearchConfig, default_threads, load_wordlist,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
/// Recover the password of your own encrypted PDF by exhaustive search.
pub struct Cli {
    /// Path to the password-protected PDF
    #[arg(long = "input", value_name = "PDF")]
    pub input: PathBuf,

    /// Where to write the decrypted copy
    #[arg(long = "output", value_name = "PDF")]
    pub output: PathBuf,

    /// Minimum body length
    #[arg(long = "min", default_value_t = DEFAULT_MIN_LEN)]
    pub min: usize,

    /// Maximum body length
    #[arg(long = "max", default_value_t = DEFAULT_MAX_LEN)]
    pub max: usize,

    /// Characters used for the body
    #[arg(long = "chars", default_value = DEFAULT_CHARS)]
    pub chars: String,

    /// Number of worker threads (default: logical CPUs minus one)
    #[arg(long = "threads", value_name = "N")]
    pub threads: Option<usize>,

    /// Shuffle the charset with a fixed seed
    #[arg(
        long = "scramble",
        default_value = "true",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub scramble: bool,

    /// File with one prefix per line
    #[arg(long = "prefixfile", default_value = DEFAULT_PREFIX_FILE)]
    pub prefix_file: PathBuf,

    /// File with one suffix per line
    #[arg(long = "suffixfile", default_value = DEFAULT_SUFFIX_FILE)]
    pub suffix_file: PathBuf,

    /// Start the search without asking for confirmation
    #[arg(short = 'y', long = "yes")]
    pub yes: bool,
}

impl Cli {
    /// Loads the wordlists and assembles the search parameters.
    pub fn to_config(&self) -> SearchConfig {
        SearchConfig::new(&self.input, &self.output, self.min, self.max, &self.chars)
            .with_threads(self.threads.unwrap_or_else(default_threads))
            .with_scramble(self.scramble)
            .with_affixes(load_wordlist(&self.prefix_file), load_wordlist(&self.suffix_file))
    }
}
