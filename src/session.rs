//! End-to-end recovery session: warm-up, confirmation, search, final status.

use std::io::{BufRead, Write};
use std::time::Duration;

use tracing::{debug, warn};

use crate::charset::effective_charset;
use crate::config::SearchConfig;
use crate::engine::{SearchOutcome, TrialCoordinator, Winner, run_search};
use crate::error::Result;
use crate::report::{Reporter, format_eta};
use crate::shard::shard_count;
use crate::space::SearchSpace;
use crate::trial::PdfOpener;
use crate::warmup::{Warmup, run_warmup};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Configured,
    Warming,
    AwaitingConfirm,
    Running,
    Terminated,
}

/// Terminal status of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The input opens without a password; nothing to search.
    NotEncrypted,
    Found(Winner),
    Exhausted { attempts: u64, elapsed: Duration },
    Cancelled,
}

pub struct Session<'a, O: PdfOpener> {
    config: &'a SearchConfig,
    opener: &'a O,
    charset: Vec<char>,
    space: SearchSpace,
    assume_yes: bool,
    phase: Phase,
}

impl<'a, O: PdfOpener> Session<'a, O> {
    pub fn new(config: &'a SearchConfig, opener: &'a O) -> Self {
        let charset = effective_charset(&config.allowed_chars, config.scramble, config.scramble_seed);
        let space = SearchSpace::compute(
            config.prefixes.len(),
            config.suffixes.len(),
            charset.len(),
            config.min_len,
            config.max_len,
        );
        Self {
            config,
            opener,
            charset,
            space,
            assume_yes: false,
            phase: Phase::Configured,
        }
    }

    /// Skip the confirmation prompt.
    pub fn assume_yes(mut self, yes: bool) -> Self {
        self.assume_yes = yes;
        self
    }

    pub fn space(&self) -> SearchSpace {
        self.space
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn enter(&mut self, phase: Phase) {
        debug!(from = ?self.phase, to = ?phase, "session phase change");
        self.phase = phase;
    }

    /// Drives the session to a terminal state.
    ///
    /// `input` answers the confirmation prompt; `out` receives the banner,
    /// estimates and final status.
    pub fn run<R, I, W>(&mut self, reporter: &R, input: &mut I, out: &mut W) -> Result<Outcome>
    where
        R: Reporter,
        I: BufRead,
        W: Write,
    {
        self.config.validate()?;
        let outcome = self.drive(reporter, input, out);
        self.enter(Phase::Terminated);
        outcome
    }

    fn drive<R, I, W>(&mut self, reporter: &R, input: &mut I, out: &mut W) -> Result<Outcome>
    where
        R: Reporter,
        I: BufRead,
        W: Write,
    {
        let config = self.config;
        self.print_banner(out)?;

        if !self.opener.requires_password() {
            writeln!(out, "Not Encrypted")?;
            return Ok(Outcome::NotEncrypted);
        }

        self.enter(Phase::Warming);
        let warm = TrialCoordinator::new(
            self.opener,
            reporter,
            &config.output_path,
            config.progress_stride,
        );
        let estimate = match run_warmup(config, &self.charset, &warm) {
            Warmup::Found { password, attempts } => {
                writeln!(out, "Password found during warm-up.")?;
                let winner = warm.state().winner().cloned().unwrap_or_else(|| Winner {
                    password,
                    attempts: attempts as u64,
                    elapsed: warm.state().elapsed(),
                    save_error: None,
                });
                self.print_found(out, &winner)?;
                return Ok(Outcome::Found(winner));
            }
            Warmup::Estimated(estimate) => estimate,
        };

        writeln!(
            out,
            "Warm-up: {} attempts in {:.2} seconds, average {:.3} ms/attempt",
            estimate.attempts,
            estimate.elapsed.as_secs_f64(),
            estimate.avg_seconds_per_attempt() * 1000.0
        )?;
        if estimate.errors > 0 {
            writeln!(
                out,
                "Warning: {} warm-up trials failed for reasons other than a wrong password",
                estimate.errors
            )?;
        }
        let total = self.space.total;
        writeln!(
            out,
            "Estimated time: worst case {}, average {}",
            format_eta(estimate.worst_case_seconds(total)),
            format_eta(estimate.average_case_seconds(total))
        )?;

        self.enter(Phase::AwaitingConfirm);
        if !self.assume_yes && !confirm(input, out)? {
            writeln!(out, "Cancelled.")?;
            return Ok(Outcome::Cancelled);
        }

        self.enter(Phase::Running);
        let coordinator = TrialCoordinator::new(
            self.opener,
            reporter,
            &config.output_path,
            config.progress_stride,
        );
        match run_search(config, &self.charset, &coordinator)? {
            SearchOutcome::Found(winner) => {
                self.print_found(out, &winner)?;
                Ok(Outcome::Found(winner))
            }
            SearchOutcome::Exhausted { attempts, elapsed } => {
                writeln!(out, "Password not found.")?;
                writeln!(
                    out,
                    "Total attempts: {}, Elapsed time: {:.2} seconds",
                    attempts,
                    elapsed.as_secs_f64()
                )?;
                Ok(Outcome::Exhausted { attempts, elapsed })
            }
        }
    }

    fn print_banner<W: Write>(&self, out: &mut W) -> Result<()> {
        let config = self.config;
        writeln!(out, "PDF: {}", config.input_path.display())?;
        writeln!(out, "Output: {}", config.output_path.display())?;
        writeln!(out, "Min length: {}", config.min_len)?;
        writeln!(out, "Max length: {}", config.max_len)?;
        writeln!(
            out,
            "Charset: {} ({} characters, scramble {})",
            self.charset.iter().collect::<String>(),
            self.charset.len(),
            if config.scramble { "on" } else { "off" }
        )?;
        writeln!(out, "Prefixes: {}", config.prefixes.len())?;
        writeln!(out, "Suffixes: {}", config.suffixes.len())?;
        writeln!(out, "Threads: {}", config.num_threads)?;
        writeln!(out, "Shards: {}", shard_count(config, &self.charset))?;
        if self.space.overflowed {
            warn!("Search space exceeds 64 bits, time estimates are meaningless");
            writeln!(out, "Total combinations: more than {}", u64::MAX)?;
        } else {
            writeln!(out, "Total combinations: {}", self.space.total)?;
        }
        Ok(())
    }

    fn print_found<W: Write>(&self, out: &mut W, winner: &Winner) -> Result<()> {
        match &winner.save_error {
            None => writeln!(
                out,
                "Decrypted copy written to {}",
                self.config.output_path.display()
            )?,
            Some(e) => writeln!(
                out,
                "Password is {:?} but the decrypted copy could not be written: {}",
                winner.password, e
            )?,
        }
        Ok(())
    }
}

/// Asks on `out` and reads one line from `input`. Anything but yes declines.
fn confirm<I: BufRead, W: Write>(input: &mut I, out: &mut W) -> Result<bool> {
    write!(out, "Proceed with the attack? [y/N]: ")?;
    out.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    let answer = answer.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}
