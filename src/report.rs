//! Progress and success reporting.

use std::time::Duration;

use indicatif::{HumanDuration, ProgressBar, ProgressStyle};

/// Sink for engine events. Calls arrive concurrently from every worker.
pub trait Reporter: Send + Sync {
    /// Called once per counted attempt.
    fn attempt(&self) {}

    /// Periodic status with the candidate that reached the stride.
    fn progress(&self, attempts: u64, elapsed: Duration, sample: &str);

    /// The single winning trial.
    fn found(&self, password: &str, attempts: u64, elapsed: Duration);
}

/// Draws an indicatif bar and prints status lines to stdout around it.
pub struct ConsoleReporter {
    bar: ProgressBar,
}

impl ConsoleReporter {
    pub fn new(total: u64) -> Self {
        let bar = ProgressBar::new(total);
        // The template is a literal; a parse failure only loses the styling.
        if let Ok(style) = ProgressStyle::with_template(
            "{spinner:.green} {percent:>3}% [{wide_bar:.cyan/blue}] ({eta} remaining)",
        ) {
            bar.set_style(style);
        }
        Self { bar }
    }

    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Reporter for ConsoleReporter {
    fn attempt(&self) {
        self.bar.inc(1);
    }

    fn progress(&self, attempts: u64, elapsed: Duration, sample: &str) {
        self.bar.suspend(|| {
            println!(
                "Attempts: {}, Elapsed time: {:.2} seconds, Attempt: {}",
                attempts,
                elapsed.as_secs_f64(),
                sample
            );
        });
    }

    fn found(&self, password: &str, attempts: u64, elapsed: Duration) {
        self.bar.finish_and_clear();
        println!("PDF decrypted successfully!");
        println!("Password: {}", password);
        println!("Time taken: {:.2} seconds", elapsed.as_secs_f64());
        println!("Total attempts: {}", attempts);
    }
}

/// Renders an estimate in seconds, or a marker when it does not fit a `Duration`.
pub fn format_eta(seconds: f64) -> String {
    match Duration::try_from_secs_f64(seconds) {
        Ok(duration) => HumanDuration(duration).to_string(),
        Err(_) => "beyond measure".to_string(),
    }
}
