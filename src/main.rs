//! Command-line entry point for the PDF password recovery utility.

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use pdf_recover::cli::Cli;
use pdf_recover::{ConsoleReporter, LopdfOpener, Session};

use std::io;
use std::process::exit;

/// Entrypoint that validates flags, runs the session, and maps the outcome to an exit status.
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Cli::parse();
    let config = args.to_config();

    if let Err(e) = config.validate() {
        Cli::command().error(ErrorKind::ValueValidation, e).exit();
    }

    let opener = LopdfOpener::load(&config.input_path);
    let mut session = Session::new(&config, &opener).assume_yes(args.yes);
    let reporter = ConsoleReporter::new(session.space().total);

    // Workers print progress through `println!`, so stdout must not stay locked here.
    let result = session.run(&reporter, &mut io::stdin().lock(), &mut io::stdout());
    reporter.finish();

    // Found, exhausted, cancelled and unencrypted all exit cleanly.
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        exit(1);
    }
}
