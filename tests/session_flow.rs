mod common;

use common::{FakePdf, Recorder, assert_unlocked_copy, write_encrypted_pdf, write_plain_pdf};
use pdf_recover::config::load_wordlist;
use pdf_recover::{LopdfOpener, Outcome, Phase, SearchConfig, Session};
use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::Ordering;
use tempfile::TempDir;

fn run<O: pdf_recover::PdfOpener>(
    config: &SearchConfig,
    opener: &O,
    answer: &str,
    yes: bool,
) -> (Outcome, String) {
    let reporter = Recorder::default();
    let mut session = Session::new(config, opener).assume_yes(yes);
    let mut out = Vec::new();
    let outcome = session
        .run(&reporter, &mut Cursor::new(answer.to_string()), &mut out)
        .unwrap();
    assert_eq!(session.phase(), Phase::Terminated);
    (outcome, String::from_utf8(out).unwrap())
}

#[test]
fn test_found_in_main_phase() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.pdf");
    let config = SearchConfig::new("in.pdf", &output, 1, 3, "abc123")
        .with_threads(2)
        .with_warmup_attempts(0);
    let pdf = FakePdf::new(&["b2a"]);

    let (outcome, text) = run(&config, &pdf, "y\n", false);

    match outcome {
        Outcome::Found(winner) => assert_eq!(winner.password, "b2a"),
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert!(text.contains("Total combinations: 258"));
    assert!(text.contains("[y/N]"));
    assert!(text.contains("Decrypted copy written to"));
    assert!(output.exists());
}

#[test]
fn test_found_during_warmup_skips_main_phase() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.pdf");
    let config = SearchConfig::new("in.pdf", &output, 1, 1, "a")
        .with_threads(1)
        .with_warmup_attempts(10);
    let pdf = FakePdf::new(&["a"]);

    let (outcome, text) = run(&config, &pdf, "", false);

    match outcome {
        Outcome::Found(winner) => {
            assert_eq!(winner.password, "a");
            assert_eq!(winner.attempts, 1);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert!(text.contains("Password found during warm-up."));
    assert!(!text.contains("[y/N]"));
    assert_eq!(pdf.opens.load(Ordering::SeqCst), 1);
    assert!(output.exists());
}

#[test]
fn test_exhausted_reports_not_found() {
    let config = SearchConfig::new("in.pdf", "out.pdf", 1, 2, "xy")
        .with_threads(2)
        .with_warmup_attempts(5);
    let pdf = FakePdf::new(&["nope"]);

    let (outcome, text) = run(&config, &pdf, "", true);

    assert!(matches!(outcome, Outcome::Exhausted { attempts: 6, .. }));
    assert!(text.contains("Warm-up: 5 attempts"));
    assert!(text.contains("Password not found."));
    // 5 warm-up trials plus the 6 counted ones
    assert_eq!(pdf.opens.load(Ordering::SeqCst), 11);
}

#[test]
fn test_cancel_skips_main_phase() {
    let config = SearchConfig::new("in.pdf", "out.pdf", 1, 4, "abc")
        .with_threads(2)
        .with_warmup_attempts(8);
    let pdf = FakePdf::new(&["zzzz"]);

    let (outcome, text) = run(&config, &pdf, "n\n", false);

    assert_eq!(outcome, Outcome::Cancelled);
    assert!(text.contains("Cancelled."));
    assert_eq!(pdf.opens.load(Ordering::SeqCst), 8);
    assert_eq!(pdf.saves.load(Ordering::SeqCst), 0);
}

#[test]
fn test_missing_prefix_file_still_finds_body() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.pdf");
    let prefixes = load_wordlist(Path::new("/nonexistent/prefix.txt"));
    let config = SearchConfig::new("in.pdf", &output, 2, 2, "ab")
        .with_threads(2)
        .with_warmup_attempts(0)
        .with_affixes(prefixes, vec![String::new()]);
    let pdf = FakePdf::new(&["ba"]);

    let (outcome, _) = run(&config, &pdf, "", true);

    assert!(matches!(outcome, Outcome::Found(ref w) if w.password == "ba"));
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = SearchConfig::new("in.pdf", "out.pdf", 3, 2, "ab").with_threads(1);
    let pdf = FakePdf::locked_out();
    let reporter = Recorder::default();
    let mut session = Session::new(&config, &pdf);

    let result = session.run(&reporter, &mut Cursor::new(""), &mut Vec::<u8>::new());
    assert!(matches!(result, Err(pdf_recover::RecoverError::Config(_))));
    assert_eq!(pdf.opens.load(Ordering::SeqCst), 0);
}

#[test]
fn test_unreadable_input_is_not_fatal() {
    let dir = TempDir::new().unwrap();
    let config = SearchConfig::new(dir.path().join("missing.pdf"), dir.path().join("out.pdf"), 1, 1, "a")
        .with_threads(1)
        .with_warmup_attempts(3);
    let opener = LopdfOpener::load(&config.input_path);

    let (outcome, text) = run(&config, &opener, "", true);

    assert!(matches!(outcome, Outcome::Exhausted { attempts: 1, .. }));
    assert!(text.contains("Warning: 3 warm-up trials failed"));
}

#[test]
fn test_plain_pdf_is_not_searched() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("plain.pdf");
    write_plain_pdf(&input);

    let config = SearchConfig::new(&input, dir.path().join("out.pdf"), 1, 2, "ab").with_threads(1);
    let opener = LopdfOpener::load(&input);

    let (outcome, text) = run(&config, &opener, "", true);

    assert_eq!(outcome, Outcome::NotEncrypted);
    assert!(text.contains("Not Encrypted"));
}

#[test]
fn test_encrypted_pdf_is_recovered_and_unlocked() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("locked.pdf");
    let output = dir.path().join("unlocked.pdf");
    write_encrypted_pdf(&input, "ba", "ba");

    let config = SearchConfig::new(&input, &output, 1, 2, "ab")
        .with_threads(2)
        .with_warmup_attempts(0);
    let opener = LopdfOpener::load(&input);

    let (outcome, text) = run(&config, &opener, "", true);

    match outcome {
        Outcome::Found(winner) => {
            assert_eq!(winner.password, "ba");
            assert!(winner.save_error.is_none());
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert!(!text.contains("[y/N]"));
    assert!(text.contains("Decrypted copy written to"));
    assert_unlocked_copy(&output);
}
