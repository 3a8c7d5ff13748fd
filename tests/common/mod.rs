#![allow(dead_code)]

use lopdf::{Document, EncryptionState, EncryptionVersion, Object, Permissions, Stream, StringFormat, dictionary};
use pdf_recover::{PdfOpener, Reporter, TrialError};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// In-memory document that accepts a fixed set of passwords.
pub struct FakePdf {
    accepted: HashSet<String>,
    delay: Option<Duration>,
    pub opens: AtomicU64,
    pub tried: Mutex<Vec<String>>,
    pub saves: AtomicU64,
}

impl FakePdf {
    pub fn new(passwords: &[&str]) -> Self {
        Self {
            accepted: passwords.iter().map(|p| p.to_string()).collect(),
            delay: None,
            opens: AtomicU64::new(0),
            tried: Mutex::new(Vec::new()),
            saves: AtomicU64::new(0),
        }
    }

    pub fn locked_out() -> Self {
        Self::new(&[])
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn tried(&self) -> Vec<String> {
        self.tried.lock().unwrap().clone()
    }
}

impl PdfOpener for FakePdf {
    type Unlocked = String;

    fn open(&self, password: &str) -> Result<String, TrialError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        self.tried.lock().unwrap().push(password.to_string());
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        if self.accepted.contains(password) {
            Ok(password.to_string())
        } else {
            Err(TrialError::WrongPassword)
        }
    }

    fn strip_security_and_save(&self, doc: String, output: &Path) -> Result<(), TrialError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        fs::write(output, format!("%PDF-1.5 unlocked with {}", doc))?;
        Ok(())
    }
}

/// Captures every reporter event.
#[derive(Default)]
pub struct Recorder {
    pub progress: Mutex<Vec<(u64, String)>>,
    pub found: Mutex<Vec<(String, u64)>>,
}

impl Reporter for Recorder {
    fn progress(&self, attempts: u64, _elapsed: Duration, sample: &str) {
        self.progress
            .lock()
            .unwrap()
            .push((attempts, sample.to_string()));
    }

    fn found(&self, password: &str, attempts: u64, _elapsed: Duration) {
        self.found
            .lock()
            .unwrap()
            .push((password.to_string(), attempts));
    }
}

/// Every `prefix + body + suffix` with body lengths in `min..=max`, built independently of the engine.
pub fn cartesian(prefixes: &[&str], suffixes: &[&str], chars: &str, min: usize, max: usize) -> Vec<String> {
    let chars: Vec<char> = chars.chars().collect();
    let mut bodies = Vec::new();
    for len in min..=max {
        let mut level = vec![String::new()];
        for _ in 0..len {
            level = level
                .iter()
                .flat_map(|s| chars.iter().map(move |c| format!("{}{}", s, c)))
                .collect();
        }
        bodies.extend(level);
    }

    let mut all = Vec::new();
    for p in prefixes {
        for s in suffixes {
            for b in &bodies {
                all.push(format!("{}{}{}", p, b, s));
            }
        }
    }
    all
}

/// Text drawn on the single page of [`one_page_pdf`].
pub const PAGE_TEXT: &str = "Quarterly figures";

/// A one-page document with a text content stream and a file identifier.
pub fn one_page_pdf() -> Document {
    let mut doc = Document::with_version("1.5");
    doc.trailer.set(
        "ID",
        Object::Array(vec![
            Object::String(b"pdf-recover-id-0".to_vec(), StringFormat::Literal),
            Object::String(b"pdf-recover-id-1".to_vec(), StringFormat::Literal),
        ]),
    );

    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let content = format!("BT\n/F1 12 Tf\n100 700 Td\n({}) Tj\nET\n", PAGE_TEXT);
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
        "Contents" => content_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

pub fn write_plain_pdf(path: &Path) {
    one_page_pdf().save(path).unwrap();
}

/// Saves [`one_page_pdf`] under 128-bit RC4 (security handler V2).
pub fn write_encrypted_pdf(path: &Path, user_password: &str, owner_password: &str) {
    let mut doc = one_page_pdf();
    let version = EncryptionVersion::V2 {
        document: &doc,
        owner_password,
        user_password,
        key_length: 128,
        permissions: Permissions::all(),
    };
    let state = EncryptionState::try_from(version).unwrap();
    doc.encrypt(&state).unwrap();
    doc.save(path).unwrap();
}

/// Asserts that `path` is an unencrypted copy of [`one_page_pdf`].
pub fn assert_unlocked_copy(path: &Path) {
    let doc = Document::load(path).unwrap();
    assert!(!doc.is_encrypted());
    let pages = doc.get_pages();
    assert_eq!(pages.len(), 1);
    let text = doc.extract_text(&[1]).unwrap();
    assert!(text.contains(PAGE_TEXT), "page text was {:?}", text);
}
