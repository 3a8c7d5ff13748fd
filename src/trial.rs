//! The password trial primitive and its lopdf implementation.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use lopdf::encryption::{self, DecryptionError};
use lopdf::xref::XrefEntry;
use lopdf::{Document, EncryptionState, Error as LopdfError, Object, ObjectStream, Reader};
use tracing::debug;

use crate::error::TrialError;

/// Opens an encrypted PDF with a candidate password.
///
/// Implementations must report a rejected password as
/// [`TrialError::WrongPassword`] so it can be told apart from other failures.
pub trait PdfOpener: Send + Sync {
    /// The document after a successful open.
    type Unlocked;

    fn open(&self, password: &str) -> Result<Self::Unlocked, TrialError>;

    /// Removes the security handler and writes a plain copy to `output`.
    fn strip_security_and_save(&self, doc: Self::Unlocked, output: &Path) -> Result<(), TrialError>;

    /// `false` when the input is readable without any password.
    fn requires_password(&self) -> bool {
        true
    }
}

/// The raw file plus lopdf's parse of it.
///
/// For an encrypted file whose user password is not empty, lopdf only parses
/// the trailer and the `/Encrypt` dictionary, so the bytes are kept to rebuild
/// the object graph once a candidate authenticates.
struct Source {
    bytes: Vec<u8>,
    template: Document,
}

impl Source {
    fn read(path: &Path) -> Result<Self, String> {
        let describe = |e: &dyn std::fmt::Display| format!("{}: {}", path.display(), e);
        let bytes = fs::read(path).map_err(|e| describe(&e))?;
        let template = Document::load_mem(&bytes).map_err(|e| describe(&e))?;
        Ok(Self { bytes, template })
    }

    /// Offsets in the cross-reference table count from the `%PDF-` header.
    fn body(&self) -> &[u8] {
        let start = self
            .bytes
            .windows(5)
            .position(|w| w == b"%PDF-")
            .unwrap_or(0);
        &self.bytes[start..]
    }

    /// Parses every object from the raw file and decrypts it with `password`.
    fn decrypt(&self, password: &str) -> Result<Document, TrialError> {
        let template = &self.template;
        let state = EncryptionState::decode(template, password)?;
        // Below revision 5 the file key derives from the user password only.
        if state.revision() < 5 && template.authenticate_user_password(password).is_err() {
            return Err(TrialError::OwnerPasswordOnly);
        }
        let encrypt_id = template
            .trailer
            .get(b"Encrypt")
            .and_then(Object::as_reference)?;

        let reader = Reader {
            buffer: self.body(),
            document: template.clone(),
            encryption_state: None,
            raw_objects: BTreeMap::new(),
        };

        let mut doc = template.clone();
        for (&number, entry) in &template.reference_table.entries {
            let XrefEntry::Normal { generation, .. } = entry else {
                continue;
            };
            let id = (number, *generation);
            if id == encrypt_id {
                continue;
            }
            let mut object = match reader.get_object(id, &mut HashSet::new()) {
                Ok(object) => object,
                Err(e) => {
                    debug!(object = ?id, error = %e, "skipping unreadable object");
                    continue;
                }
            };
            encryption::decrypt_object(&state, id, &mut object).map_err(LopdfError::from)?;
            doc.objects.insert(id, object);
        }

        let mut packed = Vec::new();
        for object in doc.objects.values_mut() {
            let Ok(stream) = object.as_stream_mut() else {
                continue;
            };
            if !stream.dict.has_type(b"ObjStm") {
                continue;
            }
            if let Ok(object_stream) = ObjectStream::new(stream) {
                packed.extend(object_stream.objects);
            }
        }
        for (id, object) in packed {
            doc.objects.entry(id).or_insert(object);
        }

        doc.encryption_state = Some(state);
        Ok(doc)
    }
}

/// Parses the input once and authenticates each candidate against that parse.
///
/// Only the accepted password pays for decrypting the object graph.
pub struct LopdfOpener {
    source: Result<Source, String>,
}

impl LopdfOpener {
    /// A load failure is kept and reported by every subsequent trial.
    pub fn load(path: &Path) -> Self {
        Self {
            source: Source::read(path),
        }
    }

    fn source(&self) -> Result<&Source, TrialError> {
        self.source
            .as_ref()
            .map_err(|e| TrialError::Unavailable(e.clone()))
    }
}

impl PdfOpener for LopdfOpener {
    type Unlocked = Document;

    fn open(&self, password: &str) -> Result<Document, TrialError> {
        let source = self.source()?;
        let template = &source.template;
        if !template.is_encrypted() {
            return Ok(template.clone());
        }

        match template.authenticate_password(password) {
            Ok(()) => {}
            Err(LopdfError::Decryption(DecryptionError::IncorrectPassword)) => {
                return Err(TrialError::WrongPassword);
            }
            Err(e) => return Err(e.into()),
        }

        // An empty user password lets lopdf decrypt everything at load time.
        if template.encryption_state.is_some() {
            return Ok(template.clone());
        }
        source.decrypt(password)
    }

    fn strip_security_and_save(&self, mut doc: Document, output: &Path) -> Result<(), TrialError> {
        if let Some(Object::Reference(id)) = doc.trailer.remove(b"Encrypt") {
            doc.objects.remove(&id);
        }
        doc.encryption_state = None;
        doc.save(output)?;
        Ok(())
    }

    fn requires_password(&self) -> bool {
        match &self.source {
            Ok(source) => source.template.is_encrypted(),
            Err(_) => true,
        }
    }
}
