//! Origin type and the tagged note format that carries it
//!
//! Layout: NOTE_TAG (4) || NOTE_VERSION (1) || origin_len (1) || origin

use std::fmt;

use crate::constants::{MAX_ORIGIN_LEN, NOTE_TAG, NOTE_VERSION};
use crate::error::NoteError;

/// Identifier of the requesting site, e.g. a domain name
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Origin(Vec<u8>);

impl Origin {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Origin {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl From<String> for Origin {
    fn from(s: String) -> Self {
        Self(s.into_bytes())
    }
}

impl fmt::Debug for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Origin({:?})", String::from_utf8_lossy(&self.0))
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

const HEADER_LEN: usize = NOTE_TAG.len() + 2;

/// Encode an origin into a delegation note
pub fn encode_origin_note(origin: &Origin) -> Result<Vec<u8>, NoteError> {
    if origin.len() > MAX_ORIGIN_LEN {
        return Err(NoteError::OriginTooLong(origin.len()));
    }

    let mut note = Vec::with_capacity(HEADER_LEN + origin.len());
    note.extend_from_slice(NOTE_TAG);
    note.push(NOTE_VERSION);
    note.push(origin.len() as u8);
    note.extend_from_slice(origin.as_bytes());
    Ok(note)
}

/// Decode a delegation note back into its origin
///
/// Strict: exact tag, known version, declared length within bounds and
/// matching the remaining bytes exactly.
pub fn decode_origin_note(note: &[u8]) -> Result<Origin, NoteError> {
    if note.len() < HEADER_LEN {
        return Err(NoteError::TooShort(note.len()));
    }

    let (tag, rest) = note.split_at(NOTE_TAG.len());
    if tag != NOTE_TAG {
        return Err(NoteError::BadTag);
    }

    let version = rest[0];
    if version != NOTE_VERSION {
        return Err(NoteError::UnsupportedVersion(version));
    }

    let declared = rest[1] as usize;
    if declared > MAX_ORIGIN_LEN {
        return Err(NoteError::OriginTooLong(declared));
    }

    let body = &rest[2..];
    if body.len() != declared {
        return Err(NoteError::LengthMismatch {
            declared,
            actual: body.len(),
        });
    }

    Ok(Origin::new(body))
}
