//! Artifacts: rendered documents and the filenames they are saved under
use serde::{Deserialize, Serialize};
use std::fmt;

/// Used when the facts carry no taxpayer surname.
const UNNAMED: &str = "unnamed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// Federal return, generated on its own
    Primary,
    /// State return, derived from the primary computation
    Secondary,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Primary => f.write_str("primary"),
            ArtifactKind::Secondary => f.write_str("secondary"),
        }
    }
}

/// `<surname>-1040.<ext>`
pub fn primary_filename(surname: Option<&str>, extension: &str) -> String {
    format!("{}-1040.{}", surname.unwrap_or(UNNAMED), extension)
}

/// `<surname>-<jurisdiction>.<ext>`
pub fn secondary_filename(surname: Option<&str>, jurisdiction: &str, extension: &str) -> String {
    format!("{}-{}.{}", surname.unwrap_or(UNNAMED), jurisdiction, extension)
}

/// A rendered document waiting to be handed to the saver
#[derive(Debug, Clone)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn new(kind: ArtifactKind, filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            kind,
            filename: filename.into(),
            bytes,
        }
    }

    pub fn receipt(&self) -> ArtifactReceipt {
        ArtifactReceipt {
            kind: self.kind,
            filename: self.filename.clone(),
            size: self.bytes.len(),
            digest: format!("blake3:{}", blake3::hash(&self.bytes)),
        }
    }
}

/// What is left of an artifact once the saver owns the bytes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactReceipt {
    pub kind: ArtifactKind,
    pub filename: String,
    pub size: usize,
    pub digest: String,
}
