use std::fs;
use std::path::Path;

use serde::Deserialize;
use sha2::{Digest, Sha256};

use super::{ArtifactError, ArtifactKind};

/// Expected SHA-256 digests of the artifact files, keyed by artifact.
///
/// ```json
/// {"model": "37f1…", "tokenizer": "da0e…", "encoder": "9b1c…"}
/// ```
///
/// Every key is optional; a missing key skips verification of that file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ArtifactManifest {
    pub model: Option<String>,
    pub tokenizer: Option<String>,
    pub encoder: Option<String>,
}

impl ArtifactManifest {
    pub fn from_file(path: &Path) -> Result<Self, ArtifactError> {
        let json = fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|e| ArtifactError::Malformed {
            kind: ArtifactKind::Manifest,
            reason: e.to_string(),
        })
    }

    pub fn expected(&self, kind: ArtifactKind) -> Option<&str> {
        match kind {
            ArtifactKind::Model => self.model.as_deref(),
            ArtifactKind::Tokenizer => self.tokenizer.as_deref(),
            ArtifactKind::Encoder => self.encoder.as_deref(),
            ArtifactKind::Manifest => None,
        }
    }
}

/// Lower-case hex SHA-256 of a file's contents
pub fn file_sha256(path: &Path) -> Result<String, ArtifactError> {
    let bytes = fs::read(path)?;
    log::debug!("Hashing {} bytes from {:?}", bytes.len(), path);
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

/// Checks `path` against the digest recorded for `kind`
pub(crate) fn verify_file(path: &Path, kind: ArtifactKind, expected_hash: &str) -> Result<(), ArtifactError> {
    let actual = file_sha256(path)?;
    log::info!("Verifying {} file {:?}", kind, path);
    log::debug!("  Calculated hash: {}", actual);
    log::debug!("  Expected hash:   {}", expected_hash);

    if !actual.eq_ignore_ascii_case(expected_hash.trim()) {
        log::error!("{} hash mismatch: expected {}, got {}", kind, expected_hash, actual);
        return Err(ArtifactError::HashMismatch {
            kind,
            expected: expected_hash.to_string(),
            actual,
        });
    }
    Ok(())
}
