use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::{ArtifactError, ArtifactKind};

#[derive(Deserialize)]
#[serde(untagged)]
enum EncoderFile {
    Classes { classes: Vec<String> },
    Bare(Vec<String>),
}

/// Bidirectional mapping between category names and classifier output indices.
///
/// The on-disk form is the encoder's ordered class list, either as a bare JSON
/// array or as `{"classes": [...]}`. Index `i` of that list is output position
/// `i` of the classifier, so the order is part of the artifact contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Creates an encoder from an ordered list of class names.
    ///
    /// # Errors
    /// `Malformed` if the list is empty, holds an empty name, or repeats a name.
    pub fn new(classes: Vec<impl Into<String>>) -> Result<Self, ArtifactError> {
        let classes: Vec<String> = classes.into_iter().map(Into::into).collect();
        let malformed = |reason: String| ArtifactError::Malformed {
            kind: ArtifactKind::Encoder,
            reason,
        };

        if classes.is_empty() {
            return Err(malformed("Label encoder must define at least one class".into()));
        }
        if let Some(pos) = classes.iter().position(|c| c.is_empty()) {
            return Err(malformed(format!("Class {} has an empty name", pos)));
        }
        let duplicate = {
            let mut seen = HashSet::new();
            classes.iter().find(|c| !seen.insert(c.as_str())).cloned()
        };
        if let Some(dup) = duplicate {
            return Err(malformed(format!("Class '{}' appears more than once", dup)));
        }

        Ok(Self { classes })
    }

    pub fn from_json(json: &str) -> Result<Self, ArtifactError> {
        let file: EncoderFile = serde_json::from_str(json).map_err(|e| ArtifactError::Malformed {
            kind: ArtifactKind::Encoder,
            reason: e.to_string(),
        })?;
        match file {
            EncoderFile::Classes { classes } | EncoderFile::Bare(classes) => Self::new(classes),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ArtifactError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Decodes a classifier output index to its category name
    pub fn inverse_transform(&self, index: usize) -> Option<&str> {
        self.classes.get(index).map(String::as_str)
    }

    /// Encodes a category name to its classifier output index
    pub fn transform(&self, label: &str) -> Option<usize> {
        self.classes.iter().position(|c| c == label)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
