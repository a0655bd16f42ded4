//! Load-once storage for the three pre-built artifacts: the trained
//! classifier, the word-level tokenizer and the label encoder.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};
use tokenizers::models::ModelWrapper;
use tokenizers::Tokenizer;

use crate::classifier::{OnnxClassifier, SequenceClassifier};
use crate::config::AuditorConfig;
use crate::runtime::RuntimeConfig;

mod label_encoder;
mod manifest;

pub use label_encoder::LabelEncoder;
pub use manifest::{file_sha256, ArtifactManifest};

/// Identifies one of the files the artifact store manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Model,
    Tokenizer,
    Encoder,
    Manifest,
}

impl ArtifactKind {
    pub fn default_file_name(self) -> &'static str {
        match self {
            Self::Model => "model_bullying.onnx",
            Self::Tokenizer => "tokenizer.json",
            Self::Encoder => "encoder.json",
            Self::Manifest => "manifest.json",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Model => write!(f, "model"),
            Self::Tokenizer => write!(f, "tokenizer"),
            Self::Encoder => write!(f, "label encoder"),
            Self::Manifest => write!(f, "manifest"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("{kind} artifact not found at {path:?}")]
    NotFound { kind: ArtifactKind, path: PathBuf },
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Hash mismatch: expected {expected}, got {actual} for {kind} file")]
    HashMismatch {
        kind: ArtifactKind,
        expected: String,
        actual: String,
    },
    #[error("Malformed {kind} artifact: {reason}")]
    Malformed { kind: ArtifactKind, reason: String },
    #[error("ONNX Runtime error: {0}")]
    Runtime(String),
}

impl From<ort::Error> for ArtifactError {
    fn from(err: ort::Error) -> Self {
        ArtifactError::Runtime(err.to_string())
    }
}

/// Resolved locations of the three artifact files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub tokenizer: PathBuf,
    pub encoder: PathBuf,
}

impl ArtifactPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            model: dir.join(ArtifactKind::Model.default_file_name()),
            tokenizer: dir.join(ArtifactKind::Tokenizer.default_file_name()),
            encoder: dir.join(ArtifactKind::Encoder.default_file_name()),
        }
    }

    pub fn get(&self, kind: ArtifactKind) -> Option<&Path> {
        match kind {
            ArtifactKind::Model => Some(&self.model),
            ArtifactKind::Tokenizer => Some(&self.tokenizer),
            ArtifactKind::Encoder => Some(&self.encoder),
            ArtifactKind::Manifest => None,
        }
    }
}

/// The loaded, immutable artifact context handed to the inference pipeline.
///
/// # Thread Safety
///
/// `Artifacts` is `Send + Sync`: the tokenizer and label encoder are plain
/// data and every `SequenceClassifier` is required to be `Send + Sync`.
/// Nothing is mutated after loading, so it can be shared through `Arc`
/// without locking.
#[derive(Debug)]
pub struct Artifacts {
    tokenizer: Tokenizer,
    classifier: Box<dyn SequenceClassifier>,
    encoder: LabelEncoder,
    paths: Option<ArtifactPaths>,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<Artifacts>();
    }
};

impl Artifacts {
    /// Assembles a context from already-loaded parts.
    pub fn new(
        tokenizer: Tokenizer,
        classifier: impl SequenceClassifier + 'static,
        encoder: LabelEncoder,
    ) -> Self {
        Self {
            tokenizer,
            classifier: Box::new(classifier),
            encoder,
            paths: None,
        }
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    pub fn classifier(&self) -> &dyn SequenceClassifier {
        self.classifier.as_ref()
    }

    pub fn encoder(&self) -> &LabelEncoder {
        &self.encoder
    }

    /// Where the artifacts were loaded from, if they came from an `ArtifactStore`
    pub fn paths(&self) -> Option<&ArtifactPaths> {
        self.paths.as_ref()
    }
}

/// Loads a word-level tokenizer from a Hugging Face `tokenizer.json`.
pub fn load_tokenizer(path: &Path) -> Result<Tokenizer, ArtifactError> {
    let tokenizer = Tokenizer::from_file(path).map_err(|e| {
        error!("Failed to load tokenizer: {}", e);
        ArtifactError::Malformed {
            kind: ArtifactKind::Tokenizer,
            reason: e.to_string(),
        }
    })?;

    let malformed = |reason: String| ArtifactError::Malformed {
        kind: ArtifactKind::Tokenizer,
        reason,
    };

    if tokenizer.get_vocab_size(false) == 0 {
        return Err(malformed("Tokenizer vocabulary is empty".into()));
    }

    // unknown words must map to a reserved id
    let unk_token = match tokenizer.get_model() {
        ModelWrapper::WordLevel(model) => &model.unk_token,
        _ => return Err(malformed("Tokenizer model must be WordLevel".into())),
    };
    let unk_id = tokenizer.token_to_id(unk_token).ok_or_else(|| {
        malformed(format!("Unknown-word token {:?} is missing from the vocabulary", unk_token))
    })?;
    debug!("Unknown words map to {:?} (id {})", unk_token, unk_id);

    Ok(tokenizer)
}

/// Locates, verifies and loads the artifacts from one directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    artifacts_dir: PathBuf,
    paths: ArtifactPaths,
    verify_manifest: bool,
    runtime_config: RuntimeConfig,
}

impl ArtifactStore {
    /// Creates a store over `artifacts_dir` using the default file names
    pub fn new<P: AsRef<Path>>(artifacts_dir: P) -> Self {
        let artifacts_dir = artifacts_dir.as_ref().to_path_buf();
        Self {
            paths: ArtifactPaths::in_dir(&artifacts_dir),
            artifacts_dir,
            verify_manifest: true,
            runtime_config: RuntimeConfig::default(),
        }
    }

    pub fn from_config(config: &AuditorConfig) -> Self {
        let dir = &config.artifacts_dir;
        Self {
            artifacts_dir: dir.clone(),
            paths: ArtifactPaths {
                model: dir.join(&config.model_file),
                tokenizer: dir.join(&config.tokenizer_file),
                encoder: dir.join(&config.encoder_file),
            },
            verify_manifest: config.verify_manifest,
            runtime_config: config.runtime.clone(),
        }
    }

    pub fn with_manifest_verification(mut self, verify: bool) -> Self {
        self.verify_manifest = verify;
        self
    }

    pub fn artifacts_dir(&self) -> &Path {
        &self.artifacts_dir
    }

    pub fn paths(&self) -> &ArtifactPaths {
        &self.paths
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.artifacts_dir.join(ArtifactKind::Manifest.default_file_name())
    }

    /// Artifacts whose files do not exist, in load order
    pub fn missing(&self) -> Vec<ArtifactKind> {
        [ArtifactKind::Model, ArtifactKind::Tokenizer, ArtifactKind::Encoder]
            .into_iter()
            .filter(|&kind| self.paths.get(kind).map_or(true, |p| !p.exists()))
            .collect()
    }

    /// Checks every file listed in `manifest.json` against its SHA-256 digest.
    ///
    /// A missing manifest is not an error; there is simply nothing to verify.
    pub fn verify(&self) -> Result<(), ArtifactError> {
        let manifest_path = self.manifest_path();
        if !manifest_path.exists() {
            info!("No manifest at {:?}, skipping digest verification", manifest_path);
            return Ok(());
        }

        let manifest = ArtifactManifest::from_file(&manifest_path)?;
        for kind in [ArtifactKind::Model, ArtifactKind::Tokenizer, ArtifactKind::Encoder] {
            match (manifest.expected(kind), self.paths.get(kind)) {
                (Some(expected), Some(path)) => manifest::verify_file(path, kind, expected)?,
                _ => warn!("Manifest has no digest for the {}, not verified", kind),
            }
        }
        info!("Artifact digests verified successfully");
        Ok(())
    }

    /// Loads all three artifacts into an immutable context.
    ///
    /// # Errors
    /// - `NotFound` for the first artifact whose file is missing
    /// - `HashMismatch` if manifest verification is enabled and a digest differs
    /// - `Malformed` / `Runtime` if an artifact cannot be parsed or loaded
    pub fn load(&self) -> Result<Artifacts, ArtifactError> {
        if let Some(&kind) = self.missing().first() {
            let path = self.paths.get(kind).map(Path::to_path_buf).unwrap_or_default();
            error!("Missing {} artifact at {:?}", kind, path);
            return Err(ArtifactError::NotFound { kind, path });
        }

        if self.verify_manifest {
            self.verify()?;
        }

        let encoder = LabelEncoder::from_file(&self.paths.encoder)?;
        info!("Label encoder loaded successfully ({} classes)", encoder.len());

        let tokenizer = load_tokenizer(&self.paths.tokenizer)?;
        info!("Tokenizer loaded successfully ({} words)", tokenizer.get_vocab_size(false));

        let classifier = OnnxClassifier::from_file(&self.paths.model, &self.runtime_config)?;
        info!("Classifier loaded successfully from {:?}", self.paths.model);

        Ok(Artifacts {
            tokenizer,
            classifier: Box::new(classifier),
            encoder,
            paths: Some(self.paths.clone()),
        })
    }
}
