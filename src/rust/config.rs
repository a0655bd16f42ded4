use std::env;
use std::path::{Path, PathBuf};

use crate::artifacts::ArtifactKind;
use crate::classifier::SEQUENCE_LENGTH;
use crate::runtime::RuntimeConfig;

/// Environment variable overriding the artifact directory.
pub const ARTIFACTS_ENV: &str = "CYBERAUDIT_ARTIFACTS";

/// Settings for one auditor process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditorConfig {
    pub artifacts_dir: PathBuf,
    pub model_file: String,
    pub tokenizer_file: String,
    pub encoder_file: String,
    /// Positions every token sequence is padded or truncated to
    pub sequence_length: usize,
    /// Check `manifest.json` digests before loading
    pub verify_manifest: bool,
    pub runtime: RuntimeConfig,
}

impl Default for AuditorConfig {
    fn default() -> Self {
        Self {
            artifacts_dir: Self::default_artifacts_dir(),
            model_file: ArtifactKind::Model.default_file_name().to_string(),
            tokenizer_file: ArtifactKind::Tokenizer.default_file_name().to_string(),
            encoder_file: ArtifactKind::Encoder.default_file_name().to_string(),
            sequence_length: SEQUENCE_LENGTH,
            verify_manifest: true,
            runtime: RuntimeConfig::default(),
        }
    }
}

impl AuditorConfig {
    /// Returns the default artifact directory path
    pub fn default_artifacts_dir() -> PathBuf {
        resolve_artifacts_dir(None, env::var(ARTIFACTS_ENV).ok(), Path::new("artifacts"))
    }

    pub fn with_artifacts_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.artifacts_dir = dir.into();
        self
    }
}

/// Picks the artifact directory: an explicit path, then the environment value,
/// then `local` when it exists, then platform data locations.
pub fn resolve_artifacts_dir(explicit: Option<PathBuf>, env_value: Option<String>, local: &Path) -> PathBuf {
    // 1. Command-line flag
    if let Some(path) = explicit {
        return path;
    }

    // 2. Check environment variable
    if let Some(path) = env_value.filter(|v| !v.trim().is_empty()) {
        return PathBuf::from(path);
    }

    // 3. Artifacts shipped next to the working directory
    if local.is_dir() {
        return local.to_path_buf();
    }

    // 4. Use platform-specific data directory
    if let Some(data_dir) = dirs::data_dir() {
        return data_dir.join("cyberaudit");
    }

    // 5. Fallback to user's home directory
    if let Some(home_dir) = dirs::home_dir() {
        return home_dir.join(".cyberaudit");
    }

    // 6. If all else fails, use system temp directory
    env::temp_dir().join("cyberaudit")
}
