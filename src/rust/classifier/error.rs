use crate::artifacts::ArtifactError;

/// Represents the different types of errors that can occur while auditing a comment.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    /// One of the classifier, tokenizer or label encoder could not be loaded
    #[error("Artifact unavailable: {0}")]
    ArtifactUnavailable(#[from] ArtifactError),
    /// The user triggered an analysis without entering any text
    #[error("No comment entered")]
    EmptyInput,
    /// Error occurred while converting text into token ids
    #[error("Tokenizer error: {0}")]
    TokenizerError(String),
    /// Error occurred while running the classifier forward pass
    #[error("Inference error: {0}")]
    InferenceError(String),
    /// The classifier produced an index the label encoder cannot decode
    #[error("Label error: {0}")]
    LabelError(String),
}
