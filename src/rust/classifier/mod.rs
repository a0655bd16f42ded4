mod error;
mod model;
mod normalize;
mod pipeline;
mod sequence;

pub use error::AuditError;
pub use model::{OnnxClassifier, SequenceClassifier};
pub use normalize::normalize;
pub use pipeline::{argmax, InferencePipeline, PipelineInfo, Prediction};
pub use sequence::{pad_sequence, PADDING_VALUE, SEQUENCE_LENGTH};
