use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use ndarray::Array2;
use ort::session::Session;
use ort::tensor::TensorElementType;
use ort::value::{DynValue, Tensor, ValueType};
use log::{debug, info};

use super::error::AuditError;
use crate::artifacts::{ArtifactError, ArtifactKind};
use crate::runtime::{create_session_builder, RuntimeConfig};

/// The trained network: maps one fixed-length token sequence to a score per class.
///
/// The output position `i` corresponds to class `i` of the label encoder.
/// Implementations must be `Send + Sync`; the loaded artifacts are shared
/// read-only for the whole process.
pub trait SequenceClassifier: fmt::Debug + Send + Sync {
    /// Runs one forward pass and returns the class probability distribution.
    fn predict_proba(&self, sequence: &[u32]) -> Result<Vec<f32>, AuditError>;
}

/// Element type of the model's sequence input, read from the graph at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputKind {
    Int64,
    Int32,
    Float32,
}

/// A classifier backed by an ONNX graph exported from the training framework.
///
/// The graph is expected to:
/// - take one input of shape `[batch_size, sequence_length]` holding token ids
///   (as `int64`, `int32` or `float32`, depending on the exporter)
/// - produce the class probabilities as its first output, shape `[batch_size, num_classes]`
#[derive(Debug)]
pub struct OnnxClassifier {
    session: Session,
    input_name: String,
    input_kind: InputKind,
}

impl OnnxClassifier {
    /// Loads and validates an ONNX model file.
    ///
    /// # Errors
    /// - `Runtime` if ONNX Runtime cannot be initialized or rejects the file
    /// - `Malformed` if the graph has no inputs/outputs or an unsupported input type
    pub fn from_file(path: &Path, config: &RuntimeConfig) -> Result<Self, ArtifactError> {
        let session = create_session_builder(config)?
            .commit_from_file(path)?;

        let (input_name, input_kind) = Self::validate_model(&session)?;
        info!("Model structure validated successfully ({} as {:?})", input_name, input_kind);

        Ok(Self { session, input_name, input_kind })
    }

    /// Validates that the model has the expected input/output structure
    fn validate_model(session: &Session) -> Result<(String, InputKind), ArtifactError> {
        let malformed = |reason: String| ArtifactError::Malformed {
            kind: ArtifactKind::Model,
            reason,
        };

        let input = session.inputs.first()
            .ok_or_else(|| malformed("Model must have 1 input for the token sequence, found 0".into()))?;
        if session.outputs.is_empty() {
            return Err(malformed("Model must have at least 1 output for class probabilities".into()));
        }

        let kind = match &input.input_type {
            ValueType::Tensor { ty, .. } => match ty {
                TensorElementType::Int64 => InputKind::Int64,
                TensorElementType::Int32 => InputKind::Int32,
                TensorElementType::Float32 => InputKind::Float32,
                other => {
                    return Err(malformed(format!(
                        "Unsupported element type {:?} for input '{}'",
                        other, input.name
                    )))
                }
            },
            other => {
                return Err(malformed(format!(
                    "Input '{}' must be a tensor, found {:?}",
                    input.name, other
                )))
            }
        };

        Ok((input.name.clone(), kind))
    }

    fn input_value(&self, sequence: &[u32]) -> Result<DynValue, AuditError> {
        let shape = (1, sequence.len());
        let shape_error = |e: ndarray::ShapeError| {
            AuditError::InferenceError(format!("Failed to create input array: {}", e))
        };
        let tensor_error = |e: ort::Error| {
            AuditError::InferenceError(format!("Failed to create input tensor: {}", e))
        };

        let value = match self.input_kind {
            InputKind::Int64 => {
                let array = Array2::from_shape_vec(shape, sequence.iter().map(|&t| i64::from(t)).collect())
                    .map_err(shape_error)?;
                Tensor::from_array(array).map_err(tensor_error)?.into_dyn()
            }
            InputKind::Int32 => {
                let data = sequence.iter()
                    .map(|&t| i32::try_from(t))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|_| AuditError::InferenceError("Token id does not fit the model's int32 input".into()))?;
                let array = Array2::from_shape_vec(shape, data).map_err(shape_error)?;
                Tensor::from_array(array).map_err(tensor_error)?.into_dyn()
            }
            InputKind::Float32 => {
                let array = Array2::from_shape_vec(shape, sequence.iter().map(|&t| t as f32).collect())
                    .map_err(shape_error)?;
                Tensor::from_array(array).map_err(tensor_error)?.into_dyn()
            }
        };
        Ok(value)
    }
}

impl SequenceClassifier for OnnxClassifier {
    fn predict_proba(&self, sequence: &[u32]) -> Result<Vec<f32>, AuditError> {
        let mut input_tensors = HashMap::new();
        input_tensors.insert(self.input_name.as_str(), self.input_value(sequence)?);

        let outputs = self.session.run(input_tensors)
            .map_err(|e| AuditError::InferenceError(format!("Failed to run model: {}", e)))?;
        let output_tensor = outputs[0].try_extract_tensor::<f32>()
            .map_err(|e| AuditError::InferenceError(format!("Failed to extract output tensor: {}", e)))?;
        debug!("Model output shape: {:?}", output_tensor.shape());

        Ok(output_tensor.iter().copied().collect())
    }
}
