use std::path::PathBuf;
use std::sync::Arc;

use log::{debug, info};
use tokenizers::Tokenizer;

use super::error::AuditError;
use super::normalize::normalize;
use super::sequence::{TokenSequencing, PADDING_VALUE};
use crate::artifacts::{ArtifactError, ArtifactKind, ArtifactStore, Artifacts};
use crate::config::AuditorConfig;

/// The outcome of one classification.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Winning category name, upper-cased
    pub label: String,
    /// Probability of the winning category
    pub confidence: f32,
    /// Every category (upper-cased) with its probability, in label encoder order
    pub scores: Vec<(String, f32)>,
}

/// Information about the loaded pipeline
#[derive(Debug, Clone)]
pub struct PipelineInfo {
    pub sequence_length: usize,
    pub class_labels: Vec<String>,
    pub vocab_size: usize,
    pub model_path: Option<PathBuf>,
    pub tokenizer_path: Option<PathBuf>,
    pub encoder_path: Option<PathBuf>,
}

/// Turns a raw comment into a category label.
///
/// The pipeline runs [`normalize`], the word-level tokenizer, post-padding to
/// a fixed length, the classifier forward pass, an arg-max and the label
/// encoder, in that order.
///
/// # Thread Safety
///
/// The pipeline only holds an `Arc` to immutable artifacts, so it is
/// `Send + Sync` and one instance can serve any number of sessions.
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use cyberaudit::{AuditorConfig, InferencePipeline};
///
/// let pipeline = InferencePipeline::from_config(&AuditorConfig::default())?;
/// let label = pipeline.classify("Have a nice day")?;
/// println!("{}", label);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct InferencePipeline {
    artifacts: Arc<Artifacts>,
    sequence_length: usize,
}

impl TokenSequencing for InferencePipeline {
    fn tokenizer(&self) -> Option<&Tokenizer> {
        Some(self.artifacts.tokenizer())
    }

    fn sequence_length(&self) -> usize {
        self.sequence_length
    }
}

impl InferencePipeline {
    /// Wraps loaded artifacts into a pipeline.
    ///
    /// Runs one warm-up inference on an all-padding sequence so that a classifier
    /// whose output width disagrees with the label encoder is rejected at
    /// start-up instead of on the first request.
    ///
    /// # Errors
    /// - `InferenceError` if `sequence_length` is zero
    /// - `ArtifactUnavailable` if the warm-up fails or its width is wrong
    pub fn new(artifacts: Arc<Artifacts>, sequence_length: usize) -> Result<Self, AuditError> {
        if sequence_length == 0 {
            return Err(AuditError::InferenceError("Sequence length must be at least 1".into()));
        }

        let malformed = |reason: String| {
            AuditError::ArtifactUnavailable(ArtifactError::Malformed {
                kind: ArtifactKind::Model,
                reason,
            })
        };

        let warm_up = vec![PADDING_VALUE; sequence_length];
        let scores = artifacts.classifier().predict_proba(&warm_up)
            .map_err(|e| malformed(format!("Warm-up inference failed: {}", e)))?;
        let num_classes = artifacts.encoder().len();
        if scores.len() != num_classes {
            return Err(malformed(format!(
                "Model produces {} scores but the label encoder defines {} classes",
                scores.len(),
                num_classes
            )));
        }
        info!("Pipeline ready: {} classes, sequence length {}", num_classes, sequence_length);

        Ok(Self { artifacts, sequence_length })
    }

    /// Loads the artifacts named by `config` and builds the pipeline.
    pub fn from_config(config: &AuditorConfig) -> Result<Self, AuditError> {
        let artifacts = ArtifactStore::from_config(config).load()?;
        Self::new(Arc::new(artifacts), config.sequence_length)
    }

    /// Classifies a raw comment and returns its upper-cased category name.
    pub fn classify(&self, raw: &str) -> Result<String, AuditError> {
        self.predict(raw).map(|prediction| prediction.label)
    }

    /// Classifies a raw comment and returns the label with every class score.
    ///
    /// Text that normalizes to nothing is still classified; the model sees an
    /// all-padding sequence.
    pub fn predict(&self, raw: &str) -> Result<Prediction, AuditError> {
        let cleaned = normalize(raw);
        debug!("Normalized input: {:?}", cleaned);

        let sequence = self.padded_sequence(&cleaned)?;
        let probabilities = self.artifacts.classifier().predict_proba(&sequence)?;

        let best = argmax(&probabilities)
            .ok_or_else(|| AuditError::InferenceError("Model returned no usable scores".into()))?;
        let encoder = self.artifacts.encoder();
        let label = encoder.inverse_transform(best)
            .ok_or_else(|| AuditError::LabelError(format!(
                "Class index {} is outside the label encoder ({} classes)",
                best,
                encoder.len()
            )))?
            .to_uppercase();

        let scores = encoder.classes().iter()
            .zip(probabilities.iter())
            .map(|(class, &p)| (class.to_uppercase(), p))
            .collect();

        Ok(Prediction {
            label,
            confidence: probabilities[best],
            scores,
        })
    }

    /// Returns information about the pipeline's current configuration
    pub fn info(&self) -> PipelineInfo {
        let paths = self.artifacts.paths();
        PipelineInfo {
            sequence_length: self.sequence_length,
            class_labels: self.artifacts.encoder().classes().iter().map(|c| c.to_uppercase()).collect(),
            vocab_size: self.artifacts.tokenizer().get_vocab_size(false),
            model_path: paths.map(|p| p.model.clone()),
            tokenizer_path: paths.map(|p| p.tokenizer.clone()),
            encoder_path: paths.map(|p| p.encoder.clone()),
        }
    }
}

/// Index of the highest score; the lowest index wins ties and NaN never wins.
pub fn argmax(scores: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &score) in scores.iter().enumerate() {
        if score.is_nan() {
            continue;
        }
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((i, score)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::artifacts::LabelEncoder;
    use crate::classifier::SequenceClassifier;
    use crate::testing::word_level_tokenizer;

    #[derive(Debug)]
    struct FixedScores(Vec<f32>);

    impl SequenceClassifier for FixedScores {
        fn predict_proba(&self, _sequence: &[u32]) -> Result<Vec<f32>, AuditError> {
            Ok(self.0.clone())
        }
    }

    #[derive(Debug, Default)]
    struct Recording {
        seen: Mutex<Vec<Vec<u32>>>,
    }

    impl SequenceClassifier for Recording {
        fn predict_proba(&self, sequence: &[u32]) -> Result<Vec<f32>, AuditError> {
            self.seen.lock().unwrap().push(sequence.to_vec());
            Ok(vec![0.2, 0.8])
        }
    }

    fn encoder() -> LabelEncoder {
        LabelEncoder::new(vec!["bullying", "not_bullying"]).unwrap()
    }

    fn pipeline(classifier: impl SequenceClassifier + 'static) -> InferencePipeline {
        let tokenizer = word_level_tokenizer(&["have", "a", "nice", "day"]);
        let artifacts = Artifacts::new(tokenizer, classifier, encoder());
        InferencePipeline::new(Arc::new(artifacts), 100).unwrap()
    }

    #[test]
    fn test_argmax_prefers_lowest_index_on_ties() {
        assert_eq!(argmax(&[0.1, 0.7, 0.7, 0.1]), Some(1));
        assert_eq!(argmax(&[0.5, 0.5]), Some(0));
        assert_eq!(argmax(&[f32::NAN, 0.3, 0.2]), Some(1));
        assert_eq!(argmax(&[]), None);
        assert_eq!(argmax(&[f32::NAN]), None);
    }

    #[test]
    fn test_classify_upper_cases_decoded_label() {
        let pipeline = pipeline(FixedScores(vec![0.1, 0.9]));
        assert_eq!(pipeline.classify("Have a nice day").unwrap(), "NOT_BULLYING");
    }

    #[test]
    fn test_predict_reports_all_scores() {
        let pipeline = pipeline(FixedScores(vec![0.75, 0.25]));
        let prediction = pipeline.predict("you are awful").unwrap();
        assert_eq!(prediction.label, "BULLYING");
        assert_eq!(prediction.confidence, 0.75);
        assert_eq!(
            prediction.scores,
            vec![("BULLYING".to_string(), 0.75), ("NOT_BULLYING".to_string(), 0.25)]
        );
    }

    #[test]
    fn test_classifier_sees_normalized_padded_ids() {
        let recording = Arc::new(Recording::default());
        let tokenizer = word_level_tokenizer(&["have", "a", "nice", "day"]);
        let artifacts = Artifacts::new(tokenizer, SharedRecording(Arc::clone(&recording)), encoder());
        let pipeline = InferencePipeline::new(Arc::new(artifacts), 100).unwrap();

        pipeline.classify("HAVE a NICE day @friend, http://x.co").unwrap();
        pipeline.classify("have a terrible day").unwrap();

        let seen = recording.seen.lock().unwrap();
        // warm-up + two requests
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0], vec![0; 100]);
        assert_eq!(&seen[1][..5], &[2, 3, 4, 5, 0]);
        assert_eq!(seen[1].len(), 100);
        // unknown words map to the tokenizer's unknown id (1)
        assert_eq!(&seen[2][..5], &[2, 3, 1, 5, 0]);
    }

    #[derive(Debug)]
    struct SharedRecording(Arc<Recording>);

    impl SequenceClassifier for SharedRecording {
        fn predict_proba(&self, sequence: &[u32]) -> Result<Vec<f32>, AuditError> {
            self.0.predict_proba(sequence)
        }
    }

    #[test]
    fn test_long_comment_is_truncated() {
        let recording = Arc::new(Recording::default());
        let tokenizer = word_level_tokenizer(&["bad"]);
        let artifacts = Artifacts::new(tokenizer, SharedRecording(Arc::clone(&recording)), encoder());
        let pipeline = InferencePipeline::new(Arc::new(artifacts), 100).unwrap();

        pipeline.classify(&"bad ".repeat(250)).unwrap();
        let seen = recording.seen.lock().unwrap();
        assert_eq!(seen[1], vec![2; 100]);
    }

    #[test]
    fn test_empty_after_normalization_still_runs() {
        let pipeline = pipeline(FixedScores(vec![0.6, 0.4]));
        assert_eq!(pipeline.classify("!!! @someone").unwrap(), "BULLYING");
        assert_eq!(pipeline.classify("   ").unwrap(), "BULLYING");
    }

    #[test]
    fn test_rejects_model_with_wrong_output_width() {
        let tokenizer = word_level_tokenizer(&["day"]);
        let artifacts = Artifacts::new(tokenizer, FixedScores(vec![0.2, 0.3, 0.5]), encoder());
        let result = InferencePipeline::new(Arc::new(artifacts), 100);
        assert!(matches!(
            result,
            Err(AuditError::ArtifactUnavailable(ArtifactError::Malformed { kind: ArtifactKind::Model, .. }))
        ));
    }

    #[test]
    fn test_rejects_zero_sequence_length() {
        let tokenizer = word_level_tokenizer(&["day"]);
        let artifacts = Artifacts::new(tokenizer, FixedScores(vec![0.5, 0.5]), encoder());
        assert!(InferencePipeline::new(Arc::new(artifacts), 0).is_err());
    }

    #[test]
    fn test_info() {
        let pipeline = pipeline(FixedScores(vec![0.5, 0.5]));
        let info = pipeline.info();
        assert_eq!(info.sequence_length, 100);
        assert_eq!(info.class_labels, vec!["BULLYING", "NOT_BULLYING"]);
        assert_eq!(info.vocab_size, 5);
        assert!(info.model_path.is_none());
    }
}
