//! Per-session state: the classification history and the handler that feeds it.

mod history;

pub use history::{
    ClassificationRecord, Distribution, Report, SessionHistory, REPORT_FILE_NAME, REPORT_MIME_TYPE,
};

use log::{error, info};

use crate::classifier::{AuditError, InferencePipeline, Prediction};

/// One interactive session: a shared pipeline plus the history it owns.
///
/// Sessions never share history; create one per user session and pass it to
/// every handler explicitly.
#[derive(Debug)]
pub struct AuditSession<'p> {
    pipeline: &'p InferencePipeline,
    history: SessionHistory,
}

impl<'p> AuditSession<'p> {
    pub fn new(pipeline: &'p InferencePipeline) -> Self {
        Self {
            pipeline,
            history: SessionHistory::new(),
        }
    }

    /// Handles one "Analyze" action.
    ///
    /// The comment is stored exactly as entered; only the classifier sees the
    /// normalized text.
    ///
    /// # Errors
    /// - `EmptyInput` if `input` is empty; callers treat this as a no-op
    /// - any pipeline error; the history is left untouched
    pub fn analyze(&mut self, input: &str) -> Result<&ClassificationRecord, AuditError> {
        self.analyze_with_scores(input).map(|(record, _)| record)
    }

    /// Same as [`analyze`](Self::analyze), also returning the class scores
    /// behind the stored label.
    pub fn analyze_with_scores(
        &mut self,
        input: &str,
    ) -> Result<(&ClassificationRecord, Prediction), AuditError> {
        if input.is_empty() {
            return Err(AuditError::EmptyInput);
        }

        let prediction = self.pipeline.predict(input).map_err(|e| {
            error!("Failed to classify comment: {}", e);
            e
        })?;
        info!(
            "Classified comment {} as {} ({:.3})",
            self.history.len() + 1,
            prediction.label,
            prediction.confidence
        );
        let record = self.history.append(input, prediction.label.clone());
        Ok((record, prediction))
    }

    pub fn history(&self) -> &SessionHistory {
        &self.history
    }
}
