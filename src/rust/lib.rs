//! Cyberbullying auditor: classifies comments with a pre-trained ONNX model and
//! keeps a per-session report of the results.
//!
//! # Basic Usage
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use cyberaudit::{AuditSession, AuditorConfig, InferencePipeline};
//!
//! let config = AuditorConfig::default().with_artifacts_dir("artifacts");
//! let pipeline = InferencePipeline::from_config(&config)?;
//!
//! let mut session = AuditSession::new(&pipeline);
//! let record = session.analyze("Have a nice day")?;
//! println!("{} -> {}", record.comment(), record.label());
//!
//! std::fs::write("cyberbullying_report.csv", session.history().export_csv())?;
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! The artifacts are loaded once and never mutated, so an `InferencePipeline`
//! can be cloned or shared across threads. Each `AuditSession` owns its own
//! history and is meant to serve a single user.

pub mod artifacts;
pub mod classifier;
pub mod config;
mod runtime;
pub mod session;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;

pub use artifacts::{ArtifactError, ArtifactKind, ArtifactManifest, ArtifactStore, Artifacts, LabelEncoder};
pub use classifier::{
    normalize, pad_sequence, AuditError, InferencePipeline, OnnxClassifier, PipelineInfo, Prediction,
    SequenceClassifier, PADDING_VALUE, SEQUENCE_LENGTH,
};
pub use config::{AuditorConfig, ARTIFACTS_ENV};
pub use runtime::{create_session_builder, OptimizationLevel, RuntimeConfig};
pub use session::{AuditSession, ClassificationRecord, Distribution, Report, SessionHistory};
pub use view::{render_distribution, TableView};

/// Initializes `env_logger` from `RUST_LOG`, defaulting to `warn`.
pub fn init_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .try_init();
}
