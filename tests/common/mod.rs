#![allow(dead_code)]

use std::path::Path;

use cyberaudit::{AuditError, SequenceClassifier};
use env_logger::{Builder, Env};
use tokenizers::Tokenizer;

// Initialize test logger
pub fn init() {
    let _ = Builder::from_env(Env::default().default_filter_or("warn"))
        .is_test(true)
        .try_init();
}

pub const CLASSES: [&str; 6] = [
    "age",
    "ethnicity",
    "gender",
    "not_bullying",
    "other_cyberbullying",
    "religion",
];

/// Whitespace word-level tokenizer in Hugging Face format; `<OOV>` is id 1.
pub fn tokenizer_json(words: &[&str]) -> String {
    let mut vocab = serde_json::Map::new();
    vocab.insert("<OOV>".into(), 1.into());
    for (i, word) in words.iter().enumerate() {
        vocab.insert((*word).into(), (i + 2).into());
    }
    serde_json::json!({
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": [],
        "normalizer": null,
        "pre_tokenizer": { "type": "Whitespace" },
        "post_processor": null,
        "decoder": null,
        "model": { "type": "WordLevel", "vocab": vocab, "unk_token": "<OOV>" }
    })
    .to_string()
}

pub fn tokenizer(words: &[&str]) -> Tokenizer {
    tokenizer_json(words).parse().expect("valid tokenizer json")
}

/// Writes tokenizer.json and encoder.json (and optionally a model file) into `dir`.
pub fn write_artifacts(dir: &Path, model_bytes: Option<&[u8]>) {
    std::fs::write(dir.join("tokenizer.json"), tokenizer_json(&["have", "a", "nice", "day"])).unwrap();
    std::fs::write(
        dir.join("encoder.json"),
        serde_json::json!({ "classes": CLASSES }).to_string(),
    )
    .unwrap();
    if let Some(bytes) = model_bytes {
        std::fs::write(dir.join("model_bullying.onnx"), bytes).unwrap();
    }
}

/// Stub classifier that puts all probability mass on one class.
#[derive(Debug)]
pub struct AlwaysClass {
    pub index: usize,
    pub num_classes: usize,
}

impl SequenceClassifier for AlwaysClass {
    fn predict_proba(&self, _sequence: &[u32]) -> Result<Vec<f32>, AuditError> {
        let mut scores = vec![0.0; self.num_classes];
        scores[self.index] = 1.0;
        Ok(scores)
    }
}

/// Stub classifier that flags any sequence containing a given token id.
#[derive(Debug)]
pub struct KeywordClassifier {
    pub token: u32,
    pub hit: usize,
    pub miss: usize,
    pub num_classes: usize,
}

impl SequenceClassifier for KeywordClassifier {
    fn predict_proba(&self, sequence: &[u32]) -> Result<Vec<f32>, AuditError> {
        let winner = if sequence.contains(&self.token) { self.hit } else { self.miss };
        let mut scores = vec![0.05; self.num_classes];
        scores[winner] = 0.75;
        Ok(scores)
    }
}
