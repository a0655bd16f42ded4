use tokenizers::Tokenizer;

/// Builds a whitespace word-level tokenizer: `<OOV>` is id 1, `words[i]` is id `i + 2`.
pub(crate) fn word_level_tokenizer(words: &[&str]) -> Tokenizer {
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
    .parse()
    .expect("valid tokenizer json")
}
