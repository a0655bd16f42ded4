use tokenizers::Tokenizer;

use super::error::AuditError;

/// Number of token positions the classifier was trained on.
pub const SEQUENCE_LENGTH: usize = 100;

/// Token id used to fill positions past the end of a short comment.
pub const PADDING_VALUE: u32 = 0;

/// Pads or truncates `tokens` to exactly `length` positions.
///
/// Short sequences get `value` appended at the end, long sequences lose
/// their trailing positions.
///
/// ```
/// use cyberaudit::pad_sequence;
///
/// assert_eq!(pad_sequence(&[5, 6], 4, 0), vec![5, 6, 0, 0]);
/// assert_eq!(pad_sequence(&[5, 6, 7], 2, 0), vec![5, 6]);
/// ```
pub fn pad_sequence(tokens: &[u32], length: usize, value: u32) -> Vec<u32> {
    let mut padded = Vec::with_capacity(length);
    padded.extend(tokens.iter().take(length).copied());
    padded.resize(length, value);
    padded
}

/// Converts cleaned text into the fixed-length integer sequence the classifier expects.
///
/// Implementors only provide the tokenizer and the sequence length; the
/// vocabulary lookup and padding are shared.
pub(crate) trait TokenSequencing {
    /// Returns the loaded word-level tokenizer if available
    fn tokenizer(&self) -> Option<&Tokenizer>;

    /// Returns the number of positions every sequence is padded or truncated to
    fn sequence_length(&self) -> usize;

    /// Maps every word of `text` to its vocabulary id.
    ///
    /// Unknown words resolve to the tokenizer's unknown-token id; which id
    /// that is belongs to the tokenizer artifact.
    ///
    /// # Errors
    /// - `TokenizerError` if the tokenizer is not initialized
    /// - `TokenizerError` if the text cannot be encoded
    fn text_to_sequence(&self, text: &str) -> Result<Vec<u32>, AuditError> {
        let tokenizer = self.tokenizer()
            .ok_or_else(|| AuditError::TokenizerError("Tokenizer not initialized".into()))?;

        let encoding = tokenizer.encode(text, false)
            .map_err(|e| AuditError::TokenizerError(e.to_string()))?;
        Ok(encoding.get_ids().to_vec())
    }

    /// Tokenizes `text` and post-pads or post-truncates it to `sequence_length()`.
    fn padded_sequence(&self, text: &str) -> Result<Vec<u32>, AuditError> {
        let tokens = self.text_to_sequence(text)?;
        if tokens.len() > self.sequence_length() {
            log::debug!(
                "Truncating {} tokens to {} positions",
                tokens.len(),
                self.sequence_length()
            );
        }
        Ok(pad_sequence(&tokens, self.sequence_length(), PADDING_VALUE))
    }
}
