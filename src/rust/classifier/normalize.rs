use std::sync::OnceLock;

use regex::Regex;

struct Patterns {
    urls: Regex,
    mentions: Regex,
    punctuation: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        urls: Regex::new(r"http\S+|www\S+|https\S+").expect("valid url pattern"),
        mentions: Regex::new(r"@[\p{L}\p{N}_]+").expect("valid mention pattern"),
        punctuation: Regex::new(r"[^\p{L}\p{N}_\s]").expect("valid punctuation pattern"),
    })
}

fn clean_once(text: &str) -> String {
    let patterns = patterns();
    let text = text.to_lowercase();
    let text = patterns.urls.replace_all(&text, "");
    let text = patterns.mentions.replace_all(&text, "");
    let text = patterns.punctuation.replace_all(&text, "");
    text.trim().to_string()
}

/// Cleans a raw comment before tokenization.
///
/// Lower-cases the text, drops URL-like tokens (`http…`, `https…`, `www…`),
/// drops `@mentions`, removes every character that is neither a word
/// character nor whitespace, and trims the result.
///
/// A word character is a letter, a number of any kind or `_`. Combining marks
/// are not word characters, so decomposed accents are dropped (`cafe\u{301}`
/// becomes `cafe`) while numerics such as `½` or `²` are kept. The regex
/// crate's `\w` would do the opposite on both counts.
///
/// Dropping punctuation can glue together a fresh URL prefix (`ht.tpx` becomes
/// `httpx`), so the steps run until the text stops changing. Every pass only
/// removes characters, which bounds the loop by the input length.
///
/// ```
/// use cyberaudit::normalize;
///
/// assert_eq!(normalize("Check https://t.co/x NOW, @bob!"), "check  now");
/// ```
pub fn normalize(raw: &str) -> String {
    let mut current = clean_once(raw);
    loop {
        let next = clean_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}
