//! Question tokenization shared by the scorers and the synthesizer.

/// Tokens longer than this are kept by the retrieval scorers.
pub const GENERAL_MIN_LEN: usize = 2;
/// Tokens longer than this are kept when extracting answers.
pub const EXTRACTION_MIN_LEN: usize = 3;

/// Lower-case `text`, split on every non-alphanumeric character and keep the
/// distinct tokens strictly longer than `min_len` characters, in order of
/// first appearance.
pub fn tokens_longer_than(text: &str, min_len: usize) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut out: Vec<String> = Vec::new();
    for word in lower.split(|c: char| !c.is_alphanumeric()) {
        if word.chars().count() <= min_len {
            continue;
        }
        if out.iter().any(|w| w == word) {
            continue;
        }
        out.push(word.to_string());
    }
    out
}

/// Tokens used by the general retrieval pass (length > 2).
pub fn general_tokens(text: &str) -> Vec<String> {
    tokens_longer_than(text, GENERAL_MIN_LEN)
}

/// Tokens used by the answer-extraction pass (length > 3).
pub fn extraction_tokens(text: &str) -> Vec<String> {
    tokens_longer_than(text, EXTRACTION_MIN_LEN)
}

/// Number of `tokens` occurring as substrings of `haystack_lower`.
pub fn count_contained(haystack_lower: &str, tokens: &[String]) -> usize {
    tokens.iter().filter(|t| haystack_lower.contains(t.as_str())).count()
}

/// Upper-case the first character, leaving the rest untouched.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// The first `max_chars` characters of `s`, never splitting a character.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
