//! Shared text and numeric helpers.

/// Truncate a string to approximately `max_bytes` without splitting a UTF-8
/// character boundary.
pub fn truncate_str(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Clamp a score into `[0, 1]`, mapping NaN to 0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Split text into sentences on `.`, `!` or `?` followed by whitespace.
///
/// Terminal punctuation stays attached to its sentence. Empty pieces are dropped.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((_, ch)) = chars.next() {
        if matches!(ch, '.' | '!' | '?')
            && let Some(&(next_idx, next)) = chars.peek()
            && next.is_whitespace()
        {
            let piece = text[start..next_idx].trim();
            if !piece.is_empty() {
                sentences.push(piece);
            }
            start = next_idx;
        }
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }
    sentences
}

/// Replace ASCII-case-insensitive occurrences of `needle` that stand as whole
/// words, keeping only those `accept` approves.
///
/// `accept` receives the haystack and the byte range of the candidate match.
/// A match is a whole word when no alphanumeric or `_` character touches it
/// on either side.
pub fn replace_words_where<F>(haystack: &str, needle: &str, replacement: &str, accept: F) -> String
where
    F: Fn(&str, usize, usize) -> bool,
{
    if needle.is_empty() {
        return haystack.to_string();
    }
    let lower_haystack = haystack.to_ascii_lowercase();
    let lower_needle = needle.to_ascii_lowercase();

    let mut out = String::with_capacity(haystack.len());
    let mut copied = 0;
    let mut search = 0;
    while let Some(found) = lower_haystack[search..].find(&lower_needle) {
        let at = search + found;
        let end = at + lower_needle.len();
        if is_word_boundary(haystack, at, end) && accept(haystack, at, end) {
            out.push_str(&haystack[copied..at]);
            out.push_str(replacement);
            copied = end;
            search = end;
        } else {
            search = at + haystack[at..].chars().next().map_or(1, char::len_utf8);
        }
    }
    out.push_str(&haystack[copied..]);
    out
}

/// Replace every whole-word, ASCII-case-insensitive occurrence of `needle`.
pub fn replace_words(haystack: &str, needle: &str, replacement: &str) -> String {
    replace_words_where(haystack, needle, replacement, |_, _, _| true)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_word_boundary(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
}

/// Whether `haystack` contains `needle`, ignoring ASCII case.
pub fn contains_ignore_ascii_case(haystack: &str, needle: &str) -> bool {
    haystack
        .to_ascii_lowercase()
        .contains(&needle.to_ascii_lowercase())
}
