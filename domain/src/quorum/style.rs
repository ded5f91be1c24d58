//! Incognito style normalization
//!
//! Removes internal-only markers and any literal mention of the backend,
//! provider or vendor that produced the text. The final answer must read the
//! same regardless of which backend won the vote.

use crate::core::backend::VENDOR_IDENTITY_TOKENS;
use crate::util::replace_words_where;

/// Neutral phrase substituted for identity mentions
pub const NEUTRAL_IDENTITY: &str = "the assistant";

/// Internal-only markers stripped from generated text
pub const INTERNAL_MARKERS: &[&str] = &[
    "[internal]",
    "[/internal]",
    "[draft]",
    "[scratchpad]",
    "<|system|>",
    "<|assistant|>",
    "<|user|>",
    "<|end|>",
    "<|endoftext|>",
];

/// Identities that are also ordinary words. These are only scrubbed where
/// they read as a name: capitalized mid-sentence, or glued to an identifier
/// such as `mistral:large` or `openrouter/mistral`.
pub const COMMON_WORD_IDENTITIES: &[&str] = &[
    "azure", "bedrock", "cohere", "gemini", "google", "llama", "local", "meta", "mistral",
    "vertex",
];

/// Normalizes text into the incognito house style
#[derive(Debug, Clone)]
pub struct StyleNormalizer {
    identities: Vec<String>,
}

impl StyleNormalizer {
    /// Build a normalizer that also scrubs the given backend/provider names
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut identities: Vec<String> = names
            .into_iter()
            .map(|n| n.as_ref().trim().to_ascii_lowercase())
            .filter(|n| !n.is_empty())
            .chain(VENDOR_IDENTITY_TOKENS.iter().map(|t| t.to_string()))
            .collect();
        identities.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        identities.dedup();
        Self { identities }
    }

    /// A copy that additionally scrubs `names`
    pub fn with_names<I, S>(&self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extra: Vec<String> = names.into_iter().map(|n| n.as_ref().to_string()).collect();
        if extra.is_empty() {
            return self.clone();
        }
        Self::new(self.identities.iter().cloned().chain(extra))
    }

    /// Apply marker stripping and identity scrubbing.
    ///
    /// Layout is preserved: indentation and interior spacing survive, only
    /// trailing whitespace and surrounding blank lines are dropped.
    pub fn normalize(&self, text: &str) -> String {
        let mut out = text.to_string();
        for marker in INTERNAL_MARKERS {
            out = remove_marker(&out, marker);
        }
        for identity in &self.identities {
            out = if COMMON_WORD_IDENTITIES.contains(&identity.as_str()) {
                replace_words_where(&out, identity, NEUTRAL_IDENTITY, reads_as_name)
            } else {
                replace_words_where(&out, identity, NEUTRAL_IDENTITY, |_, _, _| true)
            };
        }
        tidy(&out)
    }
}

/// Drop every case-insensitive occurrence of `marker`, eating one following
/// space when the marker stood at a word gap.
fn remove_marker(text: &str, marker: &str) -> String {
    let lower = text.to_ascii_lowercase();
    let needle = marker.to_ascii_lowercase();

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    while let Some(found) = lower[cursor..].find(&needle) {
        let at = cursor + found;
        out.push_str(&text[cursor..at]);
        cursor = at + needle.len();
        let at_gap = out.is_empty() || out.ends_with([' ', '\t', '\n']);
        if at_gap && text[cursor..].starts_with(' ') {
            cursor += 1;
        }
    }
    out.push_str(&text[cursor..]);
    out
}

fn reads_as_name(text: &str, start: usize, end: usize) -> bool {
    let glued_before = text[..start].ends_with(['/', '@']);
    let mut after = text[end..].chars();
    let glued_after = matches!(after.next(), Some(':' | '/'))
        && after.next().is_some_and(|c| !c.is_whitespace());
    let capitalized = text[start..].starts_with(|c: char| c.is_ascii_uppercase());

    glued_before || glued_after || (capitalized && !at_sentence_start(text, start))
}

fn at_sentence_start(text: &str, start: usize) -> bool {
    match text[..start].trim_end_matches([' ', '\t']).chars().next_back() {
        None => true,
        Some(c) => matches!(c, '\n' | '.' | '!' | '?' | '-' | '*' | '#' | '>' | '"' | '('),
    }
}

fn tidy(text: &str) -> String {
    let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
    let first = lines.iter().position(|l| !l.is_empty()).unwrap_or(lines.len());
    let last = lines.iter().rposition(|l| !l.is_empty()).map_or(first, |i| i + 1);
    lines[first..last].join("\n")
}
