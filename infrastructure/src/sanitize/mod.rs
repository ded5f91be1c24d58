//! Regex-based output sanitizer
//!
//! Strips leftover internal markers and, optionally, redacts personal data
//! from the final answer.

use chorus_application::OutputSanitizer;
use regex::Regex;

/// A marker and at most one space after it
const MARKERS: &str = r"(?i)(?:\[/?(?:internal|draft|scratchpad)\]|<\|[a-z_]+\|>)[ \t]?";
const EMAIL: &str = r"(?i)\b[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}\b";
const SSN: &str = r"\b\d{3}-\d{2}-\d{4}\b";
const CARD: &str = r"\b(?:\d[ -]?){12,15}\d\b";
const PHONE: &str = r"(?:\+\d{1,3}[ .-]?)?(?:\(\d{3}\)|\b\d{3})[ .-]?\d{3}[ .-]?\d{4}\b";
const TRAILING_SPACE: &str = r"(?m)[ \t]+$";

pub struct RegexSanitizer {
    markers: Regex,
    /// Applied in order; more specific shapes first
    redactions: Vec<(Regex, &'static str)>,
    trailing_space: Regex,
}

impl RegexSanitizer {
    pub fn new(redact_pii: bool) -> Result<Self, regex::Error> {
        let redactions = if redact_pii {
            vec![
                (Regex::new(EMAIL)?, "[email]"),
                (Regex::new(SSN)?, "[ssn]"),
                (Regex::new(CARD)?, "[card]"),
                (Regex::new(PHONE)?, "[phone]"),
            ]
        } else {
            Vec::new()
        };

        Ok(Self {
            markers: Regex::new(MARKERS)?,
            redactions,
            trailing_space: Regex::new(TRAILING_SPACE)?,
        })
    }
}

impl OutputSanitizer for RegexSanitizer {
    fn sanitize(&self, text: &str) -> String {
        let mut out = self.markers.replace_all(text, "").into_owned();
        for (pattern, replacement) in &self.redactions {
            out = pattern.replace_all(&out, *replacement).into_owned();
        }
        // Indentation is content (code blocks); only line ends are tidied.
        self.trailing_space
            .replace_all(&out, "")
            .trim_matches('\n')
            .to_string()
    }
}
