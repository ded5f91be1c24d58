//! Cheap heuristic fact checking
//!
//! A sentence counts as a claim when it contains a digit or the word
//! "according". Verdicts are heuristic only: this layer never emits
//! [`Verdict::Fail`], and nothing downstream should treat it as authoritative.

use crate::ensemble::EnsembleOutput;
use crate::prompt::PromptPlan;
use crate::util::split_sentences;
use serde::{Deserialize, Serialize};

pub const NUMERIC_CLAIM_SCORE: f64 = 0.7;
pub const ATTRIBUTED_CLAIM_SCORE: f64 = 0.8;
pub const PASS_THRESHOLD: f64 = 0.65;

const METHOD: &str = "heuristic:claim-pattern";

/// Fact-check verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Fail,
    Unclear,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Pass => write!(f, "pass"),
            Verdict::Fail => write!(f, "fail"),
            Verdict::Unclear => write!(f, "unclear"),
        }
    }
}

/// Result for one extracted claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactCheckResult {
    pub backend_name: String,
    pub claim: String,
    pub method: String,
    pub verdict: Verdict,
    pub score: f64,
    pub evidence: String,
}

/// Extract claims from each output and attach heuristic verdicts
pub fn verify(outputs: &[EnsembleOutput], _plan: &PromptPlan) -> Vec<FactCheckResult> {
    let mut results = Vec::new();
    for output in outputs {
        for sentence in split_sentences(&output.text) {
            let has_digit = sentence.chars().any(|c| c.is_ascii_digit());
            let attributed = sentence
                .split(|c: char| !c.is_alphanumeric())
                .any(|w| w.eq_ignore_ascii_case("according"));
            if !has_digit && !attributed {
                continue;
            }

            let score = if has_digit {
                NUMERIC_CLAIM_SCORE
            } else {
                ATTRIBUTED_CLAIM_SCORE
            };
            let verdict = if score >= PASS_THRESHOLD {
                Verdict::Pass
            } else {
                Verdict::Unclear
            };
            let evidence = if has_digit {
                "numeric claim; plausible but unverified against a source"
            } else {
                "attributed claim; cites an external authority"
            };

            results.push(FactCheckResult {
                backend_name: output.backend_name.clone(),
                claim: sentence.to_string(),
                method: METHOD.to_string(),
                verdict,
                score,
                evidence: evidence.to_string(),
            });
        }
    }
    results
}

/// Mean fact-check score, if any claim was checked
pub fn mean_score(results: &[FactCheckResult]) -> Option<f64> {
    if results.is_empty() {
        return None;
    }
    Some(results.iter().map(|r| r.score).sum::<f64>() / results.len() as f64)
}
