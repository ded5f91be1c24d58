//! Consensus building
//!
//! Merges the vote winner with salient alternatives, normalizes style, and
//! derives key points, citations and a confidence score.

use super::challenge::{ChallengeFeedback, mean_referee_score};
use super::fact_check::{FactCheckResult, mean_score};
use super::style::StyleNormalizer;
use super::vote::VoteSummary;
use crate::ensemble::EnsembleOutput;
use crate::util::{clamp_unit, split_sentences};
use serde::{Deserialize, Serialize};

/// Fact-check component used when no fact check ran
pub const DEFAULT_FACTCHECK_SCORE: f64 = 0.6;

/// How many ranked alternatives are consulted after the winner
pub const MAX_ALTERNATIVES: usize = 2;

/// How many key points are extracted
pub const MAX_KEY_POINTS: usize = 3;

const ALTERNATIVES_HEADING: &str = "Additional perspectives:";

/// A claim citation backing the final answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// Synthesized internal reference tag (never a backend name)
    pub source: String,
    /// The cited claim
    pub span: String,
}

/// Synthesized answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusResult {
    pub final_answer: String,
    /// Confidence in `[0, 1]`
    pub confidence: f64,
    pub key_points: Vec<String>,
    pub citations: Vec<Citation>,
    /// Always true: the answer carries no trace of the producing backend
    pub style_incognito: bool,
    /// Mean referee score, when a challenge round ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_score: Option<f64>,
}

/// Builds a [`ConsensusResult`] from the vote and the optional review stages
#[derive(Debug, Clone)]
pub struct ConsensusBuilder {
    normalizer: StyleNormalizer,
}

impl ConsensusBuilder {
    pub fn new(normalizer: StyleNormalizer) -> Self {
        Self { normalizer }
    }

    /// Merge, normalize and score. Backend names present in `outputs` are
    /// scrubbed in addition to the ones the normalizer already knows.
    pub fn build(
        &self,
        outputs: &[EnsembleOutput],
        votes: &VoteSummary,
        challenges: &[ChallengeFeedback],
        fact_checks: &[FactCheckResult],
    ) -> ConsensusResult {
        let normalizer = self
            .normalizer
            .with_names(outputs.iter().map(|o| o.backend_name.as_str()));

        let merged = merge_with_alternatives(votes);
        let final_answer = normalizer.normalize(&merged);
        let key_points = extract_key_points(&final_answer);

        let citations = fact_checks
            .iter()
            .enumerate()
            .map(|(i, fc)| Citation {
                source: format!("ref:claim-{}", i + 1),
                span: normalizer.normalize(&fc.claim),
            })
            .collect();

        let factcheck_component = mean_score(fact_checks).unwrap_or(DEFAULT_FACTCHECK_SCORE);
        let confidence = clamp_unit(0.6 * votes.winner_share() + 0.4 * factcheck_component);

        ConsensusResult {
            final_answer,
            confidence,
            key_points,
            citations,
            style_incognito: true,
            review_score: mean_referee_score(challenges),
        }
    }
}

fn merge_with_alternatives(votes: &VoteSummary) -> String {
    let base = votes.winner.text.trim().to_string();

    let mut extras: Vec<&str> = Vec::new();
    for alt in votes.ranked_outputs.iter().skip(1).take(MAX_ALTERNATIVES) {
        let Some(line) = alt.first_line() else {
            continue;
        };
        if base.contains(line) || extras.contains(&line) {
            continue;
        }
        extras.push(line);
    }

    if extras.is_empty() {
        return base;
    }

    let bullets = extras
        .iter()
        .map(|l| format!("- {}", l))
        .collect::<Vec<_>>()
        .join("\n");
    format!("{}\n\n{}\n{}", base, ALTERNATIVES_HEADING, bullets)
}

fn extract_key_points(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.trim().trim_start_matches("- ").trim())
        .filter(|line| !line.is_empty() && *line != ALTERNATIVES_HEADING)
        .flat_map(split_sentences)
        .map(|sentence| sentence.trim_end_matches(['.', '!', '?']).trim())
        .filter(|sentence| !sentence.is_empty())
        .take(MAX_KEY_POINTS)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ensemble::output::fixtures::output;
    use crate::ensemble::{ModelRoute, RouteParams};
    use crate::prompt::PromptPlan;
    use crate::quorum::challenge;
    use crate::quorum::fact_check::verify;
    use crate::quorum::vote::score;

    fn plan() -> PromptPlan {
        PromptPlan {
            core_prompt: "q".to_string(),
            segments: vec!["q".to_string()],
            competing_variants: vec!["q".to_string()],
        }
    }

    fn builder() -> ConsensusBuilder {
        ConsensusBuilder::new(StyleNormalizer::new(["gpt-4o", "claude-3-5-sonnet", "openrouter"]))
    }

    fn routes() -> Vec<ModelRoute> {
        let p = RouteParams::from_creativity(0.5, 256);
        vec![
            ModelRoute::new("gpt-4o", 0.9, p),
            ModelRoute::new("claude-3-5-sonnet", 0.6, p),
        ]
    }

    #[test]
    fn test_appends_distinct_alternative_first_lines() {
        let outputs = vec![
            output("gpt-4o", "Ensembles average out errors.\nMore detail.", 0.9, 0.9),
            output("claude-3-5-sonnet", "Diversity matters most.\nBody.", 0.6, 0.6),
            output("claude-3-5-sonnet", "Diversity matters most.\nOther body.", 0.6, 0.6),
        ];
        let votes = score(&outputs, &routes(), false).unwrap();
        let result = builder().build(&outputs, &votes, &[], &[]);

        assert!(result.final_answer.starts_with("Ensembles average out errors."));
        assert_eq!(result.final_answer.matches("Diversity matters most.").count(), 1);
        assert!(result.final_answer.contains(ALTERNATIVES_HEADING));
    }

    #[test]
    fn test_final_answer_is_incognito() {
        let outputs = vec![output(
            "gpt-4o",
            "As gpt-4o from OpenAI: use retries. Anthropic models agree.",
            0.9,
            0.9,
        )];
        let votes = score(&outputs, &routes(), false).unwrap();
        let result = builder().build(&outputs, &votes, &[], &[]);

        let lower = result.final_answer.to_lowercase();
        for name in ["gpt-4o", "openai", "anthropic", "claude"] {
            assert!(!lower.contains(name), "leaked {name}");
        }
        assert!(result.style_incognito);
    }

    #[test]
    fn test_key_points_first_three_fragments() {
        let outputs = vec![output("gpt-4o", "One. Two! Three? Four.", 0.9, 0.9)];
        let votes = score(&outputs, &routes(), false).unwrap();
        let result = builder().build(&outputs, &votes, &[], &[]);
        assert_eq!(result.key_points, vec!["One", "Two", "Three"]);
    }

    #[test]
    fn test_key_points_keep_decimal_numbers_whole() {
        let outputs = vec![output(
            "gpt-4o",
            "Pi is about 3.14 in value. It is irrational.\n- Version 2.5 shipped",
            0.9,
            0.9,
        )];
        let votes = score(&outputs, &routes(), false).unwrap();
        let result = builder().build(&outputs, &votes, &[], &[]);
        assert_eq!(
            result.key_points,
            vec!["Pi is about 3.14 in value", "It is irrational", "Version 2.5 shipped"]
        );
    }

    #[test]
    fn test_confidence_without_fact_checks() {
        let outputs = vec![output("gpt-4o", "Only answer.", 0.9, 0.9)];
        let votes = score(&outputs, &routes(), false).unwrap();
        let result = builder().build(&outputs, &votes, &[], &[]);
        // share = 1.0 -> 0.6 + 0.4 * 0.6
        assert!((result.confidence - 0.84).abs() < 1e-9);
        assert_eq!(result.review_score, None);
    }

    #[test]
    fn test_citations_from_fact_checks() {
        let outputs = vec![output("gpt-4o", "It was 1969. According to NASA it worked.", 0.9, 0.9)];
        let votes = score(&outputs, &routes(), false).unwrap();
        let checks = verify(&outputs, &plan());
        let result = builder().build(&outputs, &votes, &[], &checks);

        assert_eq!(result.citations.len(), 2);
        assert_eq!(result.citations[0].source, "ref:claim-1");
        assert_eq!(result.citations[0].span, "It was 1969.");
        assert!(result.citations.iter().all(|c| !c.source.contains("gpt")));
        // share 1.0, mean fact check 0.75
        assert!((result.confidence - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_confidence_bounded_across_vote_splits() {
        for q in [0.0, 0.2, 0.5, 0.8, 1.0] {
            let outputs = vec![
                output("gpt-4o", "It has 3 parts. Fine.", q, q),
                output("claude-3-5-sonnet", "According to docs, yes.", 1.0 - q, 0.5),
                output("unrouted", "Plain words.", 0.5, 0.5),
            ];
            let votes = score(&outputs, &routes(), q > 0.5).unwrap();
            let checks = verify(&outputs, &plan());
            let reviews = challenge::run(&outputs, &plan());
            let none: Vec<FactCheckResult> = Vec::new();
            for fc in [checks.as_slice(), none.as_slice()] {
                let result = builder().build(&outputs, &votes, &reviews, fc);
                assert!((0.0..=1.0).contains(&result.confidence));
                assert!(result.review_score.is_some());
            }
        }
    }

    #[test]
    fn test_scrubs_names_seen_only_in_outputs() {
        let outputs = vec![output("qwen-72b", "qwen-72b says: batch the requests.", 0.9, 0.9)];
        let votes = score(&outputs, &routes(), false).unwrap();
        let result = builder().build(&outputs, &votes, &[], &[]);
        assert!(!result.final_answer.contains("qwen-72b"));
    }
}
