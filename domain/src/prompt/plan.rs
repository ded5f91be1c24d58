//! Prompt planning: canonical prompt, segments and competing variants

use crate::equalizer::ExecutionProfile;
use crate::util::split_sentences;
use serde::{Deserialize, Serialize};

/// Queries shorter than this (in chars) are kept as a single segment
pub const SHORT_QUERY_CHARS: usize = 120;

/// A segment bucket is emitted once it grows past this many chars
pub const SEGMENT_TARGET_CHARS: usize = 200;

const JSON_MODE_INSTRUCTION: &str = "Respond only with a single valid JSON object.";

/// Instructional prefixes, each gated by a minimum creativity boost.
/// Variants stack these cumulatively in order.
const VARIANT_PREFIXES: &[(f64, &str)] = &[
    (
        0.2,
        "Use a structured approach: outline the key steps before answering.",
    ),
    (
        0.5,
        "Consider alternative interpretations and approaches before settling on an answer.",
    ),
    (
        0.8,
        "Develop two contrasting hypotheses, weigh them, then commit to the stronger one.",
    ),
];

/// The request-scoped plan every downstream stage works from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptPlan {
    /// Canonical prompt sent to backends
    pub core_prompt: String,
    /// Ordered query segments
    pub segments: Vec<String>,
    /// Competing prompt variants for self-consistency sampling; index 0 is the
    /// unmodified core prompt
    pub competing_variants: Vec<String>,
}

impl PromptPlan {
    /// Variant for the `n`th sample, wrapping round-robin
    pub fn variant(&self, n: usize) -> &str {
        if self.competing_variants.is_empty() {
            return &self.core_prompt;
        }
        &self.competing_variants[n % self.competing_variants.len()]
    }
}

/// Build a prompt plan from a raw query. Pure and idempotent.
pub fn optimize(query: &str, profile: &ExecutionProfile) -> PromptPlan {
    let trimmed = query.trim();

    let core_prompt = if profile.json_mode {
        format!("{}\n\n{}", trimmed, JSON_MODE_INSTRUCTION)
    } else {
        trimmed.to_string()
    };

    let segments = segment(trimmed);
    let competing_variants = build_variants(&core_prompt, profile);

    PromptPlan {
        core_prompt,
        segments,
        competing_variants,
    }
}

/// Remove the planner's own instruction lines, leaving the user's question
pub fn strip_instructions(prompt: &str) -> String {
    prompt
        .lines()
        .filter(|line| {
            let line = line.trim();
            line != JSON_MODE_INSTRUCTION && !VARIANT_PREFIXES.iter().any(|(_, p)| *p == line)
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn segment(trimmed: &str) -> Vec<String> {
    if trimmed.chars().count() < SHORT_QUERY_CHARS {
        return vec![trimmed.to_string()];
    }

    let mut segments = Vec::new();
    let mut bucket = String::new();

    for sentence in split_sentences(trimmed) {
        if !bucket.is_empty() {
            bucket.push(' ');
        }
        bucket.push_str(sentence);

        if bucket.chars().count() > SEGMENT_TARGET_CHARS {
            segments.push(std::mem::take(&mut bucket));
        }
    }

    if !bucket.is_empty() {
        segments.push(bucket);
    }
    segments
}

fn build_variants(core_prompt: &str, profile: &ExecutionProfile) -> Vec<String> {
    let mut variants = vec![core_prompt.to_string()];
    let mut stacked: Vec<&str> = Vec::new();

    for &(threshold, prefix) in VARIANT_PREFIXES {
        if profile.creativity_boost > threshold {
            stacked.push(prefix);
            variants.push(format!("{}\n\n{}", stacked.join("\n"), core_prompt));
        }
    }

    variants.truncate(profile.num_samples.max(1));
    variants
}
