//! Challenge round: heuristic critique and referee score per output

use crate::ensemble::EnsembleOutput;
use crate::prompt::PromptPlan;
use crate::util::clamp_unit;
use serde::{Deserialize, Serialize};

/// Answers shorter than this (in chars) are asked to elaborate
pub const ELABORATE_BELOW_CHARS: usize = 120;

/// Critique and referee score for one output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeFeedback {
    pub backend_name: String,
    pub critique: String,
    pub referee_score: f64,
}

/// Run one challenge round over `outputs`. No side effects.
pub fn run(outputs: &[EnsembleOutput], plan: &PromptPlan) -> Vec<ChallengeFeedback> {
    outputs
        .iter()
        .map(|output| ChallengeFeedback {
            backend_name: output.backend_name.clone(),
            critique: critique(output, plan),
            referee_score: clamp_unit(
                output.score_quality - 0.05 + 0.5 * output.score_factuality,
            ),
        })
        .collect()
}

fn critique(output: &EnsembleOutput, plan: &PromptPlan) -> String {
    let mut points = vec!["Support each claim with evidence or a source."];
    if plan.segments.len() > 1 {
        points.push("Address each segment of the question explicitly.");
    }
    if output.text.trim().chars().count() < ELABORATE_BELOW_CHARS {
        points.push("Elaborate: the answer is too brief to be convincing.");
    }
    points
        .iter()
        .map(|p| format!("- {}", p))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Mean referee score, if any feedback exists
pub fn mean_referee_score(feedback: &[ChallengeFeedback]) -> Option<f64> {
    if feedback.is_empty() {
        return None;
    }
    Some(feedback.iter().map(|f| f.referee_score).sum::<f64>() / feedback.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ensemble::output::fixtures::output;

    fn plan(segments: usize) -> PromptPlan {
        PromptPlan {
            core_prompt: "q".to_string(),
            segments: (0..segments).map(|i| format!("segment {}", i)).collect(),
            competing_variants: vec!["q".to_string()],
        }
    }

    #[test]
    fn test_short_single_segment_critique() {
        let fb = run(&[output("a", "short", 0.8, 0.7)], &plan(1));
        assert_eq!(fb.len(), 1);
        assert!(fb[0].critique.contains("Support each claim"));
        assert!(fb[0].critique.contains("Elaborate"));
        assert!(!fb[0].critique.contains("segment"));
    }

    #[test]
    fn test_multi_segment_long_answer() {
        let text = "word ".repeat(60);
        let fb = run(&[output("a", &text, 0.8, 0.7)], &plan(3));
        assert!(fb[0].critique.contains("Address each segment"));
        assert!(!fb[0].critique.contains("Elaborate"));
    }

    #[test]
    fn test_referee_score_formula_and_clamp() {
        let fb = run(
            &[output("a", "x", 0.6, 0.4), output("b", "y", 0.9, 0.9)],
            &plan(1),
        );
        assert!((fb[0].referee_score - 0.75).abs() < 1e-9);
        assert_eq!(fb[1].referee_score, 1.0);
    }

    #[test]
    fn test_mean_referee_score() {
        assert_eq!(mean_referee_score(&[]), None);
        let fb = run(&[output("a", "x", 0.6, 0.4)], &plan(1));
        assert!((mean_referee_score(&fb).unwrap() - 0.75).abs() < 1e-9);
    }
}
