//! Weighted voting over ensemble outputs
//!
//! Each output casts a vote for its backend worth
//! `(0.7·quality + 0.3·factuality) · route_weight`, discounted in JSON mode.
//! Votes accumulate per backend, so several samples from one backend add up.

use crate::core::error::DomainError;
use crate::ensemble::{EnsembleOutput, ModelRoute};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Route weight used when an output's backend has no route (e.g. a substituted
/// fallback)
pub const DEFAULT_ROUTE_WEIGHT: f64 = 0.3;

/// Multiplier applied to every vote in JSON mode
pub const JSON_MODE_FACTOR: f64 = 0.95;

/// Floor for `total_weight` so vote shares never divide by zero
pub const TOTAL_WEIGHT_EPSILON: f64 = 1e-9;

/// Result of a weighted vote
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteSummary {
    /// Top-ranked output (first output of the winning backend)
    pub winner: EnsembleOutput,
    /// Accumulated score per backend
    pub scores: BTreeMap<String, f64>,
    /// Sum of all accumulated scores, floored at [`TOTAL_WEIGHT_EPSILON`]
    pub total_weight: f64,
    /// Outputs ordered by their backend's score, ties in original order
    pub ranked_outputs: Vec<EnsembleOutput>,
}

impl VoteSummary {
    /// Winner's share of the total vote in `[0, 1]`
    pub fn winner_share(&self) -> f64 {
        let winner_score = self
            .scores
            .get(&self.winner.backend_name)
            .copied()
            .unwrap_or(0.0);
        (winner_score / self.total_weight).clamp(0.0, 1.0)
    }
}

/// Weight of a single output's vote
pub fn vote_weight(output: &EnsembleOutput, routes: &[ModelRoute], json_mode: bool) -> f64 {
    let route_weight = routes
        .iter()
        .find(|r| r.backend_name == output.backend_name)
        .map(|r| r.weight)
        .unwrap_or(DEFAULT_ROUTE_WEIGHT);

    let mut weight = (0.7 * output.score_quality + 0.3 * output.score_factuality) * route_weight;
    if json_mode {
        weight *= JSON_MODE_FACTOR;
    }
    weight
}

/// Score outputs and pick a winner.
///
/// Fails with [`DomainError::NoOutputs`] when `outputs` is empty; this is the
/// only condition that aborts a whole request.
pub fn score(
    outputs: &[EnsembleOutput],
    routes: &[ModelRoute],
    json_mode: bool,
) -> Result<VoteSummary, DomainError> {
    if outputs.is_empty() {
        return Err(DomainError::NoOutputs);
    }

    let mut scores: BTreeMap<String, f64> = BTreeMap::new();
    for output in outputs {
        *scores.entry(output.backend_name.clone()).or_insert(0.0) +=
            vote_weight(output, routes, json_mode);
    }

    let score_of = |o: &EnsembleOutput| scores.get(&o.backend_name).copied().unwrap_or(0.0);

    // Stable sort: equal scores keep their original order
    let mut ranked_outputs = outputs.to_vec();
    ranked_outputs.sort_by(|a, b| score_of(b).total_cmp(&score_of(a)));

    let winner = ranked_outputs[0].clone();
    let total_weight = scores.values().sum::<f64>().max(TOTAL_WEIGHT_EPSILON);

    Ok(VoteSummary {
        winner,
        scores,
        total_weight,
        ranked_outputs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ensemble::RouteParams;
    use crate::ensemble::output::fixtures::output;

    fn route(name: &str, weight: f64) -> ModelRoute {
        ModelRoute::new(name, weight, RouteParams::from_creativity(0.5, 256))
    }

    #[test]
    fn test_empty_outputs_fail_deterministically() {
        for _ in 0..3 {
            let err = score(&[], &[], false).unwrap_err();
            assert_eq!(err, DomainError::NoOutputs);
            assert_eq!(err.to_string(), "no outputs");
        }
    }

    #[test]
    fn test_scores_sum_to_total_weight() {
        let outputs = vec![
            output("a", "one", 0.8, 0.7),
            output("b", "two", 0.6, 0.9),
            output("a", "three", 0.7, 0.7),
        ];
        let routes = vec![route("a", 0.9), route("b", 0.5)];
        let summary = score(&outputs, &routes, false).unwrap();

        let sum: f64 = summary.scores.values().sum();
        assert!((sum - summary.total_weight).abs() < 1e-9);
        assert_eq!(summary.scores.len(), 2);
    }

    #[test]
    fn test_samples_accumulate_per_backend() {
        let outputs = vec![
            output("a", "x", 0.5, 0.5),
            output("b", "y", 0.9, 0.9),
            output("a", "z", 0.5, 0.5),
        ];
        let routes = vec![route("a", 0.6), route("b", 0.6)];
        let summary = score(&outputs, &routes, false).unwrap();

        // a: 2 * 0.5 * 0.6 = 0.6, b: 0.9 * 0.6 = 0.54
        assert_eq!(summary.winner.backend_name, "a");
        assert_eq!(summary.winner.text, "x");
        assert!((summary.scores["a"] - 0.6).abs() < 1e-9);
        assert!((summary.scores["b"] - 0.54).abs() < 1e-9);
    }

    #[test]
    fn test_ranked_outputs_stable_on_ties() {
        let outputs = vec![
            output("b", "first b", 0.5, 0.5),
            output("c", "only c", 0.9, 0.9),
            output("b", "second b", 0.5, 0.5),
        ];
        let routes = vec![route("b", 0.5), route("c", 0.5)];
        let summary = score(&outputs, &routes, false).unwrap();

        let texts: Vec<_> = summary.ranked_outputs.iter().map(|o| o.text.as_str()).collect();
        // b: 0.5, c: 0.45
        assert_eq!(texts, vec!["first b", "second b", "only c"]);
    }

    #[test]
    fn test_equal_backend_scores_keep_original_order() {
        let outputs = vec![output("x", "x", 0.5, 0.5), output("y", "y", 0.5, 0.5)];
        let routes = vec![route("x", 0.5), route("y", 0.5)];
        let summary = score(&outputs, &routes, false).unwrap();
        assert_eq!(summary.winner.backend_name, "x");
    }

    #[test]
    fn test_missing_route_uses_default_weight() {
        let o = output("ghost", "boo", 1.0, 1.0);
        assert!((vote_weight(&o, &[], false) - DEFAULT_ROUTE_WEIGHT).abs() < 1e-9);
    }

    #[test]
    fn test_json_mode_discount() {
        let o = output("a", "{}", 1.0, 1.0);
        let routes = vec![route("a", 1.0)];
        assert!((vote_weight(&o, &routes, true) - 0.95).abs() < 1e-9);
    }

    #[test]
    fn test_total_weight_floored() {
        let outputs = vec![output("a", "", 0.0, 0.0)];
        let summary = score(&outputs, &[route("a", 0.5)], false).unwrap();
        assert_eq!(summary.total_weight, TOTAL_WEIGHT_EPSILON);
        assert_eq!(summary.winner_share(), 0.0);
    }

    #[test]
    fn test_winner_share_single_backend() {
        let outputs = vec![output("a", "x", 0.8, 0.8)];
        let summary = score(&outputs, &[route("a", 0.5)], false).unwrap();
        assert!((summary.winner_share() - 1.0).abs() < 1e-9);
    }
}
