//! Output scoring
//!
//! There is no ground truth at generation time, so scores come from cheap
//! heuristics. They sit behind [`OutputScorer`] so a real scorer can replace
//! them without touching voting or consensus.

use super::route::ModelRoute;
use crate::util::clamp_unit;

/// Scores a single generation against the route that produced it
pub trait OutputScorer: Send + Sync {
    /// Quality in `[0, 1]`
    fn quality(&self, text: &str, route: &ModelRoute) -> f64;

    /// Factuality in `[0, 1]`
    fn factuality(&self, text: &str, route: &ModelRoute) -> f64;
}

/// Length- and weight-based heuristic scorer
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicScorer;

impl OutputScorer for HeuristicScorer {
    fn quality(&self, text: &str, route: &ModelRoute) -> f64 {
        let length_bonus = (text.chars().count() as f64 / 1000.0).min(0.1);
        clamp_unit(0.55 + 0.3 * route.weight + length_bonus)
    }

    fn factuality(&self, _text: &str, route: &ModelRoute) -> f64 {
        clamp_unit(0.6 + 0.2 * route.weight - 0.05 * route.params.temperature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ensemble::route::RouteParams;

    fn route(weight: f64, temperature: f64) -> ModelRoute {
        ModelRoute::new(
            "b",
            weight,
            RouteParams {
                temperature,
                top_p: 0.9,
                max_tokens: 256,
            },
        )
    }

    #[test]
    fn test_quality_length_bonus_capped() {
        let r = route(0.5, 0.5);
        let short = HeuristicScorer.quality("hi", &r);
        let long = HeuristicScorer.quality(&"x".repeat(5000), &r);
        assert!((short - (0.55 + 0.15 + 0.002)).abs() < 1e-9);
        assert!((long - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_quality_clamped() {
        let r = route(1.0, 0.5);
        assert!(HeuristicScorer.quality(&"x".repeat(5000), &r) <= 1.0);
    }

    #[test]
    fn test_factuality_penalises_temperature() {
        let cold = HeuristicScorer.factuality("", &route(0.5, 0.1));
        let hot = HeuristicScorer.factuality("", &route(0.5, 1.0));
        assert!(cold > hot);
        assert!((cold - (0.6 + 0.1 - 0.005)).abs() < 1e-9);
    }
}
