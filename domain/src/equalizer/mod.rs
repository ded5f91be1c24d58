//! Equalizer: user sliders to execution depth
//!
//! Four sliders (accuracy, speed, creativity, cost) plus a couple of flags are
//! mapped to an [`ExecutionProfile`]. Every stage after the equalizer consumes
//! only the profile, never the raw sliders.
//!
//! ```text
//! accuracy ──┐                     ┌── num_models        (1..=4)
//! speed    ──┤                     ├── num_samples       (1..=5)
//! creativity ┼──▶ map_options() ──▶├── challenge_rounds  (0 | 1)
//! cost     ──┘                     ├── factcheck_enabled
//!                                  └── creativity_boost, max_tokens, json_mode
//! ```

use serde::{Deserialize, Serialize};

pub const MIN_MODELS: usize = 1;
pub const MAX_MODELS: usize = 4;
pub const MIN_SAMPLES: usize = 1;
pub const MAX_SAMPLES: usize = 5;

/// Raw slider positions, each expected in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sliders {
    pub accuracy: f64,
    pub speed: f64,
    pub creativity: f64,
    pub cost: f64,
}

impl Default for Sliders {
    fn default() -> Self {
        Self {
            accuracy: 0.5,
            speed: 0.5,
            creativity: 0.5,
            cost: 0.5,
        }
    }
}

/// How deep a single request runs (immutable, one per request)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionProfile {
    pub num_models: usize,
    pub num_samples: usize,
    pub challenge_rounds: u8,
    pub factcheck_enabled: bool,
    pub creativity_boost: f64,
    pub max_tokens: u32,
    pub json_mode: bool,
}

impl ExecutionProfile {
    pub fn challenge_enabled(&self) -> bool {
        self.challenge_rounds > 0
    }
}

/// Map sliders and flags to an execution profile.
///
/// Deterministic and infallible. Out-of-range sliders are tolerated; the
/// count clamps keep the profile valid regardless.
pub fn map_options(sliders: Sliders, max_tokens: u32, json_mode: bool) -> ExecutionProfile {
    let Sliders {
        accuracy,
        speed,
        creativity,
        cost,
    } = sliders;

    let mut num_models = clamp_count(1.0 + 3.0 * accuracy - speed, MIN_MODELS, MAX_MODELS);
    let mut num_samples = clamp_count(
        1.0 + 2.0 * accuracy + 2.0 * creativity,
        MIN_SAMPLES,
        MAX_SAMPLES,
    );
    let mut challenge_rounds = u8::from(accuracy > 0.6 && cost > 0.2);
    let mut factcheck_enabled = accuracy >= 0.5;

    if speed > 0.7 {
        challenge_rounds = 0;
        num_samples = num_samples.saturating_sub(1).max(MIN_SAMPLES);
    }

    if cost < 0.3 {
        factcheck_enabled = false;
        num_models = num_models.saturating_sub(1).max(MIN_MODELS);
    }

    ExecutionProfile {
        num_models,
        num_samples,
        challenge_rounds,
        factcheck_enabled,
        creativity_boost: creativity,
        max_tokens,
        json_mode,
    }
}

fn clamp_count(raw: f64, min: usize, max: usize) -> usize {
    if raw.is_nan() {
        return min;
    }
    let rounded = raw.round_ties_even();
    if rounded <= min as f64 {
        min
    } else if rounded >= max as f64 {
        max
    } else {
        rounded as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sliders(accuracy: f64, speed: f64, creativity: f64, cost: f64) -> Sliders {
        Sliders {
            accuracy,
            speed,
            creativity,
            cost,
        }
    }

    #[test]
    fn test_profile_bounds_over_slider_grid() {
        let steps = [0.0, 0.1, 0.25, 0.5, 0.6, 0.71, 0.9, 1.0];
        for &a in &steps {
            for &s in &steps {
                for &c in &steps {
                    for &k in &steps {
                        let p = map_options(sliders(a, s, c, k), 512, false);
                        assert!((MIN_MODELS..=MAX_MODELS).contains(&p.num_models));
                        assert!((MIN_SAMPLES..=MAX_SAMPLES).contains(&p.num_samples));
                        assert!(p.challenge_rounds <= 1);
                        if s > 0.7 {
                            assert_eq!(p.challenge_rounds, 0);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_balanced_defaults() {
        let p = map_options(Sliders::default(), 512, false);
        // 1 + 1.5 - 0.5 = 2.0
        assert_eq!(p.num_models, 2);
        // 1 + 1 + 1 = 3.0
        assert_eq!(p.num_samples, 3);
        assert_eq!(p.challenge_rounds, 0);
        assert!(p.factcheck_enabled);
        assert_eq!(p.creativity_boost, 0.5);
    }

    #[test]
    fn test_high_accuracy_enables_challenge() {
        let p = map_options(sliders(0.9, 0.2, 0.3, 0.8), 800, false);
        assert_eq!(p.challenge_rounds, 1);
        assert!(p.factcheck_enabled);
        assert_eq!(p.num_models, 4);
    }

    #[test]
    fn test_speed_overrides_challenge_and_samples() {
        let slow = map_options(sliders(0.9, 0.5, 0.5, 0.8), 512, false);
        let fast = map_options(sliders(0.9, 0.8, 0.5, 0.8), 512, false);
        assert_eq!(slow.challenge_rounds, 1);
        assert_eq!(fast.challenge_rounds, 0);
        assert!(fast.num_samples < slow.num_samples);
    }

    #[test]
    fn test_cost_flips_factcheck_and_models() {
        let cheap = map_options(sliders(0.6, 0.4, 0.5, 0.1), 512, false);
        let rich = map_options(sliders(0.6, 0.4, 0.5, 0.9), 512, false);
        assert!(!cheap.factcheck_enabled);
        assert!(rich.factcheck_enabled);
        assert!(rich.num_models >= cheap.num_models + 1);
    }

    #[test]
    fn test_cost_penalty_floors_at_one_model() {
        let p = map_options(sliders(0.0, 1.0, 0.0, 0.0), 512, false);
        assert_eq!(p.num_models, 1);
        assert_eq!(p.num_samples, 1);
    }

    #[test]
    fn test_passthrough_fields() {
        let p = map_options(sliders(0.5, 0.5, 0.77, 0.5), 2048, true);
        assert_eq!(p.creativity_boost, 0.77);
        assert_eq!(p.max_tokens, 2048);
        assert!(p.json_mode);
    }

    #[test]
    fn test_rounding_is_half_to_even() {
        assert_eq!(clamp_count(2.5, 1, 4), 2);
        assert_eq!(clamp_count(3.5, 1, 4), 4);
        assert_eq!(clamp_count(-3.0, 1, 4), 1);
        assert_eq!(clamp_count(f64::NAN, 1, 4), 1);
    }
}
