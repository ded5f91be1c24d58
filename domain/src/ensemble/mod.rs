//! Ensemble value objects
//!
//! - [`ModelRoute`]: weighted backend selection with sampling params
//! - [`EnsembleOutput`]: one scored generation per (route × sample)
//! - [`OutputScorer`]: narrow scoring seam, [`HeuristicScorer`] by default

pub mod output;
pub mod route;
pub mod scoring;

pub use output::EnsembleOutput;
pub use route::{ModelRoute, RouteParams, clamp_weight};
pub use scoring::{HeuristicScorer, OutputScorer};
