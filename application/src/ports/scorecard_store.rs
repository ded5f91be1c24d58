//! Scorecard store port
//!
//! The only state shared across requests. Implementations must serialize
//! mutation so that concurrent writers never interleave partial updates for
//! the same backend.

use chorus_domain::{InteractionRecord, Scorecard};

pub trait ScorecardStore: Send + Sync {
    /// Append the interaction and fold each of its outputs into its backend's sums
    fn record_interaction(&self, record: &InteractionRecord);

    /// Averaged per-backend views, sorted descending by average quality
    fn get_scorecards(&self) -> Vec<Scorecard>;
}
