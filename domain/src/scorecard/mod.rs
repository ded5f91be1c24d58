//! Per-backend running performance averages
//!
//! A [`ScorecardBook`] keeps running sums per backend and derives averaged
//! [`Scorecard`] views on demand. The sums (not the averages) are what gets
//! persisted, so accumulation stays exact across restarts.

use crate::ensemble::EnsembleOutput;
use crate::equalizer::ExecutionProfile;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Averaged view of one backend's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scorecard {
    pub backend_name: String,
    pub task_count: u64,
    pub avg_quality: f64,
    pub avg_factuality: f64,
    pub avg_latency_ms: f64,
    pub avg_cost_usd: f64,
}

/// Running sums for one backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScorecardAccumulator {
    pub task_count: u64,
    pub sum_quality: f64,
    pub sum_factuality: f64,
    pub sum_latency_ms: f64,
    pub sum_cost_usd: f64,
}

impl ScorecardAccumulator {
    pub fn add(&mut self, output: &EnsembleOutput) {
        self.task_count += 1;
        self.sum_quality += output.score_quality;
        self.sum_factuality += output.score_factuality;
        self.sum_latency_ms += output.latency_ms;
        self.sum_cost_usd += output.cost_usd;
    }

    pub fn to_scorecard(&self, backend_name: &str) -> Scorecard {
        let n = self.task_count.max(1) as f64;
        Scorecard {
            backend_name: backend_name.to_string(),
            task_count: self.task_count,
            avg_quality: self.sum_quality / n,
            avg_factuality: self.sum_factuality / n,
            avg_latency_ms: self.sum_latency_ms / n,
            avg_cost_usd: self.sum_cost_usd / n,
        }
    }
}

/// One completed request, as recorded after consensus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub query: String,
    pub profile: ExecutionProfile,
    pub outputs: Vec<EnsembleOutput>,
    pub confidence: f64,
    pub cost_usd: f64,
    pub tokens: u64,
}

/// Running sums keyed by backend name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScorecardBook {
    backends: BTreeMap<String, ScorecardAccumulator>,
}

impl ScorecardBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold every output of an interaction into its backend's sums
    pub fn record(&mut self, outputs: &[EnsembleOutput]) {
        for output in outputs {
            self.backends
                .entry(output.backend_name.clone())
                .or_default()
                .add(output);
        }
    }

    pub fn get(&self, backend_name: &str) -> Option<Scorecard> {
        self.backends
            .get(backend_name)
            .map(|acc| acc.to_scorecard(backend_name))
    }

    /// Averaged views, sorted descending by average quality (ties by name)
    pub fn scorecards(&self) -> Vec<Scorecard> {
        let mut cards: Vec<Scorecard> = self
            .backends
            .iter()
            .map(|(name, acc)| acc.to_scorecard(name))
            .collect();
        cards.sort_by(|a, b| b.avg_quality.total_cmp(&a.avg_quality));
        cards
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}
