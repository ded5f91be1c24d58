//! Outputs gathered from the ensemble

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One generation from one (route × sample) unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleOutput {
    /// Backend that produced the text
    pub backend_name: String,
    pub text: String,
    pub tokens: u64,
    pub latency_ms: f64,
    pub cost_usd: f64,
    /// Heuristic quality score in `[0, 1]`
    pub score_quality: f64,
    /// Heuristic factuality score in `[0, 1]`
    pub score_factuality: f64,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl EnsembleOutput {
    /// First non-empty line of the text, trimmed
    pub fn first_line(&self) -> Option<&str> {
        self.text.lines().map(str::trim).find(|l| !l.is_empty())
    }
}
