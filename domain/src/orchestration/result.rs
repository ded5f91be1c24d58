//! Pipeline result returned to the transport layer

use crate::quorum::Citation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Costs {
    pub usd: f64,
    pub tokens: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestrationResult {
    pub final_answer: String,
    pub confidence: f64,
    pub key_points: Vec<String>,
    pub citations: Vec<Citation>,
    pub costs: Costs,
    /// Milliseconds per stage plus `"total"`
    pub timings: BTreeMap<String, f64>,
}
