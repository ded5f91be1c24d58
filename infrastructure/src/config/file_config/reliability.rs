//! Reliability configuration from TOML (`[reliability]` section)

use chorus_domain::{EquivalenceTable, SlaPolicy};
use serde::{Deserialize, Serialize};

/// SLA window and provider equivalence
///
/// # Example
///
/// ```toml
/// [reliability]
/// window_seconds = 120
/// max_p95_latency_ms = 8000
/// error_threshold = 3
///
/// [reliability.equivalence]
/// "gpt-4o" = ["openai", "azure-openai", "openrouter"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileReliabilityConfig {
    pub window_seconds: u64,
    pub max_p95_latency_ms: f64,
    pub error_threshold: usize,
    /// Canonical model → providers serving it, primary first
    pub equivalence: EquivalenceTable,
}

impl Default for FileReliabilityConfig {
    fn default() -> Self {
        let sla = SlaPolicy::default();
        Self {
            window_seconds: sla.window_seconds,
            max_p95_latency_ms: sla.max_p95_latency_ms,
            error_threshold: sla.error_threshold,
            equivalence: EquivalenceTable::default(),
        }
    }
}

impl FileReliabilityConfig {
    pub fn sla_policy(&self) -> SlaPolicy {
        SlaPolicy {
            window_seconds: self.window_seconds,
            max_p95_latency_ms: self.max_p95_latency_ms,
            error_threshold: self.error_threshold,
        }
    }
}
