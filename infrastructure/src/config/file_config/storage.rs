//! Persistence-related sections: `[scorecard]`, `[analytics]`, `[sanitizer]`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Scorecard store settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileScorecardConfig {
    /// JSON snapshot loaded at startup and saved after each run
    pub snapshot_path: Option<PathBuf>,
    /// Interaction log capacity (oldest evicted first)
    pub max_interactions: usize,
}

impl Default for FileScorecardConfig {
    fn default() -> Self {
        Self {
            snapshot_path: None,
            max_interactions: 500,
        }
    }
}

/// Analytics sink settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAnalyticsConfig {
    /// Append one JSON line per interaction here
    pub jsonl_path: Option<PathBuf>,
}

/// Output sanitizer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSanitizerConfig {
    pub enabled: bool,
    /// Redact e-mail addresses, phone numbers, SSN- and card-like numbers
    pub redact_pii: bool,
}

impl Default for FileSanitizerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            redact_pii: true,
        }
    }
}
