//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod output;
mod providers;
mod reliability;
mod router;
mod storage;

pub use output::FileOutputConfig;
pub use providers::{FileProviderConfig, KIND_COMMAND, KIND_LOCAL, default_providers};
pub use reliability::FileReliabilityConfig;
pub use router::{FileCandidateConfig, FileRouterConfig};
pub use storage::{FileAnalyticsConfig, FileSanitizerConfig, FileScorecardConfig};

use chorus_application::OrchestratorConfig;
use chorus_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Candidate backends and fallback
    pub router: FileRouterConfig,
    /// SLA window and provider equivalence
    pub reliability: FileReliabilityConfig,
    /// Provider adapters by name
    pub providers: BTreeMap<String, FileProviderConfig>,
    /// Scorecard persistence
    pub scorecard: FileScorecardConfig,
    /// Analytics sink
    pub analytics: FileAnalyticsConfig,
    /// Output sanitizer
    pub sanitizer: FileSanitizerConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            router: FileRouterConfig::default(),
            reliability: FileReliabilityConfig::default(),
            providers: default_providers(),
            scorecard: FileScorecardConfig::default(),
            analytics: FileAnalyticsConfig::default(),
            sanitizer: FileSanitizerConfig::default(),
            output: FileOutputConfig::default(),
        }
    }
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Checks:
    /// 1. Unknown capability tags on candidates
    /// 2. Provider definitions (kind, command)
    /// 3. Equivalence rows naming undefined providers
    /// 4. A zero SLA error threshold
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        // 1. Candidates
        issues.extend(self.router.parse_candidates().1);

        // 2. Providers
        for (name, provider) in &self.providers {
            match provider.kind.as_str() {
                KIND_LOCAL => {}
                KIND_COMMAND => {
                    let empty = provider
                        .command
                        .as_deref()
                        .is_none_or(|c| c.trim().is_empty());
                    if empty {
                        issues.push(ConfigIssue::error(
                            ConfigIssueCode::EmptyProviderCommand {
                                provider: name.clone(),
                            },
                            format!("providers.{}: command cannot be empty", name),
                        ));
                    }
                }
                other => issues.push(ConfigIssue::error(
                    ConfigIssueCode::UnknownProviderKind {
                        provider: name.clone(),
                        kind: other.to_string(),
                    },
                    format!(
                        "providers.{}: unknown kind '{}' (expected 'local' or 'command')",
                        name, other
                    ),
                )),
            }
        }

        // 3. Equivalence rows
        let equivalence = &self.reliability.equivalence;
        for model in equivalence.models() {
            for provider in equivalence.providers_for(model) {
                if !self.providers.contains_key(&provider) {
                    issues.push(ConfigIssue::warning(
                        ConfigIssueCode::UndefinedProvider {
                            model: model.to_string(),
                            provider: provider.clone(),
                        },
                        format!(
                            "reliability.equivalence.{}: provider '{}' is not defined, calls will fall back",
                            model, provider
                        ),
                    ));
                }
            }
        }

        // 4. SLA threshold
        if self.reliability.error_threshold == 0 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::ZeroErrorThreshold,
                "reliability.error_threshold is 0: error-based provider exclusion is disabled",
            ));
        }

        issues
    }

    /// Routing and reliability settings for the orchestrator
    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig::default()
            .with_candidates(self.router.parse_candidates().0)
            .with_fallback_backend(self.router.fallback.clone())
            .with_equivalence(self.reliability.equivalence.clone())
            .with_sla(self.reliability.sla_policy())
    }
}
