//! Candidate backend configuration from TOML (`[router]` section)

use chorus_domain::{
    BackendProfile, Capability, ConfigIssue, ConfigIssueCode, LOCAL_FALLBACK_BACKEND,
};
use serde::{Deserialize, Serialize};

/// One candidate backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileCandidateConfig {
    pub name: String,
    #[serde(default)]
    pub capabilities: Vec<String>,
}

/// Router configuration from TOML
///
/// # Example
///
/// ```toml
/// [router]
/// fallback = "local-fallback"
///
/// [[router.candidates]]
/// name = "gpt-4o"
/// capabilities = ["code", "reasoning"]
///
/// [[router.candidates]]
/// name = "llama-3-8b-local"
/// capabilities = ["offline"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRouterConfig {
    /// Fixed candidate set (replaces the built-in defaults when given)
    pub candidates: Vec<FileCandidateConfig>,
    /// Backend used when no candidate survives selection
    pub fallback: String,
}

impl Default for FileRouterConfig {
    fn default() -> Self {
        Self {
            candidates: BackendProfile::default_candidates()
                .into_iter()
                .map(|p| FileCandidateConfig {
                    capabilities: p.capabilities.iter().map(|c| c.as_str().to_string()).collect(),
                    name: p.name,
                })
                .collect(),
            fallback: LOCAL_FALLBACK_BACKEND.to_string(),
        }
    }
}

impl FileRouterConfig {
    /// Parse candidates, collecting issues for unknown capability tags.
    /// Unknown tags are dropped; the candidate itself is kept.
    pub fn parse_candidates(&self) -> (Vec<BackendProfile>, Vec<ConfigIssue>) {
        let mut issues = Vec::new();
        let mut profiles = Vec::new();

        for candidate in &self.candidates {
            let mut capabilities = Vec::new();
            for raw in &candidate.capabilities {
                match raw.parse::<Capability>() {
                    Ok(c) => capabilities.push(c),
                    Err(e) => issues.push(ConfigIssue::warning(
                        ConfigIssueCode::UnknownCapability {
                            backend: candidate.name.clone(),
                            value: raw.clone(),
                        },
                        format!("router.candidates.{}: {}", candidate.name, e),
                    )),
                }
            }
            profiles.push(BackendProfile::new(candidate.name.clone(), capabilities));
        }

        (profiles, issues)
    }
}
