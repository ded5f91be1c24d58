//! Orchestrator configuration: routing and reliability policy.

use chorus_domain::{
    BackendProfile, EquivalenceTable, LOCAL_FALLBACK_BACKEND, LOCAL_PROVIDER, SlaPolicy,
};

/// Static routing and reliability parameters for the orchestrator.
///
/// Built by the infrastructure config loader; defaults describe a working
/// offline setup.
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorConfig {
    /// Fixed candidate backends (merged with every backend seen in scorecards)
    pub candidates: Vec<BackendProfile>,
    /// Backend used when no candidate survives selection
    pub fallback_backend: String,
    /// Canonical model → providers serving it, in failover priority
    pub equivalence: EquivalenceTable,
    /// SLA policy for the provider health window
    pub sla: SlaPolicy,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            candidates: BackendProfile::default_candidates(),
            fallback_backend: LOCAL_FALLBACK_BACKEND.to_string(),
            equivalence: EquivalenceTable::default(),
            sla: SlaPolicy::default(),
        }
    }
}

impl OrchestratorConfig {
    pub fn with_candidates(mut self, candidates: Vec<BackendProfile>) -> Self {
        self.candidates = candidates;
        self
    }

    pub fn with_fallback_backend(mut self, name: impl Into<String>) -> Self {
        self.fallback_backend = name.into();
        self
    }

    pub fn with_equivalence(mut self, equivalence: EquivalenceTable) -> Self {
        self.equivalence = equivalence;
        self
    }

    pub fn with_sla(mut self, sla: SlaPolicy) -> Self {
        self.sla = sla;
        self
    }

    /// Every backend and provider name the incognito pass must scrub.
    /// The generic local provider name is a plain word and is left alone.
    pub fn identity_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .candidates
            .iter()
            .map(|c| c.name.clone())
            .chain(self.equivalence.models().map(str::to_string))
            .chain(self.equivalence.all_providers())
            .chain(std::iter::once(self.fallback_backend.clone()))
            .filter(|n| n != LOCAL_PROVIDER)
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.candidates.len(), 5);
        assert_eq!(config.fallback_backend, LOCAL_FALLBACK_BACKEND);
        assert_eq!(config.sla.error_threshold, 3);
    }

    #[test]
    fn test_identity_names_cover_models_and_providers() {
        let names = OrchestratorConfig::default().identity_names();
        for expected in ["gpt-4o", "openrouter", "azure-openai", LOCAL_FALLBACK_BACKEND] {
            assert!(names.iter().any(|n| n == expected), "missing {expected}");
        }
        assert!(!names.iter().any(|n| n == LOCAL_PROVIDER));
    }

    #[test]
    fn test_builder_methods() {
        let config = OrchestratorConfig::default()
            .with_candidates(vec![])
            .with_fallback_backend("tiny-local");
        assert!(config.candidates.is_empty());
        assert_eq!(config.fallback_backend, "tiny-local");
    }
}
