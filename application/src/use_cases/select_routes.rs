//! Route selection
//!
//! Ranks candidate backends for a plan and attaches, to each, the providers
//! currently within SLA for that exact model.

use super::failover::ProviderHealthMonitor;
use crate::config::OrchestratorConfig;
use chorus_domain::util::contains_ignore_ascii_case;
use chorus_domain::{
    BackendProfile, Capability, ExecutionProfile, ModelRoute, PromptPlan, RouteParams, Scorecard,
};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Base weight before scorecard history is added
pub const BASE_WEIGHT: f64 = 0.5;

/// Penalty for local/offline backends when fact-checking is on
pub const LOCAL_FACTCHECK_PENALTY: f64 = 0.05;

/// Bonus per capability whose keywords appear in the prompt
pub const KEYWORD_BONUS: f64 = 0.1;

/// Weight of the single route returned when no candidate survives
pub const FALLBACK_ROUTE_WEIGHT: f64 = 0.5;

pub struct Router {
    config: OrchestratorConfig,
}

impl Router {
    pub fn new(config: OrchestratorConfig) -> Self {
        Self { config }
    }

    /// Select up to `profile.num_models` routes, best first. Never empty.
    ///
    /// `scorecards` is a snapshot taken before routing; the router never
    /// touches the store itself.
    pub fn select_models(
        &self,
        plan: &PromptPlan,
        profile: &ExecutionProfile,
        scorecards: &[Scorecard],
        health: &ProviderHealthMonitor,
    ) -> Vec<ModelRoute> {
        let params = RouteParams::from_creativity(profile.creativity_boost, profile.max_tokens);
        let history: HashMap<&str, &Scorecard> = scorecards
            .iter()
            .map(|c| (c.backend_name.as_str(), c))
            .collect();

        let mut routes: Vec<ModelRoute> = Vec::new();
        for candidate in self.candidates(scorecards) {
            let providers = health
                .healthy_providers(&self.config.equivalence.providers_for(&candidate.name));
            if providers.is_empty() {
                warn!("No healthy provider for {}, skipping", candidate.name);
                continue;
            }

            let avg_quality = history
                .get(candidate.name.as_str())
                .map(|c| c.avg_quality)
                .unwrap_or(0.0);
            let weight = candidate_weight(&candidate, avg_quality, plan, profile);
            debug!(
                "Candidate {} weight {:.3} via {:?}",
                candidate.name, weight, providers
            );
            routes.push(ModelRoute::new(candidate.name, weight, params).with_providers(providers));
        }

        routes.sort_by(|a, b| b.weight.total_cmp(&a.weight));
        routes.truncate(profile.num_models);

        if routes.is_empty() {
            warn!(
                "No candidate routes, using fallback {}",
                self.config.fallback_backend
            );
            let providers = self
                .config
                .equivalence
                .providers_for(&self.config.fallback_backend);
            routes.push(
                ModelRoute::new(&self.config.fallback_backend, FALLBACK_ROUTE_WEIGHT, params)
                    .with_providers(providers),
            );
        }
        routes
    }

    /// Configured defaults followed by every backend seen in the scorecards
    fn candidates(&self, scorecards: &[Scorecard]) -> Vec<BackendProfile> {
        let mut candidates = self.config.candidates.clone();
        for card in scorecards {
            if !candidates.iter().any(|c| c.name == card.backend_name) {
                candidates.push(BackendProfile::unknown(&card.backend_name));
            }
        }
        candidates
    }
}

fn candidate_weight(
    candidate: &BackendProfile,
    avg_quality: f64,
    plan: &PromptPlan,
    profile: &ExecutionProfile,
) -> f64 {
    let mut weight = BASE_WEIGHT + avg_quality;
    if profile.factcheck_enabled && candidate.is_local() {
        weight -= LOCAL_FACTCHECK_PENALTY;
    }
    for capability in [Capability::Code, Capability::Reasoning, Capability::Creative] {
        if candidate.has(capability)
            && capability
                .keywords()
                .iter()
                .any(|k| contains_ignore_ascii_case(&plan.core_prompt, k))
        {
            weight += KEYWORD_BONUS;
        }
    }
    weight
}
