//! Orchestrate use case
//!
//! Runs one request through the fixed stage sequence:
//!
//! ```text
//! Equalizer → Planner → Router → Ensemble → Voting
//!     → [Challenge] → [FactCheck] → Consensus → Scorecard
//! ```
//!
//! Each stage is timed on its own; the reported total is the sum of the stage
//! timings. Voting on zero outputs is the only hard stop after validation.

use super::failover::{FailoverDispatcher, ProviderHealthMonitor};
use super::run_ensemble::{EnsembleError, EnsembleRunner};
use super::select_routes::Router;
use crate::config::OrchestratorConfig;
use crate::ports::analytics::{AnalyticsEvent, AnalyticsSink, NoAnalytics};
use crate::ports::backend_adapter::AdapterRegistry;
use crate::ports::progress::{NoProgress, StageProgress};
use crate::ports::sanitizer::{OutputSanitizer, PassthroughSanitizer};
use crate::ports::scorecard_store::ScorecardStore;
use chorus_domain::quorum::{challenge, fact_check, vote};
use chorus_domain::{
    ConsensusBuilder, ConsensusResult, Costs, DomainError, EnsembleOutput, InteractionRecord,
    LOCAL_PROVIDER, OrchestrateRequest, OrchestrationResult, OutputScorer, RequestOptions, Stage,
    StageTimings, StyleNormalizer, map_options, optimize,
};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur during orchestration
#[derive(Error, Debug)]
pub enum OrchestrateError {
    #[error("Invalid request: {0}")]
    InvalidRequest(DomainError),

    #[error("Ensemble failed: {0}")]
    Ensemble(#[from] EnsembleError),

    #[error("Voting failed: {0}")]
    Voting(DomainError),
}

/// Use case running the full pipeline for one request
pub struct Orchestrator {
    router: Router,
    runner: EnsembleRunner,
    health: Arc<ProviderHealthMonitor>,
    consensus: ConsensusBuilder,
    scorecards: Arc<dyn ScorecardStore>,
    analytics: Arc<dyn AnalyticsSink>,
    sanitizer: Arc<dyn OutputSanitizer>,
}

impl Orchestrator {
    pub fn new(
        config: OrchestratorConfig,
        registry: Arc<AdapterRegistry>,
        scorecards: Arc<dyn ScorecardStore>,
    ) -> Self {
        let health = Arc::new(ProviderHealthMonitor::new(config.sla.clone()));
        Self::with_health(config, registry, scorecards, health)
    }

    /// Build with an externally owned health monitor (shared across orchestrators)
    pub fn with_health(
        config: OrchestratorConfig,
        registry: Arc<AdapterRegistry>,
        scorecards: Arc<dyn ScorecardStore>,
        health: Arc<ProviderHealthMonitor>,
    ) -> Self {
        let mut identities = config.identity_names();
        identities.extend(
            registry
                .providers()
                .into_iter()
                .filter(|p| p != LOCAL_PROVIDER),
        );
        let consensus = ConsensusBuilder::new(StyleNormalizer::new(identities));
        let dispatcher = Arc::new(FailoverDispatcher::new(registry, Arc::clone(&health)));

        Self {
            router: Router::new(config),
            runner: EnsembleRunner::new(dispatcher),
            health,
            consensus,
            scorecards,
            analytics: Arc::new(NoAnalytics),
            sanitizer: Arc::new(PassthroughSanitizer),
        }
    }

    pub fn with_analytics(mut self, analytics: Arc<dyn AnalyticsSink>) -> Self {
        self.analytics = analytics;
        self
    }

    pub fn with_sanitizer(mut self, sanitizer: Arc<dyn OutputSanitizer>) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    pub fn with_scorer(mut self, scorer: Arc<dyn OutputScorer>) -> Self {
        self.runner = self.runner.with_scorer(scorer);
        self
    }

    pub fn health(&self) -> &ProviderHealthMonitor {
        &self.health
    }

    /// Run a query with the given options and no progress reporting
    pub async fn run(
        &self,
        query: &str,
        options: RequestOptions,
    ) -> Result<OrchestrationResult, OrchestrateError> {
        self.execute_with_progress(&OrchestrateRequest::new(query, options), &NoProgress)
            .await
    }

    /// Execute a request without progress reporting
    pub async fn execute(
        &self,
        request: &OrchestrateRequest,
    ) -> Result<OrchestrationResult, OrchestrateError> {
        self.execute_with_progress(request, &NoProgress).await
    }

    /// Execute a request with progress callbacks
    pub async fn execute_with_progress(
        &self,
        request: &OrchestrateRequest,
        progress: &dyn StageProgress,
    ) -> Result<OrchestrationResult, OrchestrateError> {
        let validated = request
            .validate()
            .map_err(OrchestrateError::InvalidRequest)?;
        let query = validated.query.trimmed();
        let mut timings = StageTimings::new();

        let profile = timed(&mut timings, progress, Stage::Equalizer, || {
            map_options(validated.sliders, validated.max_tokens, validated.json_mode)
        });
        debug!("Execution profile: {:?}", profile);

        let plan = timed(&mut timings, progress, Stage::Planner, || {
            optimize(query, &profile)
        });

        let routes = timed(&mut timings, progress, Stage::Router, || {
            self.health.prune();
            let snapshot = self.scorecards.get_scorecards();
            self.router
                .select_models(&plan, &profile, &snapshot, &self.health)
        });
        info!(
            "Routes: {}",
            routes
                .iter()
                .map(|r| format!("{}({:.2})", r.backend_name, r.weight))
                .collect::<Vec<_>>()
                .join(", ")
        );

        let started = Instant::now();
        let outputs = self.runner.run(&plan, &routes, &profile, progress).await?;
        timings.record(Stage::Ensemble, started.elapsed());

        let costs = sum_costs(&outputs);

        let votes = timed(&mut timings, progress, Stage::Voting, || {
            vote::score(&outputs, &routes, profile.json_mode)
        })
        .map_err(OrchestrateError::Voting)?;
        info!(
            "Vote winner: {} (share {:.2})",
            votes.winner.backend_name,
            votes.winner_share()
        );

        let challenges = if profile.challenge_enabled() {
            timed(&mut timings, progress, Stage::Challenge, || {
                challenge::run(&outputs, &plan)
            })
        } else {
            Vec::new()
        };

        let fact_checks = if profile.factcheck_enabled {
            timed(&mut timings, progress, Stage::FactCheck, || {
                fact_check::verify(&outputs, &plan)
            })
        } else {
            Vec::new()
        };

        let consensus = timed(&mut timings, progress, Stage::Consensus, || {
            let built = self
                .consensus
                .build(&outputs, &votes, &challenges, &fact_checks);
            self.sanitize(built)
        });

        timed(&mut timings, progress, Stage::Scorecard, || {
            self.scorecards.record_interaction(&InteractionRecord {
                query: query.to_string(),
                profile: profile.clone(),
                outputs: outputs.clone(),
                confidence: consensus.confidence,
                cost_usd: costs.usd,
                tokens: costs.tokens,
            });
        });

        let timings = timings.to_map();
        self.analytics
            .emit(interaction_event(&outputs, &consensus, costs, &timings));

        Ok(OrchestrationResult {
            final_answer: consensus.final_answer,
            confidence: consensus.confidence,
            key_points: consensus.key_points,
            citations: consensus.citations,
            costs,
            timings,
        })
    }

    fn sanitize(&self, mut result: ConsensusResult) -> ConsensusResult {
        result.final_answer = self.sanitizer.sanitize(&result.final_answer);
        for point in &mut result.key_points {
            *point = self.sanitizer.sanitize(point);
        }
        for citation in &mut result.citations {
            citation.span = self.sanitizer.sanitize(&citation.span);
        }
        result
    }
}

/// Run a synchronous stage, recording its duration and progress
fn timed<T>(
    timings: &mut StageTimings,
    progress: &dyn StageProgress,
    stage: Stage,
    f: impl FnOnce() -> T,
) -> T {
    progress.on_stage_start(stage, 1);
    let started = Instant::now();
    let value = f();
    timings.record(stage, started.elapsed());
    progress.on_stage_complete(stage);
    value
}

fn sum_costs(outputs: &[EnsembleOutput]) -> Costs {
    outputs.iter().fold(Costs::default(), |acc, o| Costs {
        usd: acc.usd + o.cost_usd,
        tokens: acc.tokens + o.tokens,
    })
}

fn interaction_event(
    outputs: &[EnsembleOutput],
    consensus: &ConsensusResult,
    costs: Costs,
    timings: &BTreeMap<String, f64>,
) -> AnalyticsEvent {
    let backends: Vec<_> = outputs
        .iter()
        .map(|o| {
            json!({
                "backend": o.backend_name,
                "quality": o.score_quality,
                "factuality": o.score_factuality,
                "latency_ms": o.latency_ms,
                "cost_usd": o.cost_usd,
            })
        })
        .collect();
    AnalyticsEvent::new(
        "interaction",
        json!({
            "outputs": backends,
            "confidence": consensus.confidence,
            "cost_usd": costs.usd,
            "tokens": costs.tokens,
            "timings": timings,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::backend_adapter::AdapterError;
    use crate::use_cases::failover::test_support::ScriptedAdapter;
    use chorus_domain::orchestration::stage::TOTAL_KEY;
    use chorus_domain::{Scorecard, ScorecardBook};
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore {
        book: Mutex<ScorecardBook>,
        records: Mutex<Vec<InteractionRecord>>,
    }

    impl ScorecardStore for MemoryStore {
        fn record_interaction(&self, record: &InteractionRecord) {
            self.book.lock().unwrap().record(&record.outputs);
            self.records.lock().unwrap().push(record.clone());
        }

        fn get_scorecards(&self) -> Vec<Scorecard> {
            self.book.lock().unwrap().scorecards()
        }
    }

    #[derive(Default)]
    struct CapturingSink {
        events: Mutex<Vec<(&'static str, serde_json::Value)>>,
    }

    impl AnalyticsSink for CapturingSink {
        fn emit(&self, event: AnalyticsEvent) {
            self.events
                .lock()
                .unwrap()
                .push((event.event_type, event.payload));
        }
    }

    struct Shouting;

    impl OutputSanitizer for Shouting {
        fn sanitize(&self, text: &str) -> String {
            text.to_uppercase()
        }
    }

    #[derive(Default)]
    struct Recorder {
        started: Mutex<Vec<Stage>>,
    }

    impl StageProgress for Recorder {
        fn on_stage_start(&self, stage: Stage, _total_units: usize) {
            self.started.lock().unwrap().push(stage);
        }
        fn on_unit_complete(&self, _stage: Stage, _backend: &str, _success: bool) {}
        fn on_stage_complete(&self, _stage: Stage) {}
    }

    /// Registry where every default provider answers, mentioning its identity
    fn full_registry() -> AdapterRegistry {
        ["openai", "anthropic", "google", "mistral", "local"]
            .into_iter()
            .fold(AdapterRegistry::new(), |r, p| {
                r.with_adapter(Arc::new(ScriptedAdapter::ok(p)))
            })
            .with_fallback(Arc::new(ScriptedAdapter::ok("local")))
    }

    fn options(accuracy: f64, speed: f64, creativity: f64, cost: f64) -> RequestOptions {
        RequestOptions {
            accuracy,
            speed,
            creativity,
            cost,
            max_tokens: 400,
            json_mode: false,
        }
    }

    fn orchestrator(registry: AdapterRegistry, store: Arc<MemoryStore>) -> Orchestrator {
        Orchestrator::new(OrchestratorConfig::default(), Arc::new(registry), store)
    }

    #[tokio::test]
    async fn test_end_to_end_scenario() {
        let store = Arc::new(MemoryStore::default());
        let o = orchestrator(full_registry(), store.clone());
        let result = o
            .run(
                "Explain test-time scaling in LLM ensembles",
                options(0.6, 0.4, 0.5, 0.5),
            )
            .await
            .unwrap();

        assert!(!result.final_answer.is_empty());
        assert!((0.0..=1.0).contains(&result.confidence));
        let stage_sum: f64 = result
            .timings
            .iter()
            .filter(|(k, _)| k.as_str() != TOTAL_KEY)
            .map(|(_, v)| v)
            .sum();
        assert!(result.timings[TOTAL_KEY] >= stage_sum - 1e-9);
        assert!(result.costs.tokens > 0);
    }

    #[tokio::test]
    async fn test_final_answer_carries_no_identity() {
        let o = orchestrator(full_registry(), Arc::new(MemoryStore::default()));
        let result = o.run("hello", options(0.9, 0.1, 0.9, 0.9)).await.unwrap();
        let lower = result.final_answer.to_lowercase();
        for name in ["openai", "anthropic", "gpt-4o", "claude", "mistral", "gemini"] {
            assert!(!lower.contains(name), "leaked {name}: {lower}");
        }
    }

    #[tokio::test]
    async fn test_every_backend_recorded_in_scorecards() {
        let store = Arc::new(MemoryStore::default());
        let o = orchestrator(full_registry(), store.clone());
        o.run("hello", options(0.9, 0.1, 0.5, 0.9)).await.unwrap();

        let records = store.records.lock().unwrap();
        assert_eq!(records.len(), 1);
        let cards = store.get_scorecards();
        for output in &records[0].outputs {
            assert!(cards.iter().any(|c| c.backend_name == output.backend_name));
        }
    }

    #[tokio::test]
    async fn test_optional_stages_follow_profile() {
        let recorder = Recorder::default();
        let o = orchestrator(full_registry(), Arc::new(MemoryStore::default()));

        // high accuracy, cheap: challenge on, factcheck on
        let request = OrchestrateRequest::new("hello", options(0.9, 0.1, 0.5, 0.9));
        let result = o.execute_with_progress(&request, &recorder).await.unwrap();
        assert!(result.timings.contains_key("challenge"));
        assert!(result.timings.contains_key("factcheck"));

        // speed wins: no challenge; cost floor: no factcheck
        let request = OrchestrateRequest::new("hello", options(0.9, 0.9, 0.5, 0.1));
        let result = o.execute_with_progress(&request, &NoProgress).await.unwrap();
        assert!(!result.timings.contains_key("challenge"));
        assert!(!result.timings.contains_key("factcheck"));

        let started = recorder.started.lock().unwrap();
        assert_eq!(started.first(), Some(&Stage::Equalizer));
        assert_eq!(started.last(), Some(&Stage::Scorecard));
    }

    #[tokio::test]
    async fn test_invalid_request_rejected() {
        let o = orchestrator(full_registry(), Arc::new(MemoryStore::default()));
        let err = o.run("  ", RequestOptions::default()).await.unwrap_err();
        assert!(matches!(err, OrchestrateError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_all_units_failing_is_no_outputs() {
        let failing = ["openai", "anthropic", "google", "mistral", "local"]
            .into_iter()
            .fold(AdapterRegistry::new(), |r, p| {
                r.with_adapter(Arc::new(ScriptedAdapter::scripted(
                    p,
                    (0..10)
                        .map(|_| Err(AdapterError::InvalidRequest("no".into())))
                        .collect(),
                )))
            });
        let o = orchestrator(failing, Arc::new(MemoryStore::default()));
        let err = o.run("hello", RequestOptions::default()).await.unwrap_err();
        assert!(matches!(err, OrchestrateError::Voting(DomainError::NoOutputs)));
    }

    #[tokio::test]
    async fn test_empty_registry_is_ensemble_error() {
        let o = orchestrator(AdapterRegistry::new(), Arc::new(MemoryStore::default()));
        let err = o.run("hello", RequestOptions::default()).await.unwrap_err();
        assert!(matches!(
            err,
            OrchestrateError::Ensemble(EnsembleError::NoUsableBackend)
        ));
    }

    #[tokio::test]
    async fn test_sanitizer_and_analytics_applied() {
        let sink = Arc::new(CapturingSink::default());
        let o = orchestrator(full_registry(), Arc::new(MemoryStore::default()))
            .with_sanitizer(Arc::new(Shouting))
            .with_analytics(sink.clone());
        let result = o.run("hello", RequestOptions::default()).await.unwrap();

        assert_eq!(result.final_answer, result.final_answer.to_uppercase());
        let events = sink.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, "interaction");
        assert!(events[0].1["outputs"].as_array().is_some());
    }

    #[tokio::test]
    async fn test_unconfigured_providers_fall_back_locally() {
        let registry = AdapterRegistry::new().with_fallback(Arc::new(ScriptedAdapter::ok("local")));
        let o = orchestrator(registry, Arc::new(MemoryStore::default()));
        let result = o.run("hello", RequestOptions::default()).await.unwrap();
        assert!(!result.final_answer.is_empty());
    }
}
