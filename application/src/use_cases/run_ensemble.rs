//! Ensemble fan-out
//!
//! Every (route × sample) pair is an independent unit spawned on a JoinSet.
//! The stage waits for all of them; a failing unit is logged and dropped and
//! never cancels its siblings.

use super::failover::{DispatchError, FailoverDispatcher};
use crate::ports::backend_adapter::{GenerateParams, Generation};
use crate::ports::progress::StageProgress;
use chorus_domain::{
    EnsembleOutput, ExecutionProfile, HeuristicScorer, ModelRoute, OutputScorer, PromptPlan, Stage,
};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Errors that can occur during the ensemble stage
#[derive(Error, Debug)]
pub enum EnsembleError {
    #[error("No usable backend is configured")]
    NoUsableBackend,
}

/// One dispatched unit, before scoring
struct Unit {
    index: usize,
    route: ModelRoute,
    result: Result<Generation, DispatchError>,
}

pub struct EnsembleRunner {
    dispatcher: Arc<FailoverDispatcher>,
    scorer: Arc<dyn OutputScorer>,
}

impl EnsembleRunner {
    pub fn new(dispatcher: Arc<FailoverDispatcher>) -> Self {
        Self {
            dispatcher,
            scorer: Arc::new(HeuristicScorer),
        }
    }

    pub fn with_scorer(mut self, scorer: Arc<dyn OutputScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn dispatcher(&self) -> &FailoverDispatcher {
        &self.dispatcher
    }

    /// Run every unit concurrently and return the successful outputs in unit order
    pub async fn run(
        &self,
        plan: &PromptPlan,
        routes: &[ModelRoute],
        profile: &ExecutionProfile,
        progress: &dyn StageProgress,
    ) -> Result<Vec<EnsembleOutput>, EnsembleError> {
        if routes.is_empty() || self.dispatcher.registry().is_empty() {
            return Err(EnsembleError::NoUsableBackend);
        }

        let samples_per_route = profile.num_samples.div_ceil(routes.len()).max(1);
        let total_units = samples_per_route * routes.len();
        info!(
            "Ensemble: {} route(s) × {} sample(s)",
            routes.len(),
            samples_per_route
        );
        progress.on_stage_start(Stage::Ensemble, total_units);

        let mut join_set = JoinSet::new();
        let mut index = 0;
        for route in routes {
            for _ in 0..samples_per_route {
                let dispatcher = Arc::clone(&self.dispatcher);
                let route = route.clone();
                let prompt = plan.variant(index).to_string();
                let params = GenerateParams::from_route(&route.params, profile.json_mode);
                let unit_index = index;

                join_set.spawn(async move {
                    let result = dispatcher.dispatch(&route, &prompt, &params).await;
                    Unit {
                        index: unit_index,
                        route,
                        result,
                    }
                });
                index += 1;
            }
        }

        let mut settled: Vec<(usize, EnsembleOutput)> = Vec::with_capacity(total_units);
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(Unit {
                    index,
                    route,
                    result: Ok(generation),
                }) => {
                    debug!(
                        "Unit {} ({}) answered in {:.0}ms",
                        index, generation.backend_name, generation.latency_ms
                    );
                    progress.on_unit_complete(Stage::Ensemble, &generation.backend_name, true);
                    settled.push((index, self.score(generation, &route)));
                }
                Ok(Unit {
                    index,
                    route,
                    result: Err(e),
                }) => {
                    warn!("Unit {} ({}) dropped: {}", index, route.backend_name, e);
                    progress.on_unit_complete(Stage::Ensemble, &route.backend_name, false);
                }
                Err(e) => {
                    warn!("Task join error: {}", e);
                }
            }
        }

        settled.sort_by_key(|(i, _)| *i);
        progress.on_stage_complete(Stage::Ensemble);
        info!("Ensemble: {}/{} unit(s) succeeded", settled.len(), total_units);
        Ok(settled.into_iter().map(|(_, o)| o).collect())
    }

    fn score(&self, generation: Generation, route: &ModelRoute) -> EnsembleOutput {
        let score_quality = self.scorer.quality(&generation.text, route);
        let score_factuality = self.scorer.factuality(&generation.text, route);
        EnsembleOutput {
            backend_name: generation.backend_name,
            text: generation.text,
            tokens: generation.tokens,
            latency_ms: generation.latency_ms,
            cost_usd: generation.cost_usd,
            score_quality,
            score_factuality,
            metadata: generation.metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::backend_adapter::{AdapterError, AdapterRegistry};
    use crate::ports::progress::NoProgress;
    use crate::use_cases::failover::ProviderHealthMonitor;
    use crate::use_cases::failover::test_support::ScriptedAdapter;
    use chorus_domain::{LOCAL_FALLBACK_BACKEND, RouteParams};
    use std::sync::Mutex;
    use std::time::Duration;

    fn profile(num_samples: usize) -> ExecutionProfile {
        ExecutionProfile {
            num_models: 2,
            num_samples,
            challenge_rounds: 0,
            factcheck_enabled: false,
            creativity_boost: 0.9,
            max_tokens: 256,
            json_mode: false,
        }
    }

    fn plan() -> PromptPlan {
        PromptPlan {
            core_prompt: "v0".to_string(),
            segments: vec!["v0".to_string()],
            competing_variants: vec!["v0".to_string(), "v1".to_string(), "v2".to_string()],
        }
    }

    fn route(model: &str, provider: &str, weight: f64) -> ModelRoute {
        ModelRoute::new(model, weight, RouteParams::from_creativity(0.5, 256))
            .with_providers(vec![provider.to_string()])
    }

    fn runner(registry: AdapterRegistry) -> EnsembleRunner {
        EnsembleRunner::new(Arc::new(FailoverDispatcher::new(
            Arc::new(registry),
            Arc::new(ProviderHealthMonitor::default()),
        )))
    }

    /// Records which prompt each call received
    struct EchoAdapter {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl crate::ports::backend_adapter::BackendAdapter for EchoAdapter {
        fn provider(&self) -> &str {
            "echo"
        }

        fn is_available(&self) -> bool {
            true
        }

        async fn generate(
            &self,
            model: &str,
            prompt: &str,
            _params: &GenerateParams,
        ) -> Result<Generation, AdapterError> {
            self.seen.lock().unwrap().push(prompt.to_string());
            Ok(Generation {
                text: prompt.to_string(),
                tokens: 1,
                latency_ms: 1.0,
                cost_usd: 0.0,
                backend_name: model.to_string(),
                metadata: Default::default(),
            })
        }
    }

    /// Answers after a fixed delay
    struct SlowAdapter {
        name: &'static str,
        delay: Duration,
    }

    #[async_trait::async_trait]
    impl crate::ports::backend_adapter::BackendAdapter for SlowAdapter {
        fn provider(&self) -> &str {
            self.name
        }

        fn is_available(&self) -> bool {
            true
        }

        async fn generate(
            &self,
            model: &str,
            _prompt: &str,
            _params: &GenerateParams,
        ) -> Result<Generation, AdapterError> {
            tokio::time::sleep(self.delay).await;
            Ok(Generation {
                text: format!("{} answer", self.name),
                tokens: 2,
                latency_ms: self.delay.as_millis() as f64,
                cost_usd: 0.0,
                backend_name: model.to_string(),
                metadata: Default::default(),
            })
        }
    }

    /// Records the order in which units settle
    #[derive(Default)]
    struct CompletionOrder {
        backends: Mutex<Vec<String>>,
    }

    impl StageProgress for CompletionOrder {
        fn on_stage_start(&self, _stage: Stage, _total_units: usize) {}
        fn on_unit_complete(&self, _stage: Stage, backend: &str, _success: bool) {
            self.backends.lock().unwrap().push(backend.to_string());
        }
        fn on_stage_complete(&self, _stage: Stage) {}
    }

    #[tokio::test(start_paused = true)]
    async fn test_stage_waits_for_slow_unit() {
        let r = runner(
            AdapterRegistry::new()
                .with_adapter(Arc::new(SlowAdapter {
                    name: "slow",
                    delay: Duration::from_secs(30),
                }))
                .with_adapter(Arc::new(SlowAdapter {
                    name: "fast",
                    delay: Duration::from_millis(10),
                })),
        );
        let routes = vec![route("m1", "slow", 0.9), route("m2", "fast", 0.5)];
        let order = CompletionOrder::default();

        let started = tokio::time::Instant::now();
        let outputs = r.run(&plan(), &routes, &profile(2), &order).await.unwrap();

        // units run side by side, so the stage takes as long as the slowest one
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(30));
        assert!(elapsed < Duration::from_secs(31));

        assert_eq!(*order.backends.lock().unwrap(), vec!["m2", "m1"]);
        let names: Vec<_> = outputs.iter().map(|o| o.backend_name.as_str()).collect();
        assert_eq!(names, vec!["m1", "m2"]);
        assert_eq!(outputs[0].text, "slow answer");
    }

    #[tokio::test]
    async fn test_samples_per_route_is_ceiling() {
        let r = runner(
            AdapterRegistry::new()
                .with_adapter(Arc::new(ScriptedAdapter::ok("a")))
                .with_adapter(Arc::new(ScriptedAdapter::ok("b"))),
        );
        let routes = vec![route("m1", "a", 0.9), route("m2", "b", 0.5)];
        let outputs = r.run(&plan(), &routes, &profile(3), &NoProgress).await.unwrap();
        // ceil(3 / 2) = 2 per route
        assert_eq!(outputs.len(), 4);
        assert_eq!(outputs.iter().filter(|o| o.backend_name == "m1").count(), 2);
    }

    #[tokio::test]
    async fn test_outputs_in_unit_order_and_variants_round_robin() {
        let echo = Arc::new(EchoAdapter {
            seen: Mutex::new(Vec::new()),
        });
        let r = runner(AdapterRegistry::new().with_adapter(echo.clone()));
        let routes = vec![route("m1", "echo", 0.9), route("m2", "echo", 0.5)];
        let outputs = r.run(&plan(), &routes, &profile(4), &NoProgress).await.unwrap();

        let texts: Vec<_> = outputs.iter().map(|o| o.text.as_str()).collect();
        assert_eq!(texts, vec!["v0", "v1", "v2", "v0"]);
        assert_eq!(outputs[0].backend_name, "m1");
        assert_eq!(outputs[3].backend_name, "m2");
        assert_eq!(echo.seen.lock().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_failed_units_dropped_not_fatal() {
        let r = runner(
            AdapterRegistry::new()
                .with_adapter(Arc::new(ScriptedAdapter::scripted(
                    "a",
                    vec![Err(AdapterError::InvalidRequest("bad".into()))],
                )))
                .with_adapter(Arc::new(ScriptedAdapter::ok("b"))),
        );
        let routes = vec![route("m1", "a", 0.9), route("m2", "b", 0.5)];
        let outputs = r.run(&plan(), &routes, &profile(2), &NoProgress).await.unwrap();
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].backend_name, "m2");
    }

    #[tokio::test]
    async fn test_unconfigured_backend_substituted() {
        let r = runner(
            AdapterRegistry::new().with_fallback(Arc::new(ScriptedAdapter::ok("local"))),
        );
        let routes = vec![route("gpt-4o", "openai", 0.9)];
        let outputs = r.run(&plan(), &routes, &profile(1), &NoProgress).await.unwrap();
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].backend_name, LOCAL_FALLBACK_BACKEND);
    }

    #[tokio::test]
    async fn test_no_usable_backend() {
        let r = runner(AdapterRegistry::new());
        let err = r
            .run(&plan(), &[route("m", "p", 0.5)], &profile(1), &NoProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, EnsembleError::NoUsableBackend));
    }

    #[tokio::test]
    async fn test_scores_follow_route_weight() {
        let r = runner(AdapterRegistry::new().with_adapter(Arc::new(ScriptedAdapter::ok("a"))));
        let routes = vec![route("m1", "a", 1.0)];
        let outputs = r.run(&plan(), &routes, &profile(1), &NoProgress).await.unwrap();
        let o = &outputs[0];
        // text "a:m1" is 4 chars
        assert!((o.score_quality - (0.55 + 0.3 + 0.004)).abs() < 1e-9);
        assert!((o.score_factuality - (0.6 + 0.2 - 0.05 * 0.5)).abs() < 1e-9);
        assert!((0.0..=1.0).contains(&o.score_quality));
    }
}
