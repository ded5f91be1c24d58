//! Reliability-aware dispatch
//!
//! [`ProviderHealthMonitor`] wraps the SLA rolling window behind a mutex so
//! every in-flight request can append to it. [`FailoverDispatcher`] sends one
//! generation for a route, walking the route's providers in equivalence order:
//!
//! ```text
//! providers[0] ──(transient failure)──▶ providers[1] ──▶ ... ──▶ Exhausted
//!      │                                     │
//!      └──(client/config failure)──▶ surface immediately
//!
//! no provider callable at all ──▶ guaranteed fallback adapter
//! ```
//!
//! Rotation never leaves the route's model.

use crate::ports::backend_adapter::{AdapterError, AdapterRegistry, GenerateParams, Generation};
use chorus_domain::{
    FailureClass, LOCAL_FALLBACK_BACKEND, ModelRoute, RollingWindow, SlaBreach, SlaPolicy,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, warn};

/// Metadata key naming the provider that served a generation
pub const META_PROVIDER: &str = "provider";

/// Metadata key naming the backend a fallback generation stood in for
pub const META_SUBSTITUTED_FOR: &str = "substituted_for";

/// Errors that can occur while dispatching one unit
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("No provider available for {model}")]
    NoProvider { model: String },

    #[error("Provider {provider} failed: {source}")]
    Adapter {
        provider: String,
        #[source]
        source: AdapterError,
    },

    #[error("All {attempts} provider(s) for {model} failed, last error: {last}")]
    Exhausted {
        model: String,
        attempts: usize,
        last: AdapterError,
    },
}

/// Shared per-provider SLA window
#[derive(Debug)]
pub struct ProviderHealthMonitor {
    window: Mutex<RollingWindow>,
}

impl ProviderHealthMonitor {
    pub fn new(policy: SlaPolicy) -> Self {
        Self {
            window: Mutex::new(RollingWindow::new(policy)),
        }
    }

    fn window(&self) -> MutexGuard<'_, RollingWindow> {
        self.window.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record_success(&self, provider: &str, latency_ms: f64) {
        self.window()
            .record_success(provider, latency_ms, Instant::now());
    }

    pub fn record_failure(&self, provider: &str, class: FailureClass) {
        self.window().record_failure(provider, class, Instant::now());
    }

    pub fn breach(&self, provider: &str) -> Option<SlaBreach> {
        self.window().breach(provider, Instant::now())
    }

    pub fn is_healthy(&self, provider: &str) -> bool {
        self.breach(provider).is_none()
    }

    pub fn error_count(&self, provider: &str) -> usize {
        self.window().error_count(provider, Instant::now())
    }

    /// The subset of `providers` currently within SLA, order preserved
    pub fn healthy_providers(&self, providers: &[String]) -> Vec<String> {
        let window = self.window();
        let now = Instant::now();
        providers
            .iter()
            .filter(|p| match window.breach(p, now) {
                Some(breach) => {
                    warn!("Skipping provider {}: {}", p, breach);
                    false
                }
                None => true,
            })
            .cloned()
            .collect()
    }

    /// Drop entries that aged out of the window
    pub fn prune(&self) -> usize {
        self.window().prune(Instant::now())
    }
}

impl Default for ProviderHealthMonitor {
    fn default() -> Self {
        Self::new(SlaPolicy::default())
    }
}

/// Sends one generation for a route with same-model provider failover
pub struct FailoverDispatcher {
    registry: Arc<AdapterRegistry>,
    health: Arc<ProviderHealthMonitor>,
}

impl FailoverDispatcher {
    pub fn new(registry: Arc<AdapterRegistry>, health: Arc<ProviderHealthMonitor>) -> Self {
        Self { registry, health }
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    pub fn health(&self) -> &ProviderHealthMonitor {
        &self.health
    }

    /// Generate `prompt` on the route's model.
    ///
    /// Every outcome of a provider call is recorded in the health monitor.
    /// Only when no provider of the route can be called at all is the
    /// guaranteed fallback used in its place.
    pub async fn dispatch(
        &self,
        route: &ModelRoute,
        prompt: &str,
        params: &GenerateParams,
    ) -> Result<Generation, DispatchError> {
        let model = route.backend_name.as_str();
        let providers: Vec<String> = if route.providers.is_empty() {
            vec![model.to_string()]
        } else {
            route.providers.clone()
        };

        let mut attempts = 0;
        let mut last_error: Option<AdapterError> = None;

        for provider in &providers {
            if let Some(breach) = self.health.breach(provider) {
                warn!("Provider {} outside SLA for {}: {}", provider, model, breach);
                continue;
            }
            let Some(adapter) = self.registry.get(provider) else {
                debug!("Provider {} is not registered", provider);
                continue;
            };
            if !adapter.is_available() {
                debug!("Provider {} is unavailable", provider);
                continue;
            }

            attempts += 1;
            match adapter.generate(model, prompt, params).await {
                Ok(mut generation) => {
                    self.health.record_success(provider, generation.latency_ms);
                    generation.backend_name = model.to_string();
                    generation
                        .metadata
                        .insert(META_PROVIDER.to_string(), provider.clone());
                    return Ok(generation);
                }
                Err(e) => {
                    let class = e.classify();
                    self.health.record_failure(provider, class);
                    if !class.triggers_rotation() {
                        return Err(DispatchError::Adapter {
                            provider: provider.clone(),
                            source: e,
                        });
                    }
                    warn!(
                        "Provider {} failed for {} ({}), rotating: {}",
                        provider, model, class, e
                    );
                    last_error = Some(e);
                }
            }
        }

        if let Some(last) = last_error {
            return Err(DispatchError::Exhausted {
                model: model.to_string(),
                attempts,
                last,
            });
        }

        self.substitute(model, prompt, params).await
    }

    async fn substitute(
        &self,
        model: &str,
        prompt: &str,
        params: &GenerateParams,
    ) -> Result<Generation, DispatchError> {
        let Some(fallback) = self.registry.fallback() else {
            return Err(DispatchError::NoProvider {
                model: model.to_string(),
            });
        };
        let provider = fallback.provider().to_string();
        warn!(
            "No provider available for {}, substituting {}",
            model, LOCAL_FALLBACK_BACKEND
        );

        match fallback.generate(LOCAL_FALLBACK_BACKEND, prompt, params).await {
            Ok(mut generation) => {
                self.health.record_success(&provider, generation.latency_ms);
                generation.backend_name = LOCAL_FALLBACK_BACKEND.to_string();
                generation
                    .metadata
                    .insert(META_PROVIDER.to_string(), provider);
                generation
                    .metadata
                    .insert(META_SUBSTITUTED_FOR.to_string(), model.to_string());
                Ok(generation)
            }
            Err(e) => {
                self.health.record_failure(&provider, e.classify());
                Err(DispatchError::Adapter { provider, source: e })
            }
        }
    }
}
