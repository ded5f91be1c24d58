//! Backend adapter port
//!
//! Defines the interface for generating text with a model through one
//! provider, and the registry the dispatcher resolves providers from.

use async_trait::async_trait;
use chorus_domain::{FailureClass, RouteParams};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during a generation call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AdapterError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Provider returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Timeout")]
    Timeout,

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Other error: {0}")]
    Other(String),
}

impl AdapterError {
    /// Map to the failure class the SLA window and failover act on
    pub fn classify(&self) -> FailureClass {
        match self {
            AdapterError::NotConfigured(_) => FailureClass::Configuration,
            AdapterError::Status { status, .. } => FailureClass::from_status(*status),
            AdapterError::Timeout | AdapterError::Connection(_) => FailureClass::Transport,
            AdapterError::InvalidRequest(_) | AdapterError::Other(_) => FailureClass::Client,
        }
    }

    pub fn is_not_configured(&self) -> bool {
        matches!(self, AdapterError::NotConfigured(_))
    }
}

/// Sampling parameters sent with one generation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerateParams {
    pub temperature: f64,
    pub top_p: f64,
    pub max_tokens: u32,
    pub n_samples: u32,
    pub json_mode: bool,
}

impl GenerateParams {
    pub fn from_route(params: &RouteParams, json_mode: bool) -> Self {
        Self {
            temperature: params.temperature,
            top_p: params.top_p,
            max_tokens: params.max_tokens,
            n_samples: 1,
            json_mode,
        }
    }
}

/// A successful generation
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub text: String,
    pub tokens: u64,
    pub latency_ms: f64,
    pub cost_usd: f64,
    pub backend_name: String,
    pub metadata: BTreeMap<String, String>,
}

/// One provider able to serve one or more models
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait BackendAdapter: Send + Sync {
    /// Provider name as used in the equivalence table
    fn provider(&self) -> &str;

    /// Whether the provider can be called at all (credentials, binaries, ...)
    fn is_available(&self) -> bool;

    /// Generate a completion for `prompt` with `model`
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        params: &GenerateParams,
    ) -> Result<Generation, AdapterError>;
}

/// Provider name → adapter, plus the guaranteed fallback
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: HashMap<String, Arc<dyn BackendAdapter>>,
    fallback: Option<Arc<dyn BackendAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter under its own provider name, replacing any previous one
    pub fn register(&mut self, adapter: Arc<dyn BackendAdapter>) {
        self.adapters.insert(adapter.provider().to_string(), adapter);
    }

    pub fn with_adapter(mut self, adapter: Arc<dyn BackendAdapter>) -> Self {
        self.register(adapter);
        self
    }

    pub fn with_fallback(mut self, adapter: Arc<dyn BackendAdapter>) -> Self {
        self.fallback = Some(adapter);
        self
    }

    pub fn get(&self, provider: &str) -> Option<Arc<dyn BackendAdapter>> {
        self.adapters.get(provider).cloned()
    }

    pub fn fallback(&self) -> Option<Arc<dyn BackendAdapter>> {
        self.fallback.clone()
    }

    /// Registered provider names, sorted
    pub fn providers(&self) -> Vec<String> {
        let mut names: Vec<String> = self.adapters.keys().cloned().collect();
        names.sort();
        names
    }

    /// True when nothing at all can serve a request
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty() && self.fallback.is_none()
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("providers", &self.providers())
            .field("fallback", &self.fallback.as_ref().map(|a| a.provider()))
            .finish()
    }
}
