//! Application layer for chorus
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::OrchestratorConfig;
pub use ports::{
    analytics::{AnalyticsEvent, AnalyticsSink, NoAnalytics},
    backend_adapter::{AdapterError, AdapterRegistry, BackendAdapter, GenerateParams, Generation},
    progress::{NoProgress, StageProgress},
    sanitizer::{OutputSanitizer, PassthroughSanitizer},
    scorecard_store::ScorecardStore,
};
pub use use_cases::failover::{DispatchError, FailoverDispatcher, ProviderHealthMonitor};
pub use use_cases::orchestrate::{OrchestrateError, Orchestrator};
pub use use_cases::run_ensemble::{EnsembleError, EnsembleRunner};
pub use use_cases::select_routes::Router;
