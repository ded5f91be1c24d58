//! Application-level configuration.
//!
//! - [`OrchestratorConfig`]: candidate backends, fallback, provider equivalence and SLA policy

pub mod orchestrator_config;

pub use orchestrator_config::OrchestratorConfig;
