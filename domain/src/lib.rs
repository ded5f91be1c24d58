//! Domain layer for chorus
//!
//! This crate contains the pure pipeline logic and value objects. It has no
//! dependencies on async runtimes, I/O, or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Pipeline
//!
//! One request flows through a fixed sequence of stages:
//!
//! - **Equalizer**: sliders → [`ExecutionProfile`]
//! - **Planner**: query → [`PromptPlan`] (segments + competing variants)
//! - **Router** / **Ensemble** (application layer): weighted [`ModelRoute`]s
//!   fanned out into scored [`EnsembleOutput`]s
//! - **Quorum**: voting, optional challenge and fact-check, then an
//!   incognito [`ConsensusResult`]
//! - **Scorecard**: running per-backend averages that bias future routing
//!
//! ## Reliability
//!
//! A model is never silently swapped for a different one. The
//! [`EquivalenceTable`] lists the providers able to serve the *same* model, and
//! the SLA [`RollingWindow`] decides which of them are currently healthy.

pub mod config;
pub mod core;
pub mod ensemble;
pub mod equalizer;
pub mod orchestration;
pub mod prompt;
pub mod quorum;
pub mod reliability;
pub mod scorecard;
pub mod util;

// Re-export commonly used types
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity};
pub use core::{
    backend::{BackendProfile, Capability, LOCAL_FALLBACK_BACKEND, LOCAL_PROVIDER},
    error::DomainError,
    query::Query,
};
pub use ensemble::{EnsembleOutput, HeuristicScorer, ModelRoute, OutputScorer, RouteParams};
pub use equalizer::{ExecutionProfile, Sliders, map_options};
pub use orchestration::{
    Costs, OrchestrateRequest, OrchestrationResult, RequestOptions, Stage, StageTimings,
    ValidatedRequest,
};
pub use prompt::{PromptPlan, optimize, strip_instructions};
pub use quorum::{
    ChallengeFeedback, Citation, ConsensusBuilder, ConsensusResult, FactCheckResult,
    StyleNormalizer, Verdict, VoteSummary,
};
pub use reliability::{EquivalenceTable, FailureClass, RollingWindow, SlaBreach, SlaPolicy};
pub use scorecard::{InteractionRecord, Scorecard, ScorecardAccumulator, ScorecardBook};
