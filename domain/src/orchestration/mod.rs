//! Request/response value objects and stage bookkeeping for one pipeline run

pub mod request;
pub mod result;
pub mod stage;

pub use request::{OrchestrateRequest, RequestOptions, ValidatedRequest};
pub use result::{Costs, OrchestrationResult};
pub use stage::{Stage, StageTimings};
