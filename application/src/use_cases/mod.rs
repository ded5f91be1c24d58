//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod failover;
pub mod orchestrate;
pub mod run_ensemble;
pub mod select_routes;
