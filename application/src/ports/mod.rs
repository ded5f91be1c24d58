//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod analytics;
pub mod backend_adapter;
pub mod progress;
pub mod sanitizer;
pub mod scorecard_store;
