//! Core domain concepts shared across all subdomains.
//!
//! - [`backend::BackendProfile`]: routable backends and their capabilities
//! - [`query::Query`]: a validated natural-language query
//! - [`error::DomainError`]: domain-level errors

pub mod backend;
pub mod error;
pub mod query;
