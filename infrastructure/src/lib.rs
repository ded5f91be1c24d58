//! Infrastructure layer for chorus
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod adapters;
pub mod config;
pub mod logging;
pub mod sanitize;
pub mod scorecard;

// Re-export commonly used types
pub use adapters::{CommandAdapter, LocalAdapter, build_registry};
pub use config::{
    ConfigLoader, FileAnalyticsConfig, FileConfig, FileOutputConfig, FileProviderConfig,
    FileReliabilityConfig, FileRouterConfig, FileSanitizerConfig, FileScorecardConfig,
};
pub use logging::JsonlAnalyticsSink;
pub use sanitize::RegexSanitizer;
pub use scorecard::{InMemoryScorecardStore, SnapshotError};
