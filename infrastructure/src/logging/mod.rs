//! Logging infrastructure: structured interaction analytics.
//!
//! Provides [`JsonlAnalyticsSink`], a JSONL file writer that implements
//! the [`AnalyticsSink`](chorus_application::AnalyticsSink) port.

mod jsonl_analytics;

pub use jsonl_analytics::JsonlAnalyticsSink;
