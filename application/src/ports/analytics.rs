//! Port for structured interaction analytics.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostics, while this port captures one machine-readable
//! record per completed interaction (typically JSONL).

use chrono::{DateTime, Utc};
use serde_json::Value;

/// A structured analytics event.
pub struct AnalyticsEvent {
    /// Event type identifier (e.g., "interaction").
    pub event_type: &'static str,
    /// When the event was created.
    pub timestamp: DateTime<Utc>,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl AnalyticsEvent {
    /// Create a new event stamped with the current UTC time.
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            timestamp: Utc::now(),
            payload,
        }
    }
}

/// Port for emitting analytics events.
///
/// `emit` is synchronous and non-fallible so analytics can never fail a
/// request; write failures are dropped by the implementation.
pub trait AnalyticsSink: Send + Sync {
    fn emit(&self, event: AnalyticsEvent);
}

/// No-op sink for tests and when analytics are disabled.
pub struct NoAnalytics;

impl AnalyticsSink for NoAnalytics {
    fn emit(&self, _event: AnalyticsEvent) {}
}
