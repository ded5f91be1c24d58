//! SLA policy and per-provider rolling window
//!
//! Every provider call outcome lands in the window. Entries older than the
//! policy window are ignored by every query and dropped by [`RollingWindow::prune`].
//! A provider breaches its SLA when it has accumulated `error_threshold`
//! failures, or when its p95 success latency exceeds the configured maximum.
//!
//! Time is always passed in, so the window is deterministic under test.

use super::failure::FailureClass;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

/// Latency samples needed before p95 gating applies
pub const MIN_LATENCY_SAMPLES: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlaPolicy {
    /// Rolling window length in seconds
    pub window_seconds: u64,
    /// Maximum tolerated p95 success latency
    pub max_p95_latency_ms: f64,
    /// Failures inside the window that exclude a provider
    pub error_threshold: usize,
}

impl SlaPolicy {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_seconds)
    }
}

impl Default for SlaPolicy {
    fn default() -> Self {
        Self {
            window_seconds: 120,
            max_p95_latency_ms: 8000.0,
            error_threshold: 3,
        }
    }
}

/// Why a provider is currently excluded
#[derive(Debug, Clone, PartialEq)]
pub enum SlaBreach {
    TooManyErrors { count: usize, threshold: usize },
    SlowP95 { p95_ms: f64, max_ms: f64 },
}

impl std::fmt::Display for SlaBreach {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlaBreach::TooManyErrors { count, threshold } => {
                write!(f, "{} errors in window (threshold {})", count, threshold)
            }
            SlaBreach::SlowP95 { p95_ms, max_ms } => {
                write!(f, "p95 latency {:.0}ms exceeds {:.0}ms", p95_ms, max_ms)
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Outcome {
    Success { latency_ms: f64 },
    Failure { class: FailureClass },
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    at: Instant,
    outcome: Outcome,
}

/// Time-bounded record of provider call outcomes
#[derive(Debug, Clone)]
pub struct RollingWindow {
    policy: SlaPolicy,
    entries: HashMap<String, VecDeque<Entry>>,
}

impl RollingWindow {
    pub fn new(policy: SlaPolicy) -> Self {
        Self {
            policy,
            entries: HashMap::new(),
        }
    }

    pub fn policy(&self) -> &SlaPolicy {
        &self.policy
    }

    pub fn record_success(&mut self, provider: &str, latency_ms: f64, at: Instant) {
        self.push(provider, at, Outcome::Success { latency_ms });
    }

    pub fn record_failure(&mut self, provider: &str, class: FailureClass, at: Instant) {
        self.push(provider, at, Outcome::Failure { class });
    }

    fn push(&mut self, provider: &str, at: Instant, outcome: Outcome) {
        self.entries
            .entry(provider.to_string())
            .or_default()
            .push_back(Entry { at, outcome });
    }

    /// Drop entries that fell out of the window. Returns how many were removed.
    pub fn prune(&mut self, now: Instant) -> usize {
        let window = self.policy.window();
        let mut removed = 0;
        for queue in self.entries.values_mut() {
            let before = queue.len();
            queue.retain(|e| now.saturating_duration_since(e.at) <= window);
            removed += before - queue.len();
        }
        self.entries.retain(|_, q| !q.is_empty());
        removed
    }

    fn live(&self, provider: &str, now: Instant) -> impl Iterator<Item = &Entry> {
        let window = self.policy.window();
        self.entries
            .get(provider)
            .into_iter()
            .flatten()
            .filter(move |e| now.saturating_duration_since(e.at) <= window)
    }

    /// Failures recorded for `provider` inside the window
    pub fn error_count(&self, provider: &str, now: Instant) -> usize {
        self.live(provider, now)
            .filter(|e| matches!(e.outcome, Outcome::Failure { .. }))
            .count()
    }

    /// Failures of one class inside the window
    pub fn error_count_of(&self, provider: &str, class: FailureClass, now: Instant) -> usize {
        self.live(provider, now)
            .filter(|e| matches!(e.outcome, Outcome::Failure { class: c } if c == class))
            .count()
    }

    /// Nearest-rank p95 of successful call latencies inside the window
    pub fn p95_latency_ms(&self, provider: &str, now: Instant) -> Option<f64> {
        let mut latencies: Vec<f64> = self
            .live(provider, now)
            .filter_map(|e| match e.outcome {
                Outcome::Success { latency_ms } => Some(latency_ms),
                Outcome::Failure { .. } => None,
            })
            .collect();
        if latencies.is_empty() {
            return None;
        }
        latencies.sort_by(f64::total_cmp);
        let rank = (0.95 * latencies.len() as f64).ceil() as usize;
        Some(latencies[rank.saturating_sub(1)])
    }

    fn latency_samples(&self, provider: &str, now: Instant) -> usize {
        self.live(provider, now)
            .filter(|e| matches!(e.outcome, Outcome::Success { .. }))
            .count()
    }

    /// The SLA breach currently excluding `provider`, if any
    pub fn breach(&self, provider: &str, now: Instant) -> Option<SlaBreach> {
        let threshold = self.policy.error_threshold;
        let count = self.error_count(provider, now);
        if threshold > 0 && count >= threshold {
            return Some(SlaBreach::TooManyErrors { count, threshold });
        }

        if self.latency_samples(provider, now) >= MIN_LATENCY_SAMPLES
            && let Some(p95_ms) = self.p95_latency_ms(provider, now)
            && p95_ms > self.policy.max_p95_latency_ms
        {
            return Some(SlaBreach::SlowP95 {
                p95_ms,
                max_ms: self.policy.max_p95_latency_ms,
            });
        }
        None
    }

    pub fn is_healthy(&self, provider: &str, now: Instant) -> bool {
        self.breach(provider, now).is_none()
    }

    /// Number of entries currently held (including not yet pruned ones)
    pub fn len(&self) -> usize {
        self.entries.values().map(VecDeque::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for RollingWindow {
    fn default() -> Self {
        Self::new(SlaPolicy::default())
    }
}
