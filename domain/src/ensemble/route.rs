//! Model routes produced by the router

use crate::util::clamp_unit;
use serde::{Deserialize, Serialize};

pub const MIN_ROUTE_WEIGHT: f64 = 0.1;
pub const MAX_ROUTE_WEIGHT: f64 = 1.0;

/// Sampling parameters for one route
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteParams {
    pub temperature: f64,
    pub top_p: f64,
    pub max_tokens: u32,
}

impl RouteParams {
    /// Derive sampling parameters from the creativity boost
    pub fn from_creativity(creativity_boost: f64, max_tokens: u32) -> Self {
        Self {
            temperature: (0.2 + 0.6 * creativity_boost).clamp(0.1, 1.0),
            top_p: (0.8 + 0.2 * creativity_boost).clamp(0.5, 1.0),
            max_tokens,
        }
    }
}

/// A ranked, weighted backend route (recomputed every request)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRoute {
    /// Canonical backend name
    pub backend_name: String,
    /// Routing weight in `[0.1, 1.0]`
    pub weight: f64,
    pub params: RouteParams,
    /// Healthy providers serving this exact backend, in failover priority order
    #[serde(default)]
    pub providers: Vec<String>,
}

impl ModelRoute {
    pub fn new(backend_name: impl Into<String>, weight: f64, params: RouteParams) -> Self {
        Self {
            backend_name: backend_name.into(),
            weight: clamp_weight(weight),
            params,
            providers: Vec::new(),
        }
    }

    pub fn with_providers(mut self, providers: Vec<String>) -> Self {
        self.providers = providers;
        self
    }
}

/// Clamp a routing weight into `[0.1, 1.0]`
pub fn clamp_weight(weight: f64) -> f64 {
    clamp_unit(weight).max(MIN_ROUTE_WEIGHT).min(MAX_ROUTE_WEIGHT)
}
