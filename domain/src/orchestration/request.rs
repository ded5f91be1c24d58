//! Inbound request and its validation

use crate::core::error::DomainError;
use crate::core::query::Query;
use crate::equalizer::Sliders;
use serde::{Deserialize, Serialize};

pub const MIN_MAX_TOKENS: u32 = 64;
pub const MAX_MAX_TOKENS: u32 = 4096;
pub const DEFAULT_MAX_TOKENS: u32 = 512;

/// Tuning knobs accompanying a query. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestOptions {
    pub accuracy: f64,
    pub speed: f64,
    pub creativity: f64,
    pub cost: f64,
    pub max_tokens: u32,
    pub json_mode: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        let sliders = Sliders::default();
        Self {
            accuracy: sliders.accuracy,
            speed: sliders.speed,
            creativity: sliders.creativity,
            cost: sliders.cost,
            max_tokens: DEFAULT_MAX_TOKENS,
            json_mode: false,
        }
    }
}

impl RequestOptions {
    pub fn sliders(&self) -> Sliders {
        Sliders {
            accuracy: self.accuracy,
            speed: self.speed,
            creativity: self.creativity,
            cost: self.cost,
        }
    }
}

/// A query plus options, as received from the transport layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestrateRequest {
    pub query: String,
    #[serde(default)]
    pub options: RequestOptions,
}

/// A request that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    pub query: Query,
    pub sliders: Sliders,
    pub max_tokens: u32,
    pub json_mode: bool,
}

impl OrchestrateRequest {
    pub fn new(query: impl Into<String>, options: RequestOptions) -> Self {
        Self {
            query: query.into(),
            options,
        }
    }

    /// Check bounds and produce the validated form
    pub fn validate(&self) -> Result<ValidatedRequest, DomainError> {
        let query = Query::try_new(self.query.clone())?;
        let o = &self.options;

        for (field, value) in [
            ("accuracy", o.accuracy),
            ("speed", o.speed),
            ("creativity", o.creativity),
            ("cost", o.cost),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(DomainError::InvalidOption {
                    field,
                    reason: format!("{} is outside [0, 1]", value),
                });
            }
        }

        if !(MIN_MAX_TOKENS..=MAX_MAX_TOKENS).contains(&o.max_tokens) {
            return Err(DomainError::InvalidOption {
                field: "max_tokens",
                reason: format!(
                    "{} is outside [{}, {}]",
                    o.max_tokens, MIN_MAX_TOKENS, MAX_MAX_TOKENS
                ),
            });
        }

        Ok(ValidatedRequest {
            query,
            sliders: o.sliders(),
            max_tokens: o.max_tokens,
            json_mode: o.json_mode,
        })
    }
}
