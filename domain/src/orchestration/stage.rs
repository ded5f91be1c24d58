//! Pipeline stages and their timings

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Key under which the summed duration is reported
pub const TOTAL_KEY: &str = "total";

/// One step of the fixed request pipeline, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Equalizer,
    Planner,
    Router,
    Ensemble,
    Voting,
    Challenge,
    FactCheck,
    Consensus,
    Scorecard,
}

impl Stage {
    pub const ALL: [Stage; 9] = [
        Stage::Equalizer,
        Stage::Planner,
        Stage::Router,
        Stage::Ensemble,
        Stage::Voting,
        Stage::Challenge,
        Stage::FactCheck,
        Stage::Consensus,
        Stage::Scorecard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Equalizer => "equalizer",
            Stage::Planner => "planner",
            Stage::Router => "router",
            Stage::Ensemble => "ensemble",
            Stage::Voting => "voting",
            Stage::Challenge => "challenge",
            Stage::FactCheck => "factcheck",
            Stage::Consensus => "consensus",
            Stage::Scorecard => "scorecard",
        }
    }

    /// Human-readable label for progress output
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Equalizer => "Mapping options",
            Stage::Planner => "Planning prompt",
            Stage::Router => "Selecting backends",
            Stage::Ensemble => "Running ensemble",
            Stage::Voting => "Voting",
            Stage::Challenge => "Challenging outputs",
            Stage::FactCheck => "Fact-checking",
            Stage::Consensus => "Building consensus",
            Stage::Scorecard => "Recording scorecards",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-stage durations for one request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageTimings {
    stages: Vec<(Stage, f64)>,
}

impl StageTimings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a stage duration. Recording a stage twice accumulates.
    pub fn record(&mut self, stage: Stage, elapsed: Duration) {
        let ms = elapsed.as_secs_f64() * 1000.0;
        if let Some(entry) = self.stages.iter_mut().find(|(s, _)| *s == stage) {
            entry.1 += ms;
        } else {
            self.stages.push((stage, ms));
        }
    }

    pub fn get(&self, stage: Stage) -> Option<f64> {
        self.stages
            .iter()
            .find(|(s, _)| *s == stage)
            .map(|(_, ms)| *ms)
    }

    /// Sum of every recorded stage
    pub fn total_ms(&self) -> f64 {
        self.stages.iter().map(|(_, ms)| ms).sum()
    }

    /// Stages in the order they were recorded
    pub fn iter(&self) -> impl Iterator<Item = (Stage, f64)> + '_ {
        self.stages.iter().copied()
    }

    /// Flatten to `{stage: ms, "total": ms}`
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        let mut map: BTreeMap<String, f64> = self
            .stages
            .iter()
            .map(|(stage, ms)| (stage.as_str().to_string(), *ms))
            .collect();
        map.insert(TOTAL_KEY.to_string(), self.total_ms());
        map
    }
}
