//! Progress notification port
//!
//! Defines the interface for reporting stage progress during a pipeline run.

use chorus_domain::Stage;

/// Callback for progress updates during orchestration
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (progress bars, plain logs, ...).
pub trait StageProgress: Send + Sync {
    /// Called when a stage starts. `total_units` is 1 for sequential stages
    /// and the number of (route × sample) units for the ensemble.
    fn on_stage_start(&self, stage: Stage, total_units: usize);

    /// Called when one unit of a stage settles
    fn on_unit_complete(&self, stage: Stage, backend: &str, success: bool);

    /// Called when a stage completes
    fn on_stage_complete(&self, stage: Stage);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl StageProgress for NoProgress {
    fn on_stage_start(&self, _stage: Stage, _total_units: usize) {}
    fn on_unit_complete(&self, _stage: Stage, _backend: &str, _success: bool) {}
    fn on_stage_complete(&self, _stage: Stage) {}
}
