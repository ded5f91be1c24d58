//! Progress reporting for pipeline execution

use chorus_application::StageProgress;
use chorus_domain::Stage;
use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::{Mutex, PoisonError};

/// Reports progress with one bar per stage
pub struct ProgressReporter {
    multi: MultiProgress,
    stage_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            stage_bar: Mutex::new(None),
        }
    }

    fn stage_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("=>-")
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl StageProgress for ProgressReporter {
    fn on_stage_start(&self, stage: Stage, total_units: usize) {
        let pb = self.multi.add(ProgressBar::new(total_units as u64));
        pb.set_style(Self::stage_style());
        pb.set_prefix(format!("{:<20}", stage.label()));
        pb.set_message("...");

        *self.stage_bar.lock().unwrap_or_else(PoisonError::into_inner) = Some(pb);
    }

    fn on_unit_complete(&self, _stage: Stage, backend: &str, success: bool) {
        if let Some(pb) = self
            .stage_bar
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            let status = if success {
                format!("{} {}", "v".green(), backend)
            } else {
                format!("{} {}", "x".red(), backend)
            };
            pb.set_message(status);
            pb.inc(1);
        }
    }

    fn on_stage_complete(&self, _stage: Stage) {
        if let Some(pb) = self
            .stage_bar
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            if let Some(len) = pb.length() {
                pb.set_position(len);
            }
            pb.finish_with_message(format!("{}", "done".green()));
        }
    }
}

/// Simple text-based progress on stderr (no fancy UI)
pub struct SimpleProgress;

impl StageProgress for SimpleProgress {
    fn on_stage_start(&self, stage: Stage, total_units: usize) {
        if total_units > 1 {
            eprintln!("{} {} ({} units)", "->".cyan(), stage.label().bold(), total_units);
        } else {
            eprintln!("{} {}", "->".cyan(), stage.label().bold());
        }
    }

    fn on_unit_complete(&self, _stage: Stage, backend: &str, success: bool) {
        if success {
            eprintln!("  {} {}", "v".green(), backend);
        } else {
            eprintln!("  {} {} (failed)", "x".red(), backend);
        }
    }

    fn on_stage_complete(&self, _stage: Stage) {}
}
