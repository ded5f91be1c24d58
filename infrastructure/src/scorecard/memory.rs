//! In-memory scorecard store with optional JSON snapshots
//!
//! One mutex guards both the running sums and the bounded interaction log,
//! so a recorded interaction is always visible in full or not at all.

use chorus_application::ScorecardStore;
use chorus_domain::{InteractionRecord, Scorecard, ScorecardBook};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tracing::{debug, info};

/// Snapshot format version written by [`InMemoryScorecardStore::save_snapshot`]
pub const SNAPSHOT_VERSION: u32 = 1;

/// Default interaction log capacity
pub const DEFAULT_MAX_INTERACTIONS: usize = 500;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported snapshot version {0}")]
    Version(u32),
}

#[derive(Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    backends: ScorecardBook,
}

struct State {
    book: ScorecardBook,
    interactions: VecDeque<InteractionRecord>,
}

pub struct InMemoryScorecardStore {
    state: Mutex<State>,
    max_interactions: usize,
}

impl InMemoryScorecardStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_INTERACTIONS)
    }

    /// Keep at most `max_interactions` records (oldest evicted first)
    pub fn with_capacity(max_interactions: usize) -> Self {
        Self {
            state: Mutex::new(State {
                book: ScorecardBook::new(),
                interactions: VecDeque::new(),
            }),
            max_interactions,
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Recorded interactions, oldest first
    pub fn interactions(&self) -> Vec<InteractionRecord> {
        self.lock().interactions.iter().cloned().collect()
    }

    pub fn interaction_count(&self) -> usize {
        self.lock().interactions.len()
    }

    /// Replace the running sums with those stored at `path`.
    ///
    /// A missing file is not an error: the store simply stays empty.
    pub fn load_snapshot(&self, path: &Path) -> Result<(), SnapshotError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No scorecard snapshot at {}", path.display());
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let snapshot: Snapshot = serde_json::from_str(&raw)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::Version(snapshot.version));
        }

        info!(
            "Loaded {} scorecard(s) from {}",
            snapshot.backends.len(),
            path.display()
        );
        self.lock().book = snapshot.backends;
        Ok(())
    }

    /// Write the running sums to `path` via a temporary file and rename
    pub fn save_snapshot(&self, path: &Path) -> Result<(), SnapshotError> {
        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            backends: self.lock().book.clone(),
        };
        let json = serde_json::to_string_pretty(&snapshot)?;

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, path)?;

        debug!("Saved scorecard snapshot to {}", path.display());
        Ok(())
    }
}

impl Default for InMemoryScorecardStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ScorecardStore for InMemoryScorecardStore {
    fn record_interaction(&self, record: &InteractionRecord) {
        let mut state = self.lock();
        state.book.record(&record.outputs);

        if self.max_interactions == 0 {
            return;
        }
        while state.interactions.len() >= self.max_interactions {
            state.interactions.pop_front();
        }
        state.interactions.push_back(record.clone());
    }

    fn get_scorecards(&self) -> Vec<Scorecard> {
        self.lock().book.scorecards()
    }
}
