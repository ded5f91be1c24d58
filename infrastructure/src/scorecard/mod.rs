//! Scorecard persistence

mod memory;

pub use memory::{
    DEFAULT_MAX_INTERACTIONS, InMemoryScorecardStore, SNAPSHOT_VERSION, SnapshotError,
};
