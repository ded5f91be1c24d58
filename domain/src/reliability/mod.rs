//! Provider reliability: failure classes, provider equivalence, SLA gating

pub mod equivalence;
pub mod failure;
pub mod sla;

pub use equivalence::EquivalenceTable;
pub use failure::FailureClass;
pub use sla::{RollingWindow, SlaBreach, SlaPolicy};
