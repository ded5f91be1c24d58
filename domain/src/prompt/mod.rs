//! Prompt planning
//!
//! Turns a raw query into a [`PromptPlan`]: the canonical prompt, its ordered
//! segments, and the competing variants used for self-consistency sampling.

pub mod plan;

pub use plan::{PromptPlan, optimize, strip_instructions};
