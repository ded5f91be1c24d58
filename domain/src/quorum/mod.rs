//! Cross-checking and aggregation of ensemble outputs
//!
//! # Stages
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  outputs ──▶ vote::score ──▶ VoteSummary ───────────┐        │
//! │     │                                                │        │
//! │     ├──▶ challenge::run   (iff challenge_rounds > 0) ├──▶ ConsensusBuilder
//! │     └──▶ fact_check::verify (iff factcheck_enabled)  ┘        │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! Voting is the only hard stop: with zero outputs there is nothing to
//! synthesize. Challenge and fact-check are advisory and only shift
//! confidence.

pub mod challenge;
pub mod consensus;
pub mod fact_check;
pub mod style;
pub mod vote;

pub use challenge::ChallengeFeedback;
pub use consensus::{Citation, ConsensusBuilder, ConsensusResult};
pub use fact_check::{FactCheckResult, Verdict};
pub use style::StyleNormalizer;
pub use vote::VoteSummary;
