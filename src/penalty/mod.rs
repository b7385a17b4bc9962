pub mod engine;
pub mod sweep;

pub use engine::{PenaltyDecision, PenaltyEngine};
pub use sweep::{AppliedPenalty, PenaltySweep, ProposedPenalty, SweepReport};
