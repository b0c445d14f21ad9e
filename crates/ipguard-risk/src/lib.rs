//! Pure, I/O-free scoring: the initial-risk factor table (C2) and the rescoring formula
//! and view-velocity classifier (C10/C11). Nothing in this crate touches the network,
//! the clock's wall time source aside, or persistence.

pub mod initial;
pub mod scorer;
pub mod velocity;

pub use initial::{initial_risk, InitialScoringFactor, InitialScoringInput};
pub use scorer::{rescore, ScoringFactor, ScoringOutcome};
pub use velocity::{velocity, VelocityResult, VelocityTier};
