use thiserror::Error;

use crate::{PadIndex, PartyId};

/// Reasons a scenario configuration is rejected before the run starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No parties were requested.
    #[error("at least one party is required")]
    NoParties,
    /// The minimum gap must be at least one pad.
    #[error("minimum gap must be at least 1")]
    GapTooSmall,
    /// More active parties were requested than parties exist.
    #[error("{active} active parties requested but only {parties} parties exist")]
    TooManyActive {
        /// Requested number of active parties.
        active: u32,
        /// Total number of parties.
        parties: u32,
    },
    /// The iteration cap must allow at least one tick.
    #[error("iteration cap must be at least 1")]
    ZeroIterationCap,
    /// The domain cannot hold every party together with its gap.
    #[error("domain of {domain_size} pads cannot fit {parties} parties with gap {min_gap}")]
    DomainTooSmall {
        /// Requested domain size.
        domain_size: u64,
        /// Requested number of parties.
        parties: u32,
        /// Requested minimum gap.
        min_gap: u64,
    },
}

/// A data move targeted a pad that was already burned.
///
/// This signals an inconsistency between the gap check and the usage ledger
/// and always aborts the run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("party {party} attempted to reuse burned pad {index} at tick {tick}")]
pub struct SafetyViolation {
    /// Party that attempted the move.
    pub party: PartyId,
    /// Pad that was already burned.
    pub index: PadIndex,
    /// Network clock value when the attempt happened.
    pub tick: u64,
}

/// Errors that abort a scenario run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SimulationError {
    /// The configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),
    /// A pad was about to be burned twice.
    #[error("safety invariant violated: {0}")]
    SafetyInvariantViolation(#[from] SafetyViolation),
}
