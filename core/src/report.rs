use std::collections::BTreeMap;

use serde::Serialize;

use crate::PartyId;

/// Reason a scenario run stopped without error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Termination {
    /// No party could legally move and no broadcast remained in flight.
    Clinch,
    /// The parties burned every pad they are allowed to burn.
    Saturated,
    /// The iteration cap was reached before the run settled.
    NonConvergence {
        /// Cap that was exhausted.
        cap: u64,
    },
}

impl Termination {
    /// Reports whether the run reached a stable terminal state.
    #[must_use]
    pub const fn converged(&self) -> bool {
        !matches!(self, Self::NonConvergence { .. })
    }
}

/// Outcome of a completed scenario run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScenarioReport {
    /// Number of pads that were never burned.
    pub waste: u64,
    /// Number of pads that were burned, including reserved starting pads.
    pub burned: u64,
    /// Fraction of the domain that was burned.
    pub utilization: f64,
    /// Pads consumed by data moves, per party.
    pub used_counts: BTreeMap<PartyId, u64>,
    /// Parties that were allowed to burn pads.
    pub active: Vec<PartyId>,
    /// Reason the run stopped.
    pub termination: Termination,
    /// Number of ticks executed.
    pub ticks: u64,
}
