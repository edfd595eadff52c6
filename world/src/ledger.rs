use std::collections::{BTreeMap, BTreeSet};

use padring_core::{PadIndex, PartyId};

/// Set of burned pads plus the number of pads each party consumed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UsageLedger {
    domain_size: u64,
    burned: BTreeSet<PadIndex>,
    used: BTreeMap<PartyId, u64>,
}

/// A pad was already present in the ledger when a burn was attempted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct AlreadyBurned;

impl UsageLedger {
    pub(crate) fn new(domain_size: u64, parties: impl IntoIterator<Item = PartyId>) -> Self {
        Self {
            domain_size,
            burned: BTreeSet::new(),
            used: parties.into_iter().map(|party| (party, 0)).collect(),
        }
    }

    /// Marks a starting pad as consumed. Reserving an already burned pad is a no-op.
    pub(crate) fn reserve(&mut self, index: PadIndex) -> bool {
        self.burned.insert(index)
    }

    /// Consumes `index` on behalf of `party`.
    pub(crate) fn burn(&mut self, party: PartyId, index: PadIndex) -> Result<(), AlreadyBurned> {
        if !self.burned.insert(index) {
            return Err(AlreadyBurned);
        }
        *self.used.entry(party).or_insert(0) += 1;
        Ok(())
    }

    /// Reports whether `index` was consumed.
    #[must_use]
    pub fn is_burned(&self, index: PadIndex) -> bool {
        self.burned.contains(&index)
    }

    /// Number of consumed pads.
    #[must_use]
    pub fn burned_count(&self) -> u64 {
        self.burned.len() as u64
    }

    /// Consumed pads in ascending order.
    pub fn burned(&self) -> impl Iterator<Item = PadIndex> + '_ {
        self.burned.iter().copied()
    }

    /// Number of pads consumed by data moves of `party`.
    #[must_use]
    pub fn used_count(&self, party: PartyId) -> u64 {
        self.used.get(&party).copied().unwrap_or(0)
    }

    /// Data-move counts for every party.
    #[must_use]
    pub fn used_counts(&self) -> &BTreeMap<PartyId, u64> {
        &self.used
    }

    /// Number of pads that were never consumed.
    #[must_use]
    pub fn waste(&self) -> u64 {
        self.domain_size.saturating_sub(self.burned_count())
    }

    /// Fraction of the domain that was consumed.
    #[must_use]
    pub fn utilization(&self) -> f64 {
        if self.domain_size == 0 {
            return 0.0;
        }
        (self.domain_size - self.waste()) as f64 / self.domain_size as f64
    }
}
