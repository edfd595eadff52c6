use std::collections::BTreeMap;

use padring_core::{Direction, PadIndex, PartyId};

/// Local state of a single party: its own pointer and its view of everyone else.
///
/// The view is whatever the network last delivered and may lag behind the
/// true positions by up to the network's delay bound.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Party {
    id: PartyId,
    pointer: PadIndex,
    direction: Direction,
    view: BTreeMap<PartyId, PadIndex>,
}

impl Party {
    /// Creates a party at `pointer` with the provided initial view of the others.
    ///
    /// Any entry for the party's own identifier is discarded.
    #[must_use]
    pub fn new(
        id: PartyId,
        pointer: PadIndex,
        direction: Direction,
        view: impl IntoIterator<Item = (PartyId, PadIndex)>,
    ) -> Self {
        let view = view.into_iter().filter(|(other, _)| *other != id).collect();
        Self {
            id,
            pointer,
            direction,
            view,
        }
    }

    /// Identifier of the party.
    #[must_use]
    pub const fn id(&self) -> PartyId {
        self.id
    }

    /// Index the party currently occupies.
    #[must_use]
    pub const fn pointer(&self) -> PadIndex {
        self.pointer
    }

    /// Direction the party travels in.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Last position of `other` delivered to this party, if any.
    #[must_use]
    pub fn known_position(&self, other: PartyId) -> Option<PadIndex> {
        self.view.get(&other).copied()
    }

    /// Iterator over the party's view in ascending identifier order.
    pub fn view(&self) -> impl Iterator<Item = (PartyId, PadIndex)> + '_ {
        self.view.iter().map(|(id, index)| (*id, *index))
    }

    /// Overwrites the known position of `sender`.
    ///
    /// No ordering or staleness check happens here; a late delivery of an older
    /// position replaces a newer one.
    pub fn update_view(&mut self, sender: PartyId, index: PadIndex) {
        let _ = self.view.insert(sender, index);
    }

    pub(crate) fn move_to(&mut self, index: PadIndex) {
        self.pointer = index;
    }
}
