#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure move-policy system that classifies each party's candidate move.
//!
//! A policy only reads the world: the mover's pointer, its possibly stale view
//! of the other parties, and the usage ledger. The gap to the relevant neighbor
//! must be strictly greater than the configured minimum gap for any move to be
//! legal.

use padring_core::{Direction, MoveClass, PadIndex, PartyId, Topology};
use padring_world::{query, Party, World};

/// Neighbor-selection rule shared by every party in a scenario.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MovePolicy {
    /// Each party guards its cyclic successor and travels forward.
    Ring,
    /// Each party guards the nearest known party travelling the other way.
    TwoPointer,
}

impl From<Topology> for MovePolicy {
    fn from(topology: Topology) -> Self {
        match topology {
            Topology::Ring => Self::Ring,
            Topology::TwoPointer => Self::TwoPointer,
        }
    }
}

/// Neighbor a mover must keep its distance from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Neighbor {
    /// Identifier of the neighbor.
    pub id: PartyId,
    /// Position of the neighbor as last delivered to the mover.
    pub known_position: PadIndex,
    /// Distance from the mover to that position in the mover's direction.
    pub gap: u64,
}

impl MovePolicy {
    /// Classifies the candidate move of `party`.
    ///
    /// Unknown parties and parties without a neighbor are [`MoveClass::Blocked`].
    #[must_use]
    pub fn classify(&self, world: &World, party: PartyId) -> MoveClass {
        let Some(mover) = query::party(world, party) else {
            return MoveClass::Blocked;
        };
        let Some(neighbor) = self.neighbor_of(world, mover) else {
            return MoveClass::Blocked;
        };
        if neighbor.gap <= query::min_gap(world) {
            return MoveClass::Blocked;
        }

        let next = query::domain(world).step(mover.pointer(), mover.direction());
        if query::is_burned(world, next) {
            MoveClass::Drift { next }
        } else {
            MoveClass::Data { next }
        }
    }

    /// Neighbor that constrains `party`, as seen through its own view.
    #[must_use]
    pub fn neighbor(&self, world: &World, party: PartyId) -> Option<Neighbor> {
        query::party(world, party).and_then(|mover| self.neighbor_of(world, mover))
    }

    fn neighbor_of(&self, world: &World, mover: &Party) -> Option<Neighbor> {
        let domain = query::domain(world);
        match self {
            Self::Ring => {
                let count = query::party_count(world);
                if count == 0 {
                    return None;
                }
                let successor = PartyId::new(mover.id().get() % count + 1);
                let known_position = mover.known_position(successor)?;
                Some(Neighbor {
                    id: successor,
                    known_position,
                    gap: domain.forward_distance(mover.pointer(), known_position),
                })
            }
            Self::TwoPointer => {
                let opposite = mover.direction().opposite();
                mover
                    .view()
                    .filter(|(id, _)| travel_direction(*id) == opposite)
                    .map(|(id, known_position)| Neighbor {
                        id,
                        known_position,
                        gap: domain.distance_along(
                            mover.direction(),
                            mover.pointer(),
                            known_position,
                        ),
                    })
                    .min_by_key(|neighbor| (neighbor.gap, neighbor.id))
            }
        }
    }
}

fn travel_direction(party: PartyId) -> Direction {
    if party.is_odd() {
        Direction::Forward
    } else {
        Direction::Backward
    }
}
