#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the padring simulation.
//!
//! This crate defines the message surface that connects the scenario driver,
//! the authoritative world, and the pure move-policy system. The driver submits
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then reports [`Event`] values
//! describing what changed. Policies query immutable world state and respond
//! with a [`MoveClass`] per party; they never mutate anything themselves.

mod config;
mod error;
mod report;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use config::ScenarioConfig;
pub use error::{ConfigError, SafetyViolation, SimulationError};
pub use report::{ScenarioReport, Termination};

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Advances the network clock by one tick and delivers every due broadcast.
    Tick,
    /// Marks the starting pad of an active party as consumed before the run begins.
    ReserveStart {
        /// Party whose starting pointer is reserved.
        party: PartyId,
    },
    /// Moves a party one step to the provided index and broadcasts the new position.
    Advance {
        /// Identifier of the party that moves.
        party: PartyId,
        /// Whether the move consumes the destination pad.
        kind: MoveKind,
        /// Destination index of the move.
        to: PadIndex,
    },
}

/// Events reported by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// Indicates that the network clock advanced.
    TimeAdvanced {
        /// Value of the clock after the tick.
        tick: u64,
    },
    /// Confirms that a queued broadcast reached every party except its sender.
    BroadcastDelivered {
        /// Party that originated the broadcast.
        sender: PartyId,
        /// Position carried by the broadcast.
        index: PadIndex,
        /// Tick at which the broadcast was delivered.
        tick: u64,
    },
    /// Confirms that a party's starting pad was reserved.
    StartReserved {
        /// Party that owns the starting pad.
        party: PartyId,
        /// Index of the reserved pad.
        index: PadIndex,
    },
    /// Confirms that a party moved between two indices.
    PartyAdvanced {
        /// Identifier of the party that moved.
        party: PartyId,
        /// Index occupied before the move.
        from: PadIndex,
        /// Index occupied after the move.
        to: PadIndex,
        /// Kind of move that was applied.
        kind: MoveKind,
    },
    /// Confirms that a fresh pad was consumed by a data move.
    PadBurned {
        /// Party that consumed the pad.
        party: PartyId,
        /// Index of the consumed pad.
        index: PadIndex,
    },
    /// Confirms that a position broadcast entered the network queue.
    BroadcastScheduled {
        /// Party that originated the broadcast.
        sender: PartyId,
        /// Position carried by the broadcast.
        index: PadIndex,
        /// Earliest tick at which the broadcast will be delivered.
        delivery_tick: u64,
    },
}

/// Unique identifier assigned to a party. Identifiers start at one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PartyId(u32);

impl PartyId {
    /// Creates a new party identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Reports whether the identifier is odd.
    #[must_use]
    pub const fn is_odd(&self) -> bool {
        self.0 % 2 == 1
    }

    /// Iterates the identifiers `1..=count` in ascending order.
    pub fn all(count: u32) -> impl Iterator<Item = PartyId> {
        (1..=count).map(PartyId::new)
    }
}

impl fmt::Display for PartyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Position of a single pad within the circular domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PadIndex(u64);

impl PadIndex {
    /// Creates a new pad index wrapper.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the underlying index.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for PadIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Direction of travel around the circular domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Movement toward increasing indices.
    Forward,
    /// Movement toward decreasing indices.
    Backward,
}

impl Direction {
    /// Returns the direction pointing the other way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }
}

/// Circular index space of a fixed size. All arithmetic wraps modulo the size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Domain {
    size: u64,
}

impl Domain {
    /// Creates a domain spanning `size` pads. The size must be non-zero.
    #[must_use]
    pub const fn new(size: u64) -> Self {
        Self { size }
    }

    /// Number of pads in the domain.
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Index reached by taking one step from `index` in `direction`.
    #[must_use]
    pub const fn step(&self, index: PadIndex, direction: Direction) -> PadIndex {
        let value = index.get() % self.size;
        match direction {
            Direction::Forward if value == self.size - 1 => PadIndex::new(0),
            Direction::Forward => PadIndex::new(value + 1),
            Direction::Backward if value == 0 => PadIndex::new(self.size - 1),
            Direction::Backward => PadIndex::new(value - 1),
        }
    }

    /// Number of forward steps required to travel from `from` to `to`.
    #[must_use]
    pub const fn forward_distance(&self, from: PadIndex, to: PadIndex) -> u64 {
        let from = from.get() % self.size;
        let to = to.get() % self.size;
        if to >= from {
            to - from
        } else {
            self.size - (from - to)
        }
    }

    /// Number of backward steps required to travel from `from` to `to`.
    #[must_use]
    pub const fn backward_distance(&self, from: PadIndex, to: PadIndex) -> u64 {
        self.forward_distance(to, from)
    }

    /// Number of steps in `direction` required to travel from `from` to `to`.
    #[must_use]
    pub const fn distance_along(&self, direction: Direction, from: PadIndex, to: PadIndex) -> u64 {
        match direction {
            Direction::Forward => self.forward_distance(from, to),
            Direction::Backward => self.backward_distance(from, to),
        }
    }
}

/// Arrangement of parties around the domain and the neighbor each one respects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Topology {
    /// Parties start evenly spaced and all travel forward, each guarding its cyclic successor.
    #[default]
    Ring,
    /// Odd parties travel forward from the first pad, even parties backward from the last.
    TwoPointer,
}

impl Topology {
    /// Starting pointer and direction of travel for `party` among `parties` participants.
    ///
    /// Ring parties are spread `size / parties` pads apart starting from index zero.
    /// Two-pointer parties are split by identifier parity across both ends of the
    /// domain.
    #[must_use]
    pub fn starting_position(
        self,
        party: PartyId,
        parties: u32,
        domain: Domain,
    ) -> (PadIndex, Direction) {
        match self {
            Self::Ring => {
                let spacing = domain.size() / u64::from(parties.max(1));
                let offset = u64::from(party.get().saturating_sub(1)) * spacing;
                (PadIndex::new(offset % domain.size()), Direction::Forward)
            }
            Self::TwoPointer => {
                if party.is_odd() {
                    (PadIndex::new(0), Direction::Forward)
                } else {
                    (
                        PadIndex::new(domain.size().saturating_sub(1)),
                        Direction::Backward,
                    )
                }
            }
        }
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ring => f.write_str("ring"),
            Self::TwoPointer => f.write_str("two-pointer"),
        }
    }
}

/// Kind of move applied to a party by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveKind {
    /// Consumes the fresh destination pad.
    Data,
    /// Skips over an already consumed pad without consuming anything.
    Drift,
    /// Pointer advance performed by a silent party to clear space for others.
    Yield,
}

impl MoveKind {
    /// Reports whether the move consumes its destination pad.
    #[must_use]
    pub const fn burns(self) -> bool {
        matches!(self, Self::Data)
    }
}

/// Classification of a party's candidate move produced by a move policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveClass {
    /// The candidate pad is fresh and the gap check passed.
    Data {
        /// Candidate destination index.
        next: PadIndex,
    },
    /// The candidate pad is already burned but the gap check passed.
    Drift {
        /// Candidate destination index.
        next: PadIndex,
    },
    /// The gap check failed; no move is legal this tick.
    Blocked,
}

impl MoveClass {
    /// Reports whether any move is legal.
    #[must_use]
    pub const fn is_eligible(&self) -> bool {
        !matches!(self, Self::Blocked)
    }

    /// Destination of the candidate move, if one is legal.
    #[must_use]
    pub const fn target(&self) -> Option<PadIndex> {
        match self {
            Self::Data { next } | Self::Drift { next } => Some(*next),
            Self::Blocked => None,
        }
    }
}
