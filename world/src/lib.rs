#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for padring: parties, their views, the usage
//! ledger, and the delayed broadcast network connecting them.

mod ledger;
mod network;
mod party;

use padring_core::{
    Command, Domain, Event, PartyId, SafetyViolation, ScenarioConfig, Topology,
};
use rand::Rng;
use tracing::trace;

pub use ledger::UsageLedger;
pub use network::{BroadcastMessage, Network};
pub use party::Party;

/// Represents the authoritative state of one scenario run.
#[derive(Clone, Debug)]
pub struct World {
    domain: Domain,
    topology: Topology,
    min_gap: u64,
    parties: Vec<Party>,
    ledger: UsageLedger,
    network: Network,
    delivered: Vec<BroadcastMessage>,
}

impl World {
    /// Creates a world with every party at its topology-determined starting pad
    /// and every view pointing at the other parties' starting pads.
    #[must_use]
    pub fn new(config: &ScenarioConfig) -> Self {
        let domain = config.domain();
        Self {
            domain,
            topology: config.topology,
            min_gap: config.min_gap,
            parties: build_parties(domain, config.parties, config.topology),
            ledger: UsageLedger::new(config.domain_size, PartyId::all(config.parties)),
            network: Network::new(config.delay_bound),
            delivered: Vec::new(),
        }
    }

    fn party_slot(&self, party: PartyId) -> Option<usize> {
        self.parties.iter().position(|candidate| candidate.id() == party)
    }
}

pub(crate) fn build_parties(domain: Domain, count: u32, topology: Topology) -> Vec<Party> {
    let starts: Vec<_> = PartyId::all(count)
        .map(|id| (id, topology.starting_position(id, count, domain)))
        .collect();

    starts
        .iter()
        .map(|(id, (pointer, direction))| {
            let view = starts
                .iter()
                .map(|(other, (other_pointer, _))| (*other, *other_pointer));
            Party::new(*id, *pointer, *direction, view)
        })
        .collect()
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// All randomness (broadcast delays) is drawn from `rng`. A data move whose
/// destination is already burned leaves the world untouched and returns a
/// [`SafetyViolation`]; commands naming an unknown party are ignored.
pub fn apply<R>(
    world: &mut World,
    command: Command,
    rng: &mut R,
    out_events: &mut Vec<Event>,
) -> Result<(), SafetyViolation>
where
    R: Rng + ?Sized,
{
    match command {
        Command::Tick => {
            world.delivered.clear();
            let _ = world
                .network
                .advance_tick(&mut world.parties, &mut world.delivered);
            let tick = world.network.clock();
            out_events.push(Event::TimeAdvanced { tick });
            for message in &world.delivered {
                trace!(
                    tick,
                    sender = message.sender.get(),
                    index = message.new_index.get(),
                    "broadcast delivered"
                );
                out_events.push(Event::BroadcastDelivered {
                    sender: message.sender,
                    index: message.new_index,
                    tick,
                });
            }
        }
        Command::ReserveStart { party } => {
            let Some(slot) = world.party_slot(party) else {
                return Ok(());
            };
            let index = world.parties[slot].pointer();
            if world.ledger.reserve(index) {
                out_events.push(Event::StartReserved { party, index });
            }
        }
        Command::Advance { party, kind, to } => {
            let Some(slot) = world.party_slot(party) else {
                return Ok(());
            };

            if kind.burns() {
                if world.ledger.burn(party, to).is_err() {
                    return Err(SafetyViolation {
                        party,
                        index: to,
                        tick: world.network.clock(),
                    });
                }
                out_events.push(Event::PadBurned { party, index: to });
            }

            let mover = &mut world.parties[slot];
            let from = mover.pointer();
            mover.move_to(to);
            out_events.push(Event::PartyAdvanced {
                party,
                from,
                to,
                kind,
            });

            let delivery_tick = world.network.schedule_broadcast(party, to, rng);
            out_events.push(Event::BroadcastScheduled {
                sender: party,
                index: to,
                delivery_tick,
            });
        }
    }

    Ok(())
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{Network, Party, UsageLedger, World};
    use padring_core::{Domain, PadIndex, PartyId, Topology};

    /// Circular domain the parties share.
    #[must_use]
    pub fn domain(world: &World) -> Domain {
        world.domain
    }

    /// Topology the parties were arranged with.
    #[must_use]
    pub fn topology(world: &World) -> Topology {
        world.topology
    }

    /// Minimum gap a mover must keep from its neighbor.
    #[must_use]
    pub fn min_gap(world: &World) -> u64 {
        world.min_gap
    }

    /// Number of parties in the world.
    #[must_use]
    pub fn party_count(world: &World) -> u32 {
        u32::try_from(world.parties.len()).unwrap_or(u32::MAX)
    }

    /// Every party in ascending identifier order.
    #[must_use]
    pub fn parties(world: &World) -> &[Party] {
        &world.parties
    }

    /// Looks up a single party.
    #[must_use]
    pub fn party(world: &World, id: PartyId) -> Option<&Party> {
        world.party_slot(id).map(|slot| &world.parties[slot])
    }

    /// Provides read-only access to the usage ledger.
    #[must_use]
    pub fn ledger(world: &World) -> &UsageLedger {
        &world.ledger
    }

    /// Reports whether `index` has been burned.
    #[must_use]
    pub fn is_burned(world: &World, index: PadIndex) -> bool {
        world.ledger.is_burned(index)
    }

    /// Provides read-only access to the broadcast network.
    #[must_use]
    pub fn network(world: &World) -> &Network {
        &world.network
    }

    /// Current value of the network clock.
    #[must_use]
    pub fn clock(world: &World) -> u64 {
        world.network.clock()
    }

    /// Reports whether no broadcast is in flight.
    #[must_use]
    pub fn network_idle(world: &World) -> bool {
        world.network.is_idle()
    }
}
