use padring_core::{PadIndex, PartyId};
use rand::Rng;

use crate::Party;

/// Position update travelling through the network.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BroadcastMessage {
    /// Tick at or after which the message is delivered.
    pub delivery_tick: u64,
    /// Party that moved.
    pub sender: PartyId,
    /// Position the sender moved to.
    pub new_index: PadIndex,
}

/// In-memory broadcast channel that delivers each message after a bounded delay.
///
/// The clock only advances through [`Network::advance_tick`]. A message
/// scheduled at clock `T` with delay `k` becomes visible during the first tick
/// whose clock value is at least `T + k`, and never earlier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Network {
    delay_bound: u64,
    clock: u64,
    pending: Vec<BroadcastMessage>,
}

impl Network {
    /// Creates an idle network at clock zero.
    #[must_use]
    pub fn new(delay_bound: u64) -> Self {
        Self {
            delay_bound,
            clock: 0,
            pending: Vec::new(),
        }
    }

    /// Maximum delay a broadcast may experience.
    #[must_use]
    pub const fn delay_bound(&self) -> u64 {
        self.delay_bound
    }

    /// Current value of the logical clock.
    #[must_use]
    pub const fn clock(&self) -> u64 {
        self.clock
    }

    /// Reports whether no broadcast is in flight.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    /// Messages still in flight, in scheduling order.
    #[must_use]
    pub fn pending(&self) -> &[BroadcastMessage] {
        &self.pending
    }

    /// Queues a broadcast with a delay drawn uniformly from `[0, delay_bound]`.
    ///
    /// Returns the tick at which the message becomes deliverable.
    pub fn schedule_broadcast<R>(&mut self, sender: PartyId, new_index: PadIndex, rng: &mut R) -> u64
    where
        R: Rng + ?Sized,
    {
        let delay = rng.gen_range(0..=self.delay_bound);
        self.schedule_broadcast_after(sender, new_index, delay)
    }

    /// Queues a broadcast with an explicit delay, clamped to the delay bound.
    pub fn schedule_broadcast_after(&mut self, sender: PartyId, new_index: PadIndex, delay: u64) -> u64 {
        let delivery_tick = self
            .clock
            .saturating_add(delay.min(self.delay_bound));
        self.pending.push(BroadcastMessage {
            delivery_tick,
            sender,
            new_index,
        });
        delivery_tick
    }

    /// Advances the clock by one tick and delivers every due message.
    ///
    /// Each delivered message overwrites the sender's entry in every other
    /// party's view, in scheduling order. Delivered messages are appended to
    /// `delivered`. Returns whether anything was delivered.
    pub fn advance_tick(&mut self, parties: &mut [Party], delivered: &mut Vec<BroadcastMessage>) -> bool {
        self.clock += 1;
        let clock = self.clock;

        let (due, retained): (Vec<_>, Vec<_>) = self
            .pending
            .drain(..)
            .partition(|message| message.delivery_tick <= clock);
        self.pending = retained;

        for message in &due {
            for party in parties.iter_mut().filter(|party| party.id() != message.sender) {
                party.update_view(message.sender, message.new_index);
            }
        }

        let any = !due.is_empty();
        delivered.extend(due);
        any
    }
}

#[cfg(test)]
mod tests {
    use super::Network;
    use crate::build_parties;
    use padring_core::{Domain, PadIndex, PartyId, Topology};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn maximal_delay_is_visible_exactly_at_the_bound() {
        let mut parties = build_parties(Domain::new(100), 2, Topology::Ring);
        let mut network = Network::new(3);
        let mut delivered = Vec::new();
        let sender = PartyId::new(1);
        let receiver = PartyId::new(2);

        for _ in 0..4 {
            let _ = network.advance_tick(&mut parties, &mut delivered);
        }
        let scheduled_at = network.clock();
        let delivery = network.schedule_broadcast_after(sender, PadIndex::new(50), 3);
        assert_eq!(delivery, scheduled_at + 3);

        for _ in 0..2 {
            assert!(!network.advance_tick(&mut parties, &mut delivered));
            assert_eq!(parties[1].known_position(sender), Some(PadIndex::new(0)));
        }

        assert!(network.advance_tick(&mut parties, &mut delivered));
        assert_eq!(network.clock(), scheduled_at + 3);
        assert_eq!(parties[1].known_position(sender), Some(PadIndex::new(50)));
        assert_eq!(parties[0].known_position(sender), None);
        assert_eq!(parties[0].known_position(receiver), Some(PadIndex::new(50)));
        assert!(network.is_idle());
        assert_eq!(delivered.len(), 1);
    }

    #[test]
    fn zero_delay_is_delivered_on_the_next_tick() {
        let mut parties = build_parties(Domain::new(100), 3, Topology::Ring);
        let mut network = Network::new(0);
        let mut delivered = Vec::new();

        let _ = network.schedule_broadcast_after(PartyId::new(2), PadIndex::new(40), 5);
        assert_eq!(network.pending()[0].delivery_tick, 0);
        assert!(network.advance_tick(&mut parties, &mut delivered));
        assert_eq!(
            parties[0].known_position(PartyId::new(2)),
            Some(PadIndex::new(40))
        );
        assert_eq!(
            parties[2].known_position(PartyId::new(2)),
            Some(PadIndex::new(40))
        );
    }

    #[test]
    fn later_delivery_of_older_position_wins() {
        let mut parties = build_parties(Domain::new(100), 2, Topology::Ring);
        let mut network = Network::new(5);
        let mut delivered = Vec::new();
        let sender = PartyId::new(1);

        let _ = network.schedule_broadcast_after(sender, PadIndex::new(1), 5);
        let _ = network.schedule_broadcast_after(sender, PadIndex::new(2), 1);
        for _ in 0..5 {
            let _ = network.advance_tick(&mut parties, &mut delivered);
        }
        assert_eq!(parties[1].known_position(sender), Some(PadIndex::new(1)));
    }

    #[test]
    fn sampled_delays_stay_within_bound() {
        let mut network = Network::new(4);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..200 {
            let delivery = network.schedule_broadcast(PartyId::new(1), PadIndex::new(0), &mut rng);
            assert!(delivery <= network.clock() + 4);
        }
        assert!(network.pending().iter().any(|message| message.delivery_tick == 0));
        assert!(network.pending().iter().any(|message| message.delivery_tick == 4));
    }
}
