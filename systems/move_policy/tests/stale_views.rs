use padring_core::{Command, MoveClass, MoveKind, PadIndex, PartyId, ScenarioConfig, Topology};
use padring_system_move_policy::MovePolicy;
use padring_world::{self as world, query, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[test]
fn classification_uses_last_delivered_position_not_ground_truth() {
    let config = ScenarioConfig::new(100, 2, 5, 2, Topology::TwoPointer).with_delay_bound(0);
    let mut world = World::new(&config);
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut events = Vec::new();
    let forward = PartyId::new(1);
    let backward = PartyId::new(2);

    world::apply(
        &mut world,
        Command::Advance {
            party: backward,
            kind: MoveKind::Yield,
            to: PadIndex::new(4),
        },
        &mut rng,
        &mut events,
    )
    .expect("yield never fails");

    // The broadcast is still in flight, so party 1 believes the gap is 99.
    assert!(!query::network_idle(&world));
    assert_eq!(
        MovePolicy::TwoPointer.classify(&world, forward),
        MoveClass::Data {
            next: PadIndex::new(1)
        }
    );

    world::apply(&mut world, Command::Tick, &mut rng, &mut events).expect("tick");
    assert_eq!(
        MovePolicy::TwoPointer.classify(&world, forward),
        MoveClass::Blocked
    );
}

#[test]
fn ring_views_lag_behind_a_successor_that_only_moves_away() {
    let config = ScenarioConfig::new(100, 2, 5, 2, Topology::Ring).with_delay_bound(0);
    let mut world = World::new(&config);
    let mut rng = ChaCha8Rng::seed_from_u64(4);
    let mut events = Vec::new();

    for to in 51..=55 {
        world::apply(
            &mut world,
            Command::Advance {
                party: PartyId::new(2),
                kind: MoveKind::Data,
                to: PadIndex::new(to),
            },
            &mut rng,
            &mut events,
        )
        .expect("fresh pads");
    }

    let stale = MovePolicy::Ring
        .neighbor(&world, PartyId::new(1))
        .expect("ring successor");
    assert_eq!(stale.gap, 50);

    world::apply(&mut world, Command::Tick, &mut rng, &mut events).expect("tick");
    let fresh = MovePolicy::Ring
        .neighbor(&world, PartyId::new(1))
        .expect("ring successor");
    assert_eq!(fresh.gap, 55);
    assert!(fresh.gap >= stale.gap);
}
