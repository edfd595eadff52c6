#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Scenario driver that runs the tick loop of a single padring simulation.
//!
//! Every tick the driver delivers due broadcasts, asks the move policy to
//! classify each party, and applies at most one move: an eligible active party
//! is preferred, otherwise an eligible silent party yields. Ties are broken
//! uniformly at random with the scenario's seeded generator. The run stops on
//! a clinch, once the utilization ceiling is reached, or at the iteration cap.

use padring_core::{
    Command, Event, MoveClass, MoveKind, PadIndex, PartyId, ScenarioConfig, ScenarioReport,
    SimulationError, Termination, Topology,
};
use padring_system_move_policy::MovePolicy;
use padring_world::{self as world, query, World};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, error, info};

/// Result of executing a single tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// One party advanced its pointer.
    Moved {
        /// Party that moved.
        party: PartyId,
        /// Kind of move that was applied.
        kind: MoveKind,
        /// Destination of the move.
        to: PadIndex,
    },
    /// Nobody could move but broadcasts are still in flight.
    Waiting,
    /// Nobody could move and the network is idle.
    Clinched,
}

/// Owns the world, the policy and the random source of one scenario run.
#[derive(Debug)]
pub struct ScenarioDriver {
    config: ScenarioConfig,
    world: World,
    policy: MovePolicy,
    rng: ChaCha8Rng,
    active: Vec<PartyId>,
    silent: Vec<PartyId>,
    ceiling: u64,
    ticks: u64,
    events: Vec<Event>,
    scratch: Vec<Event>,
}

impl ScenarioDriver {
    /// Validates the configuration, samples the active parties and reserves
    /// their starting pads.
    pub fn new(config: ScenarioConfig) -> Result<Self, SimulationError> {
        config.validate()?;

        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let active = sample_active(&mut rng, config.parties, config.active_parties);
        let silent = PartyId::all(config.parties)
            .filter(|party| active.binary_search(party).is_err())
            .collect();

        let world = World::new(&config);
        let mut driver = Self {
            policy: MovePolicy::from(query::topology(&world)),
            world,
            ceiling: config.utilization_ceiling(),
            config,
            rng,
            active,
            silent,
            ticks: 0,
            events: Vec::new(),
            scratch: Vec::new(),
        };

        for party in driver.active.clone() {
            driver.apply(Command::ReserveStart { party })?;
        }

        Ok(driver)
    }

    /// Configuration the driver was created with.
    #[must_use]
    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    /// Read-only access to the simulated world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Policy used to classify moves.
    #[must_use]
    pub fn policy(&self) -> MovePolicy {
        self.policy
    }

    /// Parties allowed to burn pads, in ascending order.
    #[must_use]
    pub fn active(&self) -> &[PartyId] {
        &self.active
    }

    /// Parties that only yield, in ascending order.
    #[must_use]
    pub fn silent(&self) -> &[PartyId] {
        &self.silent
    }

    /// Number of ticks executed so far.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Every world event emitted so far. Empty unless event recording is enabled.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Reports whether the burned set reached the utilization ceiling.
    #[must_use]
    pub fn is_saturated(&self) -> bool {
        query::ledger(&self.world).burned_count() >= self.ceiling
    }

    /// Executes exactly one tick.
    pub fn step(&mut self) -> Result<TickOutcome, SimulationError> {
        self.ticks += 1;
        self.apply(Command::Tick)?;

        let delivered = self
            .scratch
            .iter()
            .filter(|event| matches!(event, Event::BroadcastDelivered { .. }))
            .count();
        if delivered > 0 {
            debug!(tick = self.ticks, delivered, "broadcasts delivered");
        }

        let Some((party, kind, to)) = self.choose_mover() else {
            if query::network_idle(&self.world) {
                return Ok(TickOutcome::Clinched);
            }
            return Ok(TickOutcome::Waiting);
        };

        self.apply(Command::Advance { party, kind, to })?;
        debug!(tick = self.ticks, %party, ?kind, %to, "party advanced");
        Ok(TickOutcome::Moved { party, kind, to })
    }

    /// Runs ticks until the scenario terminates and reports the outcome.
    pub fn run(mut self) -> Result<ScenarioReport, SimulationError> {
        info!(
            n = self.config.domain_size,
            m = self.config.parties,
            d = self.config.min_gap,
            x = self.config.active_parties,
            topology = %self.config.topology,
            delay_bound = query::network(&self.world).delay_bound(),
            seed = self.config.seed,
            "scenario started"
        );

        let termination = loop {
            if self.is_saturated() {
                break Termination::Saturated;
            }
            if self.ticks >= self.config.iteration_cap {
                break Termination::NonConvergence {
                    cap: self.config.iteration_cap,
                };
            }
            if self.step()? == TickOutcome::Clinched {
                break Termination::Clinch;
            }
        };

        let report = self.report(termination);
        info!(
            ?termination,
            ticks = report.ticks,
            waste = report.waste,
            "scenario finished"
        );
        Ok(report)
    }

    /// Summarises the current state under the provided termination reason.
    #[must_use]
    pub fn report(&self, termination: Termination) -> ScenarioReport {
        let ledger = query::ledger(&self.world);
        ScenarioReport {
            waste: ledger.waste(),
            burned: ledger.burned_count(),
            utilization: ledger.utilization(),
            used_counts: ledger.used_counts().clone(),
            active: self.active.clone(),
            termination,
            ticks: self.ticks,
        }
    }

    fn choose_mover(&mut self) -> Option<(PartyId, MoveKind, PadIndex)> {
        let active: Vec<_> = self
            .active
            .iter()
            .filter_map(|&party| match self.policy.classify(&self.world, party) {
                MoveClass::Data { next } => Some((party, MoveKind::Data, next)),
                MoveClass::Drift { next } => Some((party, MoveKind::Drift, next)),
                MoveClass::Blocked => None,
            })
            .collect();
        if let Some(mover) = active.choose(&mut self.rng) {
            return Some(*mover);
        }

        let silent: Vec<_> = self
            .silent
            .iter()
            .filter_map(|&party| {
                self.policy
                    .classify(&self.world, party)
                    .target()
                    .map(|next| (party, MoveKind::Yield, next))
            })
            .collect();
        silent.choose(&mut self.rng).copied()
    }

    fn apply(&mut self, command: Command) -> Result<(), SimulationError> {
        self.scratch.clear();
        let result = world::apply(&mut self.world, command, &mut self.rng, &mut self.scratch);
        if self.config.record_events {
            self.events.extend_from_slice(&self.scratch);
        }
        result.map_err(|violation| {
            error!(%violation, "safety invariant violated");
            SimulationError::from(violation)
        })
    }
}

fn sample_active<R>(rng: &mut R, parties: u32, active: u32) -> Vec<PartyId>
where
    R: Rng + ?Sized,
{
    let ids: Vec<_> = PartyId::all(parties).collect();
    let amount = usize::try_from(active).unwrap_or(ids.len()).min(ids.len());
    let mut chosen: Vec<_> = rand::seq::index::sample(rng, ids.len(), amount)
        .into_iter()
        .map(|slot| ids[slot])
        .collect();
    chosen.sort_unstable();
    chosen
}

/// Runs one scenario described by `config`.
pub fn run(config: &ScenarioConfig) -> Result<ScenarioReport, SimulationError> {
    ScenarioDriver::new(config.clone())?.run()
}

/// Runs one scenario with the delay bound equal to `min_gap` and the default
/// iteration cap.
pub fn run_scenario(
    domain_size: u64,
    parties: u32,
    min_gap: u64,
    active_parties: u32,
    topology: Topology,
    seed: u64,
) -> Result<ScenarioReport, SimulationError> {
    run(&ScenarioConfig::new(domain_size, parties, min_gap, active_parties, topology).with_seed(seed))
}
