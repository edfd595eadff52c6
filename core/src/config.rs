use crate::{ConfigError, Domain, Topology};

/// Factor applied to the domain size to derive the default iteration cap.
const DEFAULT_CAP_FACTOR: u64 = 10;

/// Complete description of a single scenario run.
///
/// The minimum gap and the network's maximum broadcast delay are independent
/// parameters. [`ScenarioConfig::new`] initialises the delay bound to the gap
/// and the iteration cap to ten ticks per pad; both can be overridden.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScenarioConfig {
    /// Number of pads in the circular domain (`n`).
    pub domain_size: u64,
    /// Number of participating parties (`m`).
    pub parties: u32,
    /// Minimum circular distance a mover must keep from its neighbor (`d`).
    pub min_gap: u64,
    /// Maximum number of ticks a broadcast may spend in flight.
    pub delay_bound: u64,
    /// Number of data-producing parties (`x`), sampled without replacement.
    pub active_parties: u32,
    /// Arrangement of parties and the neighbor rule they follow.
    pub topology: Topology,
    /// Number of ticks after which the run stops without a clinch.
    pub iteration_cap: u64,
    /// Seed for the single random source driving delays and tie-breaks.
    pub seed: u64,
    /// Whether the driver keeps the full world event log for inspection.
    pub record_events: bool,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self::new(2000, 4, 15, 4, Topology::Ring)
    }
}

impl ScenarioConfig {
    /// Creates a configuration with the delay bound coupled to the gap and the
    /// default iteration cap.
    #[must_use]
    pub fn new(
        domain_size: u64,
        parties: u32,
        min_gap: u64,
        active_parties: u32,
        topology: Topology,
    ) -> Self {
        Self {
            domain_size,
            parties,
            min_gap,
            delay_bound: min_gap,
            active_parties,
            topology,
            iteration_cap: domain_size.saturating_mul(DEFAULT_CAP_FACTOR),
            seed: 0,
            record_events: false,
        }
    }

    /// Replaces the network's maximum broadcast delay.
    #[must_use]
    pub fn with_delay_bound(mut self, delay_bound: u64) -> Self {
        self.delay_bound = delay_bound;
        self
    }

    /// Replaces the iteration cap.
    #[must_use]
    pub fn with_iteration_cap(mut self, iteration_cap: u64) -> Self {
        self.iteration_cap = iteration_cap;
        self
    }

    /// Replaces the random seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Enables or disables retention of the world event log.
    #[must_use]
    pub fn with_event_log(mut self, record_events: bool) -> Self {
        self.record_events = record_events;
        self
    }

    /// Circular domain described by the configuration.
    #[must_use]
    pub const fn domain(&self) -> Domain {
        Domain::new(self.domain_size)
    }

    /// Largest number of pads the parties may burn before the run saturates.
    ///
    /// Every party keeps at least `min_gap` pads in reserve, so the ceiling is
    /// `n - m * d`. Returns zero for configurations that fail validation.
    #[must_use]
    pub fn utilization_ceiling(&self) -> u64 {
        u64::from(self.parties)
            .checked_mul(self.min_gap)
            .and_then(|reserved| self.domain_size.checked_sub(reserved))
            .unwrap_or(0)
    }

    /// Checks the basic domain constraints before any simulation step runs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.parties == 0 {
            return Err(ConfigError::NoParties);
        }
        if self.min_gap < 1 {
            return Err(ConfigError::GapTooSmall);
        }
        if self.active_parties > self.parties {
            return Err(ConfigError::TooManyActive {
                active: self.active_parties,
                parties: self.parties,
            });
        }
        if self.iteration_cap == 0 {
            return Err(ConfigError::ZeroIterationCap);
        }

        // Each party needs its own pad plus `d` pads of clearance, which also keeps
        // the utilization ceiling above the number of reserved starting pads.
        let required = self
            .min_gap
            .checked_add(1)
            .and_then(|footprint| footprint.checked_mul(u64::from(self.parties)));
        match required {
            Some(required) if self.domain_size >= required => Ok(()),
            _ => Err(ConfigError::DomainTooSmall {
                domain_size: self.domain_size,
                parties: self.parties,
                min_gap: self.min_gap,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ScenarioConfig;
    use crate::{ConfigError, Topology};

    #[test]
    fn new_couples_delay_to_gap_and_caps_at_ten_ticks_per_pad() {
        let config = ScenarioConfig::new(400, 3, 15, 1, Topology::TwoPointer);
        assert_eq!(config.delay_bound, 15);
        assert_eq!(config.iteration_cap, 4_000);
        assert_eq!(config.utilization_ceiling(), 355);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn delay_bound_is_independent_of_gap() {
        let config = ScenarioConfig::new(400, 3, 15, 1, Topology::Ring).with_delay_bound(0);
        assert_eq!(config.min_gap, 15);
        assert_eq!(config.delay_bound, 0);
    }

    #[test]
    fn rejects_zero_gap() {
        let config = ScenarioConfig::new(100, 2, 0, 1, Topology::Ring);
        assert_eq!(config.validate(), Err(ConfigError::GapTooSmall));
    }

    #[test]
    fn rejects_more_active_parties_than_parties() {
        let config = ScenarioConfig::new(100, 2, 5, 3, Topology::Ring);
        assert_eq!(
            config.validate(),
            Err(ConfigError::TooManyActive {
                active: 3,
                parties: 2
            })
        );
    }

    #[test]
    fn rejects_domain_without_room_for_every_gap() {
        let config = ScenarioConfig::new(23, 4, 5, 4, Topology::Ring);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DomainTooSmall { .. })
        ));

        let fits = ScenarioConfig::new(24, 4, 5, 4, Topology::Ring);
        assert!(fits.validate().is_ok());
    }

    #[test]
    fn rejects_overflowing_footprint() {
        let config = ScenarioConfig::new(u64::MAX, 4, u64::MAX, 1, Topology::Ring);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DomainTooSmall { .. })
        ));
    }

    #[test]
    fn rejects_zero_parties_and_zero_cap() {
        let config = ScenarioConfig::new(100, 0, 5, 0, Topology::Ring);
        assert_eq!(config.validate(), Err(ConfigError::NoParties));

        let config = ScenarioConfig::new(100, 2, 5, 1, Topology::Ring).with_iteration_cap(0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroIterationCap));
    }
}
