use std::{fs, path::Path, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use padring_core::{ScenarioConfig, Topology};
use serde::Deserialize;

/// Runs a single padring scenario and prints its report as JSON.
#[derive(Debug, Parser)]
#[command(name = "padring", version)]
pub(crate) struct Cli {
    /// TOML file providing scenario parameters. Flags override its values.
    #[arg(long, value_name = "FILE")]
    pub(crate) config: Option<PathBuf>,

    #[command(flatten)]
    pub(crate) scenario: ScenarioArgs,
}

/// Scenario parameters accepted both as flags and as TOML keys.
#[derive(Clone, Debug, Default, PartialEq, Eq, clap::Args, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ScenarioArgs {
    /// Number of pads in the circular domain.
    #[arg(long)]
    pub(crate) domain_size: Option<u64>,
    /// Number of participating parties.
    #[arg(long)]
    pub(crate) parties: Option<u32>,
    /// Minimum gap a mover keeps from its neighbor.
    #[arg(long)]
    pub(crate) min_gap: Option<u64>,
    /// Maximum broadcast delay in ticks. Defaults to the minimum gap.
    #[arg(long)]
    pub(crate) delay_bound: Option<u64>,
    /// Number of parties allowed to burn pads.
    #[arg(long = "active")]
    pub(crate) active_parties: Option<u32>,
    /// Party arrangement: `ring` or `two-pointer`.
    #[arg(long, value_parser = parse_topology)]
    pub(crate) topology: Option<Topology>,
    /// Tick limit. Defaults to ten ticks per pad.
    #[arg(long)]
    pub(crate) iteration_cap: Option<u64>,
    /// Seed for delays, tie-breaks and active-party sampling.
    #[arg(long)]
    pub(crate) seed: Option<u64>,
}

impl Cli {
    /// Resolves the scenario from the optional config file and the flags.
    pub(crate) fn scenario_config(&self) -> Result<ScenarioConfig> {
        let file = match &self.config {
            Some(path) => load(path)?,
            None => ScenarioArgs::default(),
        };
        Ok(file.overridden_by(self.scenario.clone()).into_config())
    }
}

impl ScenarioArgs {
    fn overridden_by(self, flags: ScenarioArgs) -> ScenarioArgs {
        ScenarioArgs {
            domain_size: flags.domain_size.or(self.domain_size),
            parties: flags.parties.or(self.parties),
            min_gap: flags.min_gap.or(self.min_gap),
            delay_bound: flags.delay_bound.or(self.delay_bound),
            active_parties: flags.active_parties.or(self.active_parties),
            topology: flags.topology.or(self.topology),
            iteration_cap: flags.iteration_cap.or(self.iteration_cap),
            seed: flags.seed.or(self.seed),
        }
    }

    /// Fills unset parameters from the reference scenario. The delay bound and
    /// iteration cap follow the resolved gap and domain size unless given.
    fn into_config(self) -> ScenarioConfig {
        let defaults = ScenarioConfig::default();
        let mut config = ScenarioConfig::new(
            self.domain_size.unwrap_or(defaults.domain_size),
            self.parties.unwrap_or(defaults.parties),
            self.min_gap.unwrap_or(defaults.min_gap),
            self.active_parties.unwrap_or(defaults.active_parties),
            self.topology.unwrap_or(defaults.topology),
        );
        if let Some(delay_bound) = self.delay_bound {
            config = config.with_delay_bound(delay_bound);
        }
        if let Some(iteration_cap) = self.iteration_cap {
            config = config.with_iteration_cap(iteration_cap);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        config
    }
}

fn load(path: &Path) -> Result<ScenarioArgs> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file {}", path.display()))
}

fn parse_topology(value: &str) -> Result<Topology, String> {
    match value {
        "ring" => Ok(Topology::Ring),
        "two-pointer" => Ok(Topology::TwoPointer),
        other => Err(format!("unknown topology `{other}`, expected `ring` or `two-pointer`")),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use clap::Parser;
    use padring_core::{ScenarioConfig, Topology};

    use super::Cli;

    #[test]
    fn no_arguments_run_the_reference_scenario() {
        let cli = Cli::try_parse_from(["padring"]).expect("no arguments are required");
        let config = cli.scenario_config().expect("nothing to load");
        assert_eq!(config, ScenarioConfig::default());
    }

    #[test]
    fn flags_couple_delay_and_cap_to_resolved_values() {
        let cli = Cli::try_parse_from([
            "padring",
            "--domain-size",
            "400",
            "--parties",
            "3",
            "--min-gap",
            "7",
            "--active",
            "1",
            "--topology",
            "two-pointer",
            "--seed",
            "9",
        ])
        .expect("documented flags parse");
        let config = cli.scenario_config().expect("nothing to load");
        assert_eq!(
            config,
            ScenarioConfig::new(400, 3, 7, 1, Topology::TwoPointer).with_seed(9)
        );
        assert_eq!(config.delay_bound, 7);
        assert_eq!(config.iteration_cap, 4_000);
    }

    #[test]
    fn unknown_topology_is_rejected() {
        let result = Cli::try_parse_from(["padring", "--topology", "star"]);
        assert!(result.is_err());
    }

    #[test]
    fn flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "domain_size = 600\nparties = 4\nmin_gap = 15\nactive_parties = 2\ntopology = \"two-pointer\"\ndelay_bound = 3"
        )
        .expect("write config");

        let path = file.path().to_str().expect("utf-8 path").to_owned();
        let cli = Cli::try_parse_from(["padring", "--config", path.as_str(), "--active", "4"])
            .expect("flags parse");
        let config = cli.scenario_config().expect("config loads");

        assert_eq!(config.domain_size, 600);
        assert_eq!(config.topology, Topology::TwoPointer);
        assert_eq!(config.active_parties, 4);
        assert_eq!(config.delay_bound, 3);
        assert_eq!(config.iteration_cap, 6_000);
    }

    #[test]
    fn partial_config_file_couples_delay_and_cap_to_its_values() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "min_gap = 5\ndomain_size = 100").expect("write config");

        let path = file.path().to_str().expect("utf-8 path").to_owned();
        let cli = Cli::try_parse_from(["padring", "--config", path.as_str()]).expect("flags parse");
        let config = cli.scenario_config().expect("config loads");

        assert_eq!(config.min_gap, 5);
        assert_eq!(config.delay_bound, 5);
        assert_eq!(config.iteration_cap, 1_000);
        assert_eq!(config.parties, ScenarioConfig::default().parties);
    }

    #[test]
    fn unknown_config_keys_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "domain_size = 600\nwidth = 3").expect("write config");

        let path = file.path().to_str().expect("utf-8 path").to_owned();
        let cli = Cli::try_parse_from(["padring", "--config", path.as_str()]).expect("flags parse");
        let error = cli.scenario_config().expect_err("unknown key");
        assert!(error.to_string().contains("failed to parse config file"));
    }
}
