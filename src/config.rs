//! Configuration for the bridge relayer
//!
//! Loads configuration from TOML files with environment variable
//! substitution and validates every bound before any component is built.

use crate::executor::ExecutorConfig;
use crate::gas::{GasPriceSelector, GasStationConfig};
use crate::machine::{StepConfig, StepsConfig};

use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub relayer: RelayerSettings,
    pub executor: ExecutorSettings,
    pub gas_station: GasStationSettings,
    pub state_machine: StateMachineSettings,
    pub metrics: MetricsSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelayerSettings {
    /// Hex-encoded public key identifying this relayer in the whitelist.
    pub own_public_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExecutorSettings {
    pub time_for_wait_on_foreign_secs: u64,
    pub max_quorum_retries_on_foreign: u64,
    pub max_quorum_retries_on_home: u64,
    pub max_retries_on_was_proposed: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GasStationSettings {
    pub request_url: String,
    pub polling_interval_secs: u64,
    pub request_time_millis: u64,
    pub maximum_gas_price: u64,
    pub gas_price_selector: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StateMachineSettings {
    pub foreign_to_home: StepsSettings,
    pub home_to_foreign: StepsSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StepsSettings {
    pub step_duration_ms: u64,
    #[serde(default)]
    pub steps: Vec<StepOverrideSettings>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StepOverrideSettings {
    pub name: String,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    pub enabled: bool,
    pub port: u16,
}

impl Settings {
    /// Load settings from the configured file path.
    pub fn load() -> Result<Self> {
        let config_path = env::var("BRIDGE_RELAYER_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config/default.toml"));

        let config_str = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        Self::load_from_str(&config_str)
    }

    pub fn load_from_str(config_str: &str) -> Result<Self> {
        let config_str = substitute_env_vars(config_str);

        let settings: Settings =
            toml::from_str(&config_str).with_context(|| "Failed to parse configuration")?;

        settings.validate()?;

        Ok(settings)
    }

    /// Fail-fast bound checks; components re-validate at construction, this
    /// surfaces every violation before anything is wired.
    fn validate(&self) -> Result<()> {
        let key = self.relayer.own_public_key.trim();
        if key.is_empty() {
            anyhow::bail!("relayer.own_public_key must not be empty");
        }
        hex::decode(key).with_context(|| "relayer.own_public_key is not valid hex")?;

        self.gas_station
            .gas_price_selector
            .parse::<GasPriceSelector>()
            .with_context(|| "invalid gas_station.gas_price_selector")?;
        if self.gas_station.polling_interval_secs < 1 {
            anyhow::bail!("gas_station.polling_interval_secs must be at least 1");
        }
        if self.gas_station.request_time_millis < 1 {
            anyhow::bail!("gas_station.request_time_millis must be at least 1");
        }

        if self.executor.time_for_wait_on_foreign_secs < 1 {
            anyhow::bail!("executor.time_for_wait_on_foreign_secs must be at least 1");
        }
        for (name, value) in [
            (
                "executor.max_quorum_retries_on_foreign",
                self.executor.max_quorum_retries_on_foreign,
            ),
            (
                "executor.max_quorum_retries_on_home",
                self.executor.max_quorum_retries_on_home,
            ),
            (
                "executor.max_retries_on_was_proposed",
                self.executor.max_retries_on_was_proposed,
            ),
        ] {
            if value < 1 {
                anyhow::bail!("{} must be at least 1", name);
            }
        }

        for (name, machine) in [
            ("foreign_to_home", &self.state_machine.foreign_to_home),
            ("home_to_foreign", &self.state_machine.home_to_foreign),
        ] {
            if machine.step_duration_ms < 1000 {
                anyhow::bail!("state_machine.{}.step_duration_ms must be at least 1000", name);
            }
        }

        Ok(())
    }

    pub fn own_public_key(&self) -> Vec<u8> {
        hex::decode(self.relayer.own_public_key.trim()).unwrap_or_default()
    }

    pub fn executor_config(&self) -> ExecutorConfig {
        ExecutorConfig {
            time_for_wait_on_foreign: Duration::from_secs(
                self.executor.time_for_wait_on_foreign_secs,
            ),
            max_quorum_retries_on_foreign: self.executor.max_quorum_retries_on_foreign,
            max_quorum_retries_on_home: self.executor.max_quorum_retries_on_home,
            max_retries_on_was_proposed: self.executor.max_retries_on_was_proposed,
        }
    }

    pub fn gas_station_config(&self) -> GasStationConfig {
        GasStationConfig {
            request_url: self.gas_station.request_url.clone(),
            polling_interval: Duration::from_secs(self.gas_station.polling_interval_secs),
            request_time: Duration::from_millis(self.gas_station.request_time_millis),
            maximum_gas_price: self.gas_station.maximum_gas_price,
            // validated at load time
            selector: self
                .gas_station
                .gas_price_selector
                .parse()
                .unwrap_or(GasPriceSelector::Fast),
        }
    }

    pub fn foreign_to_home_steps(&self) -> StepsConfig {
        steps_config(&self.state_machine.foreign_to_home)
    }

    pub fn home_to_foreign_steps(&self) -> StepsConfig {
        steps_config(&self.state_machine.home_to_foreign)
    }
}

fn steps_config(settings: &StepsSettings) -> StepsConfig {
    StepsConfig {
        step_duration_ms: settings.step_duration_ms,
        steps: settings
            .steps
            .iter()
            .map(|step| StepConfig {
                name: step.name.clone(),
                duration_ms: step.duration_ms,
            })
            .collect(),
    }
}

/// Substitute environment variables in the format ${VAR_NAME}
fn substitute_env_vars(input: &str) -> String {
    let mut result = input.to_string();
    let re = regex::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap();

    for cap in re.captures_iter(input) {
        let var_name = &cap[1];
        let var_value = env::var(var_name).unwrap_or_default();
        result = result.replace(&cap[0], &var_value);
    }

    result
}
