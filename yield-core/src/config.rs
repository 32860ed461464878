//! Layered simulation configuration.
//!
//! Built-in defaults, then an optional TOML file, then the environment:
//!
//! - `AGENT_WALLET_ADDRESS` replaces `wallet.agent_address`
//! - `WALLET_APP_ID` replaces `wallet.app_id`

use crate::deposit::DEFAULT_FAILURE_RESET;
use crate::driver::{TickPeriods, APR_JITTER_TASK, EARNINGS_TASK, REBALANCE_TASK};
use crate::paper::chain::DEFAULT_CONFIRMATION;
use crate::store::{validate_positions, RebalancePolicy, StoreError, StrategyStore};
use ::config::{Config, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use yield_api::model::protocol::default_positions;
use yield_api::model::wallet::DEFAULT_AGENT_ADDRESS;
use yield_api::{Address, Clock, ProtocolPosition};

pub const AGENT_ADDRESS_ENV: &str = "AGENT_WALLET_ADDRESS";
pub const APP_ID_ENV: &str = "WALLET_APP_ID";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("Period of '{0}' must be greater than zero")]
    InvalidPeriod(&'static str),

    #[error("Invalid rebalance policy: step {step}, min APR gap {min_apr_gap}")]
    InvalidPolicy { step: f64, min_apr_gap: f64 },

    #[error("Invalid agent wallet address '{0}'")]
    InvalidAddress(String),

    #[error("Invalid protocols: {0}")]
    Protocols(#[from] StoreError),
}

/// Periods of the three driver tasks, in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverSettings {
    pub apr_jitter_ms: u64,
    pub rebalance_ms: u64,
    pub earnings_ms: u64,
}

impl Default for DriverSettings {
    fn default() -> Self {
        let periods = TickPeriods::default();
        Self {
            apr_jitter_ms: periods.apr_jitter.as_millis() as u64,
            rebalance_ms: periods.rebalance.as_millis() as u64,
            earnings_ms: periods.earnings.as_millis() as u64,
        }
    }
}

impl DriverSettings {
    pub fn periods(&self) -> TickPeriods {
        TickPeriods {
            apr_jitter: Duration::from_millis(self.apr_jitter_ms),
            rebalance: Duration::from_millis(self.rebalance_ms),
            earnings: Duration::from_millis(self.earnings_ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletSettings {
    pub agent_address: String,
    /// Application id registered with the wallet provider.
    pub app_id: Option<String>,
}

impl Default for WalletSettings {
    fn default() -> Self {
        Self {
            agent_address: DEFAULT_AGENT_ADDRESS.to_string(),
            app_id: None,
        }
    }
}

impl WalletSettings {
    pub fn agent_address(&self) -> Result<Address, ConfigError> {
        self.agent_address
            .parse()
            .map_err(|_| ConfigError::InvalidAddress(self.agent_address.clone()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepositSettings {
    /// How long a failed deposit stays visible.
    pub failure_reset_ms: u64,
    /// Confirmation delay of the paper chain.
    pub confirmation_ms: u64,
}

impl Default for DepositSettings {
    fn default() -> Self {
        Self {
            failure_reset_ms: DEFAULT_FAILURE_RESET.as_millis() as u64,
            confirmation_ms: DEFAULT_CONFIRMATION.as_millis() as u64,
        }
    }
}

impl DepositSettings {
    pub fn failure_reset(&self) -> Duration {
        Duration::from_millis(self.failure_reset_ms)
    }

    pub fn confirmation(&self) -> Duration {
        Duration::from_millis(self.confirmation_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Seed of the APR random walk. Unseeded runs draw from OS entropy.
    pub seed: Option<u64>,
    pub auto_rebalance: bool,
    /// Replaces the default Aave / Compound / Morpho set.
    pub protocols: Option<Vec<ProtocolPosition>>,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            seed: None,
            auto_rebalance: true,
            protocols: None,
        }
    }
}

/// Values read from the process environment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvOverrides {
    pub agent_address: Option<String>,
    pub app_id: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        Self {
            agent_address: std::env::var(AGENT_ADDRESS_ENV).ok(),
            app_id: std::env::var(APP_ID_ENV).ok(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub driver: DriverSettings,
    pub policy: RebalancePolicy,
    pub wallet: WalletSettings,
    pub deposit: DepositSettings,
    pub simulation: SimulationSettings,
}

impl SimulationConfig {
    /// Loads the configuration with the process environment applied.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_from(path, EnvOverrides::from_env())
    }

    /// Loads defaults, the file at `path` (which must exist when given) and
    /// `overrides`, then validates the result.
    pub fn load_from(path: Option<&Path>, overrides: EnvOverrides) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        let config: SimulationConfig = builder
            .set_override_option("wallet.agent_address", overrides.agent_address)?
            .set_override_option("wallet.app_id", overrides.app_id)?
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, millis) in [
            (APR_JITTER_TASK, self.driver.apr_jitter_ms),
            (REBALANCE_TASK, self.driver.rebalance_ms),
            (EARNINGS_TASK, self.driver.earnings_ms),
        ] {
            if millis == 0 {
                return Err(ConfigError::InvalidPeriod(name));
            }
        }

        if !self.policy.is_valid() {
            return Err(ConfigError::InvalidPolicy {
                step: self.policy.step,
                min_apr_gap: self.policy.min_apr_gap,
            });
        }

        self.wallet.agent_address()?;

        if let Some(protocols) = &self.simulation.protocols {
            validate_positions(protocols)?;
        }
        Ok(())
    }

    /// Builds the strategy store described by this configuration.
    pub fn strategy_store(&self, clock: Arc<dyn Clock>) -> Result<StrategyStore, ConfigError> {
        let positions = self
            .simulation
            .protocols
            .clone()
            .unwrap_or_else(default_positions);

        Ok(StrategyStore::new(
            positions,
            self.simulation.auto_rebalance,
            self.policy,
            clock,
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_without_file() {
        let config = SimulationConfig::load_from(None, EnvOverrides::default()).unwrap();

        assert_eq!(config, SimulationConfig::default());
        assert_eq!(config.driver.periods(), TickPeriods::default());
        assert_eq!(config.policy, RebalancePolicy::default());
        assert_eq!(config.deposit.failure_reset(), Duration::from_secs(5));
        assert_eq!(
            config.wallet.agent_address().unwrap().to_checksum(None),
            DEFAULT_AGENT_ADDRESS
        );
        assert!(config.simulation.auto_rebalance);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let file = write_config(
            r#"
[driver]
earnings_ms = 250

[policy]
step = 2.5

[simulation]
seed = 7
auto_rebalance = false

[[simulation.protocols]]
id = "aave"
name = "Aave V3"
apr = 4.2
allocation = 60

[[simulation.protocols]]
id = "spark"
name = "Spark"
apr = 6.0
allocation = 40
"#,
        );

        let config =
            SimulationConfig::load_from(Some(file.path()), EnvOverrides::default()).unwrap();

        assert_eq!(config.driver.earnings_ms, 250);
        assert_eq!(config.driver.apr_jitter_ms, 5_000);
        assert_eq!(config.policy.step, 2.5);
        assert_eq!(config.policy.min_apr_gap, 1.0);
        assert_eq!(config.simulation.seed, Some(7));

        let store = config
            .strategy_store(Arc::new(ManualClock::new(0)))
            .unwrap();
        assert_eq!(store.state().positions().len(), 2);
        assert!(!store.state().is_auto_rebalancing());
        assert_eq!(store.policy().step, 2.5);
    }

    #[test]
    fn test_environment_wins_over_file() {
        let file = write_config(
            r#"
[wallet]
agent_address = "0x1111111111111111111111111111111111111111"
"#,
        );
        let overrides = EnvOverrides {
            agent_address: Some("0x2222222222222222222222222222222222222222".into()),
            app_id: Some("app-123".into()),
        };

        let config = SimulationConfig::load_from(Some(file.path()), overrides).unwrap();

        assert_eq!(
            config.wallet.agent_address().unwrap(),
            Address::repeat_byte(0x22)
        );
        assert_eq!(config.wallet.app_id.as_deref(), Some("app-123"));
    }

    #[test]
    fn test_rejects_zero_period() {
        let file = write_config("[driver]\nrebalance_ms = 0\n");

        let err = SimulationConfig::load_from(Some(file.path()), EnvOverrides::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPeriod(REBALANCE_TASK)));
    }

    #[test]
    fn test_rejects_invalid_policy_and_address() {
        let mut config = SimulationConfig::default();
        config.policy.step = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidPolicy { .. })
        ));

        let overrides = EnvOverrides {
            agent_address: Some("not-an-address".into()),
            app_id: None,
        };
        assert!(matches!(
            SimulationConfig::load_from(None, overrides),
            Err(ConfigError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_rejects_protocols_not_summing_to_100() {
        let file = write_config(
            r#"
[[simulation.protocols]]
id = "aave"
name = "Aave V3"
apr = 4.2
allocation = 70
"#,
        );

        let err = SimulationConfig::load_from(Some(file.path()), EnvOverrides::default())
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Protocols(StoreError::AllocationSum(_))
        ));
    }

    #[test]
    fn test_sample_file_matches_defaults() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../config/default.toml");

        let config = SimulationConfig::load_from(Some(&path), EnvOverrides::default()).unwrap();

        assert_eq!(config.driver, DriverSettings::default());
        assert_eq!(config.policy, RebalancePolicy::default());
        assert_eq!(config.wallet, WalletSettings::default());
        assert_eq!(config.deposit, DepositSettings::default());
        assert_eq!(config.simulation.seed, None);

        let store = config
            .strategy_store(Arc::new(ManualClock::new(0)))
            .unwrap();
        let defaults = default_positions();
        for (loaded, default) in store.state().positions().iter().zip(&defaults) {
            assert_eq!(loaded.id(), default.id());
            assert_eq!(loaded.apr(), default.apr());
            assert_eq!(loaded.allocation(), default.allocation());
            assert_eq!(loaded.color(), default.color());
        }
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = SimulationConfig::load_from(
            Some(Path::new("/nonexistent/simulation.toml")),
            EnvOverrides::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }
}
