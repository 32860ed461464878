//! # Yield Core Library
//!
//! The simulation engine behind the yield automation dashboard.
//!
//! ## Modules
//! - `store`: Strategy Store, the pure transitions over positions, earnings and history.
//! - `wallet`: Wallet Store, external wallet session, agent balance and the pending deposit.
//! - `driver`: Simulation Driver, three periodic tasks mutating the strategy store.
//! - `deposit`: Deposit Flow, USDC transfer through the wallet connector and chain client.
//! - `token`: USDC constants, base-unit conversion and ERC-20 call encoding.
//! - `paper`: Simulated wallet and chain collaborators.
//! - `config`: Layered configuration (defaults, TOML file, environment).
//! - `session`: Wires the stores, driver and deposit flow for one user session.
//! - `snapshot`: Serializable dashboard view over both stores.

pub mod clock;
pub mod config;
pub mod deposit;
pub mod driver;
pub mod paper;
pub mod session;
pub mod shared;
pub mod snapshot;
pub mod store;
pub mod token;
pub mod wallet;

pub use crate::config::{ConfigError, SimulationConfig};
pub use deposit::{DepositError, DepositFlow, DepositOutcome};
pub use driver::{DriverError, SimulationDriver, TickPeriods};
pub use session::Session;
pub use snapshot::DashboardSnapshot;
pub use store::{RebalancePolicy, StoreError, StrategyStore};
pub use wallet::WalletStore;
