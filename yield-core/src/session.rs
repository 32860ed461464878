//! One user session: both stores, the simulation driver and the deposit
//! flow, wired from a [`SimulationConfig`].

use crate::config::{ConfigError, SimulationConfig};
use crate::deposit::{DepositError, DepositFlow, DepositOutcome};
use crate::driver::{simulation_rng, DriverError, SimulationDriver};
use crate::shared::{lock, SharedStrategy, SharedWallet};
use crate::snapshot::DashboardSnapshot;
use crate::wallet::WalletStore;
use log::info;
use std::sync::{Arc, Mutex};
use yield_api::{
    Address, ChainClient, Clock, ProtocolId, RebalanceEvent, WalletConnector, WalletError,
};

pub struct Session {
    strategy: SharedStrategy,
    wallet: SharedWallet,
    driver: SimulationDriver,
    deposits: DepositFlow,
    connector: Arc<dyn WalletConnector>,
}

impl Session {
    pub fn new(
        config: &SimulationConfig,
        connector: Arc<dyn WalletConnector>,
        chain: Arc<dyn ChainClient>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let strategy = Arc::new(Mutex::new(config.strategy_store(clock)?));
        let wallet = Arc::new(Mutex::new(WalletStore::new(
            config.wallet.agent_address()?,
        )));

        let driver = SimulationDriver::new(
            strategy.clone(),
            wallet.clone(),
            simulation_rng(config.simulation.seed),
            config.driver.periods(),
        );
        let deposits = DepositFlow::new(connector.clone(), chain, wallet.clone())
            .with_failure_reset(config.deposit.failure_reset());

        Ok(Self {
            strategy,
            wallet,
            driver,
            deposits,
            connector,
        })
    }

    pub fn strategy(&self) -> SharedStrategy {
        self.strategy.clone()
    }

    pub fn wallet(&self) -> SharedWallet {
        self.wallet.clone()
    }

    pub fn driver(&self) -> &SimulationDriver {
        &self.driver
    }

    /// Starts the periodic simulation. Idempotent.
    pub fn start(&mut self) -> Result<(), DriverError> {
        self.driver.start()
    }

    pub fn stop(&mut self) {
        self.driver.stop();
    }

    pub fn is_running(&self) -> bool {
        self.driver.is_running()
    }

    /// Opens the external wallet and records its address.
    pub async fn connect_wallet(&self) -> Result<Address, WalletError> {
        let address = self.connector.connect().await?;
        lock(&self.wallet).connect_external(address);
        Ok(address)
    }

    pub async fn deposit(&self, amount: f64) -> Result<DepositOutcome, DepositError> {
        self.deposits.deposit(amount).await
    }

    pub fn toggle_auto_rebalance(&self) -> bool {
        lock(&self.strategy).toggle_auto_rebalance()
    }

    pub fn rebalance(
        &self,
        from: &ProtocolId,
        to: &ProtocolId,
        percentage: f64,
    ) -> Option<RebalanceEvent> {
        lock(&self.strategy).rebalance(from, to, percentage)
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        let strategy = lock(&self.strategy);
        let wallet = lock(&self.wallet);
        DashboardSnapshot::capture(&strategy, &wallet)
    }

    /// Stops the simulation, restores the initial strategy and closes the
    /// external wallet. The virtual balance is kept.
    pub async fn logout(&mut self) -> Result<(), WalletError> {
        self.driver.stop();
        lock(&self.strategy).reset();
        lock(&self.wallet).disconnect_external();

        let result = self.connector.disconnect().await;
        info!("Session logged out");
        result
    }
}
