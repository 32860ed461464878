//! # Deposit Flow
//!
//! Moves USDC from the user's external wallet to the agent wallet and credits
//! the simulated balance once the transfer is mined.
//!
//! `Idle -> Pending -> Confirming -> credited (Idle)`. A signature the user
//! declines returns the deposit to `Idle` silently; any other error leaves it
//! `Failed` for a short while before it is cleared.

use crate::shared::{lock, SharedWallet};
use crate::token::{parse_usdc, transfer_request};
use log::{debug, error, info};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use yield_api::{
    Address, ChainClient, ChainError, DepositStatus, TxHash, WalletConnector, WalletError, U256,
};

pub mod rejection;

use rejection::is_user_rejection;

/// How long a failed deposit stays visible before it is cleared.
pub const DEFAULT_FAILURE_RESET: Duration = Duration::from_secs(5);

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DepositError {
    #[error("Invalid deposit amount: {0}")]
    InvalidAmount(f64),

    #[error("No external wallet connected")]
    NoExternalWallet,

    #[error("A deposit is already in progress")]
    InFlight,

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error("Transaction failed: {0} reverted")]
    Reverted(TxHash),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DepositOutcome {
    /// The transfer was mined and the amount credited.
    Confirmed { amount: f64, tx_hash: TxHash },
    /// The user declined to sign. Nothing changed.
    Cancelled,
}

pub struct DepositFlow {
    wallet: Arc<dyn WalletConnector>,
    chain: Arc<dyn ChainClient>,
    store: SharedWallet,
    failure_reset: Duration,
    /// Bumped by every deposit this flow starts; a pending reset only
    /// clears the deposit it was scheduled for.
    generation: Arc<AtomicU64>,
}

impl DepositFlow {
    pub fn new(
        wallet: Arc<dyn WalletConnector>,
        chain: Arc<dyn ChainClient>,
        store: SharedWallet,
    ) -> Self {
        Self {
            wallet,
            chain,
            store,
            failure_reset: DEFAULT_FAILURE_RESET,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn with_failure_reset(mut self, delay: Duration) -> Self {
        self.failure_reset = delay;
        self
    }

    pub fn failure_reset(&self) -> Duration {
        self.failure_reset
    }

    /// Deposits `amount` USDC into the agent wallet.
    ///
    /// The receipt wait cannot be cancelled once the transfer is submitted.
    ///
    /// # Errors
    ///
    /// * `InvalidAmount` / `NoExternalWallet` / `InFlight` - refused up front,
    ///   the wallet state is untouched.
    /// * `Wallet` / `Chain` / `Reverted` - the deposit is marked failed and
    ///   cleared after the failure reset delay.
    pub async fn deposit(&self, amount: f64) -> Result<DepositOutcome, DepositError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(DepositError::InvalidAmount(amount));
        }
        let units = parse_usdc(amount);
        if units.is_zero() {
            return Err(DepositError::InvalidAmount(amount));
        }

        let from = match self.wallet.external_address() {
            Some(address) if self.wallet.is_connected() => address,
            _ => return Err(DepositError::NoExternalWallet),
        };

        let (agent, generation) = {
            let mut store = lock(&self.store);
            if store.pending().status.is_in_flight() {
                return Err(DepositError::InFlight);
            }
            store.begin_deposit(amount);
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            (store.agent_address(), generation)
        };
        info!("Depositing {} USDC from {} to {}", amount, from, agent);

        match self.transfer(from, agent, units).await {
            Ok(tx_hash) => {
                lock(&self.store).credit_deposit(amount);
                info!("Deposit of {} USDC confirmed in {}", amount, tx_hash);
                Ok(DepositOutcome::Confirmed { amount, tx_hash })
            }
            Err(e) if is_user_rejection(&e.to_string()) => {
                lock(&self.store).reset_deposit();
                info!("Deposit cancelled by the user");
                Ok(DepositOutcome::Cancelled)
            }
            Err(e) => {
                lock(&self.store).mark_failed();
                error!("Deposit error: {}", e);
                self.schedule_reset(generation);
                Err(e)
            }
        }
    }

    async fn transfer(
        &self,
        from: Address,
        agent: Address,
        units: U256,
    ) -> Result<TxHash, DepositError> {
        let tx_hash = self
            .wallet
            .send_transfer(transfer_request(from, agent, units))
            .await?;
        lock(&self.store).mark_confirming(tx_hash);

        let receipt = self.chain.wait_for_receipt(tx_hash).await?;
        if !receipt.is_success() {
            return Err(DepositError::Reverted(tx_hash));
        }
        Ok(tx_hash)
    }

    /// Clears the failed deposit `generation` after the reset delay, unless
    /// another deposit has started meanwhile.
    fn schedule_reset(&self, generation: u64) {
        let store = self.store.clone();
        let current = self.generation.clone();
        let delay = self.failure_reset;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut store = lock(&store);
            if current.load(Ordering::SeqCst) == generation
                && store.pending().status == DepositStatus::Failed
            {
                store.reset_deposit();
            } else {
                debug!("Failed deposit already replaced, skipping reset");
            }
        });
    }
}

#[cfg(test)]
mod tests;
