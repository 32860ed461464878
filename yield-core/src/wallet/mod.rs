//! # Wallet Store
//!
//! Reducers over [`WalletState`]: the external wallet session, the agent
//! wallet's virtual balance and the single pending deposit.

use log::{debug, info};
use yield_api::{Address, DepositStatus, PendingDeposit, TxHash, WalletState};

#[derive(Debug, Clone)]
pub struct WalletStore {
    state: WalletState,
}

impl WalletStore {
    pub fn new(agent_address: Address) -> Self {
        Self {
            state: WalletState::new(agent_address),
        }
    }

    pub fn state(&self) -> &WalletState {
        &self.state
    }

    pub fn agent_address(&self) -> Address {
        self.state.agent.address
    }

    pub fn virtual_balance(&self) -> f64 {
        self.state.agent.virtual_balance
    }

    pub fn pending(&self) -> &PendingDeposit {
        &self.state.pending_deposit
    }

    pub fn external_address(&self) -> Option<Address> {
        self.state.external.address
    }

    pub fn connect_external(&mut self, address: Address) {
        self.state.external.address = Some(address);
        self.state.external.is_connected = true;
        info!("External wallet connected: {}", address);
    }

    pub fn disconnect_external(&mut self) {
        if self.state.external.is_connected {
            info!("External wallet disconnected");
        }
        self.state.external.address = None;
        self.state.external.is_connected = false;
    }

    pub fn begin_deposit(&mut self, amount: f64) {
        self.state.pending_deposit = PendingDeposit {
            amount,
            tx_hash: None,
            status: DepositStatus::Pending,
        };
        debug!("Deposit of {} USDC pending signature", amount);
    }

    pub fn mark_confirming(&mut self, tx_hash: TxHash) {
        self.state.pending_deposit.tx_hash = Some(tx_hash);
        self.state.pending_deposit.status = DepositStatus::Confirming;
        debug!("Deposit submitted: {}", tx_hash);
    }

    pub fn mark_failed(&mut self) {
        self.state.pending_deposit.status = DepositStatus::Failed;
    }

    /// Adds a confirmed deposit to the virtual balance and clears the pending
    /// descriptor.
    pub fn credit_deposit(&mut self, amount: f64) {
        if amount.is_finite() && amount > 0.0 {
            self.state.agent.virtual_balance += amount;
        }
        self.state.pending_deposit = PendingDeposit::default();
    }

    /// Overwrites the balance. Negative or non-finite values are ignored.
    pub fn set_virtual_balance(&mut self, amount: f64) -> bool {
        if !amount.is_finite() || amount < 0.0 {
            return false;
        }
        self.state.agent.virtual_balance = amount;
        true
    }

    pub fn reset_deposit(&mut self) {
        self.state.pending_deposit = PendingDeposit::default();
    }
}
