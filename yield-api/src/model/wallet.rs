//! Wallet state model: the user's external wallet, the agent wallet that
//! nominally custodies deposits, and the deposit in flight.

use super::deposit::PendingDeposit;
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// Agent wallet used when no override is configured.
pub const DEFAULT_AGENT_ADDRESS: &str = "0xDA20fE7B606E04d8b4b978012094C4f672d82C2B";

/// The user's externally owned wallet as reported by the wallet connector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalWallet {
    pub address: Option<Address>,
    pub is_connected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentWallet {
    pub address: Address,
    /// Simulated USDC balance credited by confirmed deposits.
    pub virtual_balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletState {
    pub external: ExternalWallet,
    pub agent: AgentWallet,
    pub pending_deposit: PendingDeposit,
}

impl WalletState {
    pub fn new(agent_address: Address) -> Self {
        Self {
            external: ExternalWallet::default(),
            agent: AgentWallet {
                address: agent_address,
                virtual_balance: 0.0,
            },
            pending_deposit: PendingDeposit::default(),
        }
    }
}
