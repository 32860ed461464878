//! # Yield API
//!
//! Shared vocabulary of the yield automation simulator.
//!
//! ## Modules
//! - `model`: Protocol positions, strategy state, rebalance events and wallet state.
//! - `traits`: Contracts for the external collaborators (wallet connector, chain client, clock).
//! - `error`: Errors surfaced by those collaborators.

pub mod error;
pub mod model;
pub mod traits;

pub use error::{ChainError, WalletError};
pub use model::deposit::{DepositStatus, PendingDeposit};
pub use model::identity::ProtocolId;
pub use model::protocol::ProtocolPosition;
pub use model::rebalance::{RebalanceEvent, RebalanceKind};
pub use model::strategy::StrategyState;
pub use model::transfer::{ReceiptStatus, TransactionReceipt, TransferRequest};
pub use model::wallet::{AgentWallet, ExternalWallet, WalletState};
pub use traits::chain_client::ChainClient;
pub use traits::clock::Clock;
pub use traits::wallet_connector::WalletConnector;

/// Re-exported so downstream crates name addresses and hashes the same way.
pub use alloy_primitives::{Address, TxHash, U256};
