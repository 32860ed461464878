use alloy_primitives::TxHash;
use serde::{Deserialize, Serialize};

/// Lifecycle of a deposit.
///
/// `Idle -> Pending -> Confirming -> {Success, Failed}`; a confirmed deposit
/// is credited and the descriptor returns to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepositStatus {
    #[default]
    Idle,
    /// Waiting for the wallet to sign and submit the transfer.
    Pending,
    /// Submitted, waiting for the on-chain receipt.
    Confirming,
    Success,
    Failed,
}

impl DepositStatus {
    /// `true` while a deposit is waiting on the wallet or the chain.
    pub fn is_in_flight(self) -> bool {
        matches!(self, DepositStatus::Pending | DepositStatus::Confirming)
    }
}

/// The single in-flight deposit descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PendingDeposit {
    /// Amount in USDC.
    pub amount: f64,
    pub tx_hash: Option<TxHash>,
    pub status: DepositStatus,
}
