//! Token transfer request and receipt exchanged with the external
//! wallet connector and chain client.

use alloy_primitives::{Address, TxHash, U256};
use serde::{Deserialize, Serialize};

/// An ERC-20 `transfer(to, amount)` the wallet is asked to sign and submit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub chain_id: u64,
    /// Token contract the call is sent to.
    pub token: Address,
    pub from: Address,
    pub to: Address,
    /// Amount in token base units.
    pub amount: U256,
    /// ABI-encoded call data, selector included.
    pub calldata: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReceiptStatus {
    Success,
    Reverted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub tx_hash: TxHash,
    pub status: ReceiptStatus,
    pub block_number: Option<u64>,
}

impl TransactionReceipt {
    pub fn is_success(&self) -> bool {
        self.status == ReceiptStatus::Success
    }
}
