use crate::error::ChainError;
use crate::model::transfer::TransactionReceipt;
use alloy_primitives::TxHash;
use async_trait::async_trait;

/// Read access to the chain, used to wait for a submitted transfer.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Waits until the transaction is mined and returns its receipt.
    ///
    /// There is no cancellation path: once a transfer is submitted the caller
    /// waits for the outcome.
    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<TransactionReceipt, ChainError>;
}
