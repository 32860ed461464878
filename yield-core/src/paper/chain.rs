use crate::shared::lock;
use async_trait::async_trait;
use log::debug;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use yield_api::{ChainClient, ChainError, ReceiptStatus, TransactionReceipt, TxHash};

/// Default time between submission and receipt.
pub const DEFAULT_CONFIRMATION: Duration = Duration::from_secs(2);

/// A chain that mines each transaction in its own block after `confirmation`.
pub struct PaperChain {
    confirmation: Duration,
    block: AtomicU64,
    revert_next: AtomicBool,
    next_error: Mutex<Option<ChainError>>,
}

impl PaperChain {
    pub fn new(confirmation: Duration) -> Self {
        Self {
            confirmation,
            block: AtomicU64::new(1),
            revert_next: AtomicBool::new(false),
            next_error: Mutex::new(None),
        }
    }

    /// The next receipt reports a reverted transaction.
    pub fn revert_next(&self) {
        self.revert_next.store(true, Ordering::SeqCst);
    }

    /// The next wait fails with `error`.
    pub fn fail_next(&self, error: ChainError) {
        *lock(&self.next_error) = Some(error);
    }

    /// Number of the block the next transaction lands in.
    pub fn next_block(&self) -> u64 {
        self.block.load(Ordering::SeqCst)
    }
}

impl Default for PaperChain {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIRMATION)
    }
}

#[async_trait]
impl ChainClient for PaperChain {
    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<TransactionReceipt, ChainError> {
        tokio::time::sleep(self.confirmation).await;

        if let Some(error) = lock(&self.next_error).take() {
            return Err(error);
        }

        let status = if self.revert_next.swap(false, Ordering::SeqCst) {
            ReceiptStatus::Reverted
        } else {
            ReceiptStatus::Success
        };
        let block_number = self.block.fetch_add(1, Ordering::SeqCst);
        debug!("Paper chain mined {} in block {} ({:?})", tx_hash, block_number, status);

        Ok(TransactionReceipt {
            tx_hash,
            status,
            block_number: Some(block_number),
        })
    }
}
