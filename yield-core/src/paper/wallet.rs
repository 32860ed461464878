use crate::shared::lock;
use alloy_primitives::keccak256;
use async_trait::async_trait;
use log::{debug, info};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use yield_api::{Address, TransferRequest, TxHash, WalletConnector, WalletError};

/// In-memory wallet for demos and tests.
///
/// Every transfer is accepted unless a failure was scripted with
/// [`PaperWallet::fail_next`] or [`PaperWallet::reject_next`]. Transaction
/// hashes are derived from the call data and a nonce, so they are
/// deterministic for a given sequence of transfers.
pub struct PaperWallet {
    address: Address,
    connected: AtomicBool,
    nonce: AtomicU64,
    next_error: Mutex<Option<WalletError>>,
    transfers: Mutex<Vec<TransferRequest>>,
}

impl PaperWallet {
    /// A disconnected wallet owning `address`.
    pub fn new(address: Address) -> Self {
        Self {
            address,
            connected: AtomicBool::new(false),
            nonce: AtomicU64::new(0),
            next_error: Mutex::new(None),
            transfers: Mutex::new(Vec::new()),
        }
    }

    /// A wallet that is already connected.
    pub fn connected(address: Address) -> Self {
        let wallet = Self::new(address);
        wallet.connected.store(true, Ordering::SeqCst);
        wallet
    }

    /// The next transfer fails with `error`.
    pub fn fail_next(&self, error: WalletError) {
        *lock(&self.next_error) = Some(error);
    }

    /// The next transfer is declined the way a browser wallet reports it.
    pub fn reject_next(&self) {
        self.fail_next(WalletError::Provider(
            "User rejected the request.".to_string(),
        ));
    }

    /// Transfers signed so far, oldest first.
    pub fn transfers(&self) -> Vec<TransferRequest> {
        lock(&self.transfers).clone()
    }
}

#[async_trait]
impl WalletConnector for PaperWallet {
    async fn connect(&self) -> Result<Address, WalletError> {
        self.connected.store(true, Ordering::SeqCst);
        info!("Paper wallet {} connected", self.address);
        Ok(self.address)
    }

    async fn disconnect(&self) -> Result<(), WalletError> {
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn external_address(&self) -> Option<Address> {
        self.is_connected().then_some(self.address)
    }

    async fn send_transfer(&self, request: TransferRequest) -> Result<TxHash, WalletError> {
        if !self.is_connected() {
            return Err(WalletError::NotConnected);
        }
        if let Some(error) = lock(&self.next_error).take() {
            return Err(error);
        }

        let nonce = self.nonce.fetch_add(1, Ordering::SeqCst);
        let mut preimage = request.calldata.clone();
        preimage.extend_from_slice(&nonce.to_be_bytes());
        let tx_hash = keccak256(&preimage);

        debug!("Paper wallet signed transfer {} (nonce {})", tx_hash, nonce);
        lock(&self.transfers).push(request);
        Ok(tx_hash)
    }
}
