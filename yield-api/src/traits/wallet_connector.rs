//! Defines the `WalletConnector` trait for the user's external wallet.
//!
//! The simulator never holds keys. Connecting, exposing the user's address and
//! signing the deposit transfer are all delegated to an implementation of this
//! trait (a browser wallet bridge, a hardware signer, or the paper wallet used
//! in tests and demos).

use crate::error::WalletError;
use crate::model::transfer::TransferRequest;
use alloy_primitives::{Address, TxHash};
use async_trait::async_trait;

/// A trait for components that own the user's external wallet session.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use yield_api::{Address, TransferRequest, TxHash, WalletConnector, WalletError};
///
/// struct ReadOnlyWallet(Address);
///
/// #[async_trait]
/// impl WalletConnector for ReadOnlyWallet {
///     async fn connect(&self) -> Result<Address, WalletError> {
///         Ok(self.0)
///     }
///     async fn disconnect(&self) -> Result<(), WalletError> {
///         Ok(())
///     }
///     fn is_connected(&self) -> bool {
///         true
///     }
///     fn external_address(&self) -> Option<Address> {
///         Some(self.0)
///     }
///     async fn send_transfer(&self, _request: TransferRequest) -> Result<TxHash, WalletError> {
///         Err(WalletError::Provider("User rejected the request.".into()))
///     }
/// }
/// ```
#[async_trait]
pub trait WalletConnector: Send + Sync {
    /// Opens the wallet session and returns the connected address.
    async fn connect(&self) -> Result<Address, WalletError>;

    /// Closes the wallet session.
    async fn disconnect(&self) -> Result<(), WalletError>;

    /// Whether a wallet session is currently open.
    fn is_connected(&self) -> bool;

    /// Address of the connected external wallet, if any.
    fn external_address(&self) -> Option<Address>;

    /// Asks the wallet to sign and broadcast a token transfer.
    ///
    /// # Returns
    ///
    /// * `TxHash` - The hash of the broadcast transaction.
    async fn send_transfer(&self, request: TransferRequest) -> Result<TxHash, WalletError>;
}
