use thiserror::Error;

/// Errors reported by a [`WalletConnector`](crate::traits::wallet_connector::WalletConnector).
///
/// Provider messages are carried verbatim: callers look for well-known
/// phrases (e.g. "User rejected") to tell a cancelled signature apart from a
/// real failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WalletError {
    /// No external wallet is connected.
    #[error("No external wallet connected")]
    NotConnected,

    /// The wallet provider refused or failed the request.
    #[error("{0}")]
    Provider(String),
}

/// Errors reported by a [`ChainClient`](crate::traits::chain_client::ChainClient).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChainError {
    /// The RPC endpoint failed to answer.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// The transaction is unknown to the node.
    #[error("Transaction {0} not found")]
    NotFound(String),
}
