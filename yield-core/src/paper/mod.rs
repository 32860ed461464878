//! Simulated collaborators: a wallet that signs without keys and a chain that
//! mines every transfer after a fixed delay. Both can be scripted to fail.

pub mod chain;
pub mod wallet;

pub use chain::PaperChain;
pub use wallet::PaperWallet;
