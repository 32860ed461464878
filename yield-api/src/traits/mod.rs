pub mod chain_client;
pub mod clock;
pub mod wallet_connector;
