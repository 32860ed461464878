//! Read-only dashboard view assembled from both stores.

use crate::store::StrategyStore;
use crate::token::display_usdc;
use crate::wallet::WalletStore;
use serde::{Deserialize, Serialize};
use yield_api::{Address, DepositStatus, ProtocolId, RebalanceEvent, TxHash};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionView {
    pub id: ProtocolId,
    pub name: String,
    pub apr: f64,
    pub allocation: f64,
    /// Share of the virtual balance, in USDC.
    pub allocated_amount: f64,
    pub tvl: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub positions: Vec<PositionView>,
    pub weighted_apr: f64,
    pub total_earnings: f64,
    pub earnings_yield_percent: f64,
    pub virtual_balance: f64,
    pub auto_rebalance: bool,
    pub last_rebalance_at: i64,
    pub deposit_status: DepositStatus,
    pub deposit_tx: Option<TxHash>,
    pub external_address: Option<Address>,
    pub agent_address: Address,
    pub history: Vec<RebalanceEvent>,
}

impl DashboardSnapshot {
    pub fn capture(strategy: &StrategyStore, wallet: &WalletStore) -> Self {
        let balance = wallet.virtual_balance();
        let state = strategy.state();

        let positions = state
            .positions()
            .iter()
            .map(|p| PositionView {
                id: p.id().clone(),
                name: p.name().to_string(),
                apr: p.apr(),
                allocation: p.allocation(),
                allocated_amount: strategy.allocated_amount(p.id(), balance).unwrap_or(0.0),
                tvl: p.tvl(),
                color: p.color().to_string(),
            })
            .collect();

        Self {
            positions,
            weighted_apr: strategy.weighted_apr(),
            total_earnings: state.total_earnings(),
            earnings_yield_percent: strategy.earnings_yield_percent(balance),
            virtual_balance: balance,
            auto_rebalance: state.is_auto_rebalancing(),
            last_rebalance_at: state.last_rebalance_at(),
            deposit_status: wallet.pending().status,
            deposit_tx: wallet.pending().tx_hash,
            external_address: wallet.external_address(),
            agent_address: wallet.agent_address(),
            history: state.history().to_vec(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// One-line human readable summary for logs.
    pub fn summary(&self) -> String {
        let allocations: Vec<String> = self
            .positions
            .iter()
            .map(|p| format!("{} {:.2}% @ {}%", p.name, p.allocation, p.apr))
            .collect();

        format!(
            "balance {} | earnings {} ({:.4}%) | APR {:.2}% | {} | auto-rebalance {}",
            display_usdc(self.virtual_balance),
            display_usdc(self.total_earnings),
            self.earnings_yield_percent,
            self.weighted_apr,
            allocations.join(", "),
            if self.auto_rebalance { "on" } else { "off" }
        )
    }
}
