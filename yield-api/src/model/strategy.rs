//! Strategy state model.
//!
//! Holds the protocol positions, the accrued earnings and the rebalance
//! history. The state itself only guards its own data invariants (history
//! bound, earnings precision); decisions live in the store that owns it.

use super::identity::ProtocolId;
use super::protocol::{default_positions, ProtocolPosition};
use super::rebalance::RebalanceEvent;
use super::round_to;
use serde::{Deserialize, Serialize};

/// Number of rebalance events kept in the history.
pub const HISTORY_CAPACITY: usize = 10;
/// Fractional digits kept on cumulative earnings (USDC precision).
pub const EARNINGS_DECIMALS: i32 = 6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyState {
    positions: Vec<ProtocolPosition>,
    /// Cumulative earnings in USDC.
    total_earnings: f64,
    auto_rebalance: bool,
    /// Unix timestamp in milliseconds.
    last_rebalance_at: i64,
    /// Most recent first.
    history: Vec<RebalanceEvent>,
}

impl StrategyState {
    pub fn new(positions: Vec<ProtocolPosition>, auto_rebalance: bool, now: i64) -> Self {
        Self {
            positions,
            total_earnings: 0.0,
            auto_rebalance,
            last_rebalance_at: now,
            history: Vec::new(),
        }
    }

    /// Aave / Compound / Morpho at 40 / 35 / 25 with auto-rebalance enabled.
    pub fn with_defaults(now: i64) -> Self {
        Self::new(default_positions(), true, now)
    }

    pub fn positions(&self) -> &[ProtocolPosition] {
        &self.positions
    }

    pub fn positions_mut(&mut self) -> &mut [ProtocolPosition] {
        &mut self.positions
    }

    pub fn position(&self, id: &ProtocolId) -> Option<&ProtocolPosition> {
        self.positions.iter().find(|p| p.id() == id)
    }

    pub fn position_index(&self, id: &ProtocolId) -> Option<usize> {
        self.positions.iter().position(|p| p.id() == id)
    }

    pub fn total_earnings(&self) -> f64 {
        self.total_earnings
    }

    pub fn is_auto_rebalancing(&self) -> bool {
        self.auto_rebalance
    }

    pub fn set_auto_rebalance(&mut self, enabled: bool) {
        self.auto_rebalance = enabled;
    }

    pub fn last_rebalance_at(&self) -> i64 {
        self.last_rebalance_at
    }

    pub fn history(&self) -> &[RebalanceEvent] {
        &self.history
    }

    /// Sum of all allocations in percent. 100 for a fully invested state.
    pub fn total_allocation(&self) -> f64 {
        self.positions.iter().map(|p| p.allocation()).sum()
    }

    /// Allocation-weighted APR in percent.
    pub fn weighted_apr(&self) -> f64 {
        self.positions
            .iter()
            .map(|p| p.apr() * p.allocation() / 100.0)
            .sum()
    }

    /// Adds `delta` to the earnings and rounds to USDC precision.
    pub fn add_earnings(&mut self, delta: f64) {
        self.total_earnings = round_to(self.total_earnings + delta, EARNINGS_DECIMALS);
    }

    /// Prepends an event, stamps the last rebalance time and drops the
    /// oldest entries beyond [`HISTORY_CAPACITY`].
    pub fn record_rebalance(&mut self, event: RebalanceEvent) {
        self.last_rebalance_at = event.timestamp();
        self.history.insert(0, event);
        self.history.truncate(HISTORY_CAPACITY);
    }
}
