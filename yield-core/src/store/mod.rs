//! # Strategy Store
//!
//! Owns the [`StrategyState`] and exposes the transitions the simulation is
//! allowed to apply to it. Every transition is synchronous and completes
//! before returning; there is exactly one writer at a time.
//!
//! Transitions that cannot apply (unknown protocol, not enough allocation,
//! auto-rebalance disabled) are silent no-ops: they leave the state untouched
//! and report it through their return value only.

use log::{debug, info};
use rand::Rng;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;
use yield_api::model::protocol::default_positions;
use yield_api::{Clock, ProtocolId, ProtocolPosition, RebalanceEvent, RebalanceKind, StrategyState};

pub mod error;
pub mod policy;

pub use error::StoreError;
pub use policy::RebalancePolicy;

/// Half-width of the uniform APR jitter, in percentage points.
pub const APR_JITTER: f64 = 0.5;

const ALLOCATION_TOLERANCE: f64 = 1e-6;

pub struct StrategyStore {
    state: StrategyState,
    // Kept to restore the session on reset.
    initial_positions: Vec<ProtocolPosition>,
    initial_auto_rebalance: bool,
    policy: RebalancePolicy,
    clock: Arc<dyn Clock>,
}

impl StrategyStore {
    /// Creates a store over a custom set of positions.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the set is empty, reuses an id, or its
    /// allocations do not sum to 100.
    pub fn new(
        positions: Vec<ProtocolPosition>,
        auto_rebalance: bool,
        policy: RebalancePolicy,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, StoreError> {
        validate_positions(&positions)?;
        let positions: Vec<ProtocolPosition> = positions
            .into_iter()
            .map(ProtocolPosition::normalized)
            .collect();

        Ok(Self::from_parts(positions, auto_rebalance, policy, clock))
    }

    /// Creates a store seeded with the Aave / Compound / Morpho defaults.
    pub fn with_defaults(clock: Arc<dyn Clock>) -> Self {
        Self::from_parts(default_positions(), true, RebalancePolicy::default(), clock)
    }

    fn from_parts(
        positions: Vec<ProtocolPosition>,
        auto_rebalance: bool,
        policy: RebalancePolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let state = StrategyState::new(positions.clone(), auto_rebalance, clock.now_millis());
        Self {
            state,
            initial_positions: positions,
            initial_auto_rebalance: auto_rebalance,
            policy,
            clock,
        }
    }

    pub fn state(&self) -> &StrategyState {
        &self.state
    }

    pub fn policy(&self) -> RebalancePolicy {
        self.policy
    }

    /// Applies an independent uniform jitter in `[-0.5, 0.5)` to every APR,
    /// then clamps and rounds it. Allocations and earnings are untouched.
    pub fn randomize_aprs<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for position in self.state.positions_mut() {
            let delta: f64 = rng.gen_range(-APR_JITTER..APR_JITTER);
            position.set_apr(position.apr() + delta);
        }
        debug!(
            "APRs jittered: {:?}",
            self.state
                .positions()
                .iter()
                .map(|p| (p.id().as_str(), p.apr()))
                .collect::<Vec<_>>()
        );
    }

    /// Overrides the APR of a single protocol (clamped and rounded).
    ///
    /// # Returns
    ///
    /// `false` if the protocol is unknown.
    pub fn set_apr(&mut self, id: &ProtocolId, apr: f64) -> bool {
        match self.state.position_index(id) {
            Some(index) if apr.is_finite() => {
                self.state.positions_mut()[index].set_apr(apr);
                true
            }
            _ => false,
        }
    }

    /// Moves `percentage` allocation points from `from` to `to`.
    ///
    /// Applies only if both protocols exist, differ, and `from` holds at least
    /// `percentage`. Otherwise nothing changes and no event is recorded.
    pub fn rebalance(
        &mut self,
        from: &ProtocolId,
        to: &ProtocolId,
        percentage: f64,
    ) -> Option<RebalanceEvent> {
        if !percentage.is_finite() || percentage <= 0.0 || from == to {
            return None;
        }

        let from_index = self.state.position_index(from)?;
        let to_index = self.state.position_index(to)?;

        if self.state.positions()[from_index].allocation() < percentage {
            debug!(
                "Rebalance {} -> {} skipped: {}% requested, {}% available",
                from,
                to,
                percentage,
                self.state.positions()[from_index].allocation()
            );
            return None;
        }

        Some(self.move_allocation(RebalanceKind::Manual, from_index, to_index, percentage))
    }

    /// One greedy step toward the best APR.
    ///
    /// When enabled, moves `policy.step` points from the lowest-APR protocol to
    /// the highest-APR protocol if their spread exceeds `policy.min_apr_gap`
    /// and the lowest still holds at least `policy.step`.
    pub fn auto_rebalance(&mut self) -> Option<RebalanceEvent> {
        if !self.state.is_auto_rebalancing() {
            return None;
        }

        let (highest, lowest) = self.apr_extremes()?;
        let positions = self.state.positions();
        let gap = positions[highest].apr() - positions[lowest].apr();

        if gap > self.policy.min_apr_gap && positions[lowest].allocation() >= self.policy.step {
            Some(self.move_allocation(RebalanceKind::Automatic, lowest, highest, self.policy.step))
        } else {
            debug!(
                "Auto-rebalance idle: spread {:.2} (min {:.2}), lowest allocation {}",
                gap,
                self.policy.min_apr_gap,
                positions[lowest].allocation()
            );
            None
        }
    }

    /// Adds earnings and rounds to 6 decimals.
    ///
    /// Negative or non-finite deltas are ignored so earnings never decrease.
    pub fn accrue_earnings(&mut self, delta: f64) -> bool {
        if !delta.is_finite() || delta < 0.0 {
            return false;
        }
        self.state.add_earnings(delta);
        true
    }

    /// Flips the auto-rebalance flag and returns the new value.
    pub fn toggle_auto_rebalance(&mut self) -> bool {
        let enabled = !self.state.is_auto_rebalancing();
        self.state.set_auto_rebalance(enabled);
        info!(
            "Auto-rebalance {}",
            if enabled { "enabled" } else { "disabled" }
        );
        enabled
    }

    #[cfg(test)]
    pub fn set_auto_rebalance(&mut self, enabled: bool) {
        self.state.set_auto_rebalance(enabled);
    }

    /// Restores the positions and flag the store was created with.
    pub fn reset(&mut self) {
        self.state = StrategyState::new(
            self.initial_positions.clone(),
            self.initial_auto_rebalance,
            self.clock.now_millis(),
        );
        info!("Strategy reset to its initial allocation");
    }

    pub fn weighted_apr(&self) -> f64 {
        self.state.weighted_apr()
    }

    pub fn total_allocation(&self) -> f64 {
        self.state.total_allocation()
    }

    /// USDC amount of `balance` assigned to a protocol.
    pub fn allocated_amount(&self, id: &ProtocolId, balance: f64) -> Option<f64> {
        self.state
            .position(id)
            .map(|p| balance * p.allocation() / 100.0)
    }

    /// Earnings as a percentage of the balance (a balance under 1 counts as 1).
    pub fn earnings_yield_percent(&self, balance: f64) -> f64 {
        self.state.total_earnings() / balance.max(1.0) * 100.0
    }

    fn move_allocation(
        &mut self,
        kind: RebalanceKind,
        from_index: usize,
        to_index: usize,
        amount: f64,
    ) -> RebalanceEvent {
        let positions = self.state.positions_mut();
        let from_allocation = positions[from_index].allocation() - amount;
        positions[from_index].set_allocation(from_allocation);
        let to_allocation = positions[to_index].allocation() + amount;
        positions[to_index].set_allocation(to_allocation);

        let event = RebalanceEvent::new(
            kind,
            &self.state.positions()[from_index],
            &self.state.positions()[to_index],
            amount,
            self.clock.now_millis(),
        );
        self.state.record_rebalance(event.clone());

        info!("{}", event.reason());
        event
    }

    /// Indices of the highest and lowest APR. Ties keep display order.
    fn apr_extremes(&self) -> Option<(usize, usize)> {
        let positions = self.state.positions();
        let mut order: Vec<usize> = (0..positions.len()).collect();
        order.sort_by(|&a, &b| {
            positions[b]
                .apr()
                .partial_cmp(&positions[a].apr())
                .unwrap_or(Ordering::Equal)
        });

        Some((*order.first()?, *order.last()?))
    }
}

/// Checks that a position set is non-empty, has unique ids and allocations
/// in `[0, 100]` summing to 100.
pub fn validate_positions(positions: &[ProtocolPosition]) -> Result<(), StoreError> {
    if positions.is_empty() {
        return Err(StoreError::NoPositions);
    }

    let mut seen = HashSet::new();
    for position in positions {
        if !seen.insert(position.id()) {
            return Err(StoreError::DuplicateId(position.id().clone()));
        }
        let allocation = position.allocation();
        if !allocation.is_finite() || !(0.0..=100.0).contains(&allocation) {
            return Err(StoreError::AllocationOutOfRange {
                id: position.id().clone(),
                allocation,
            });
        }
    }

    let total: f64 = positions.iter().map(|p| p.allocation()).sum();
    if (total - 100.0).abs() > ALLOCATION_TOLERANCE {
        return Err(StoreError::AllocationSum(total));
    }

    Ok(())
}
