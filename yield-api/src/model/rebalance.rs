use super::protocol::ProtocolPosition;
use serde::{Deserialize, Serialize};

/// What triggered a rebalance. Only changes the wording of the reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RebalanceKind {
    /// Requested explicitly with a source, destination and percentage.
    Manual,
    /// Chosen by the auto-rebalance policy on a driver tick.
    Automatic,
}

impl RebalanceKind {
    fn label(self) -> &'static str {
        match self {
            RebalanceKind::Manual => "APR optimization",
            RebalanceKind::Automatic => "Auto-rebalance",
        }
    }
}

/// A record of allocation moved from one protocol to another.
///
/// Events are immutable once created; the store keeps the most recent ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RebalanceEvent {
    id: String,
    from_protocol: String,
    to_protocol: String,
    /// Percentage points of allocation moved.
    amount: f64,
    reason: String,
    /// Unix timestamp in milliseconds.
    timestamp: i64,
}

impl RebalanceEvent {
    /// Builds the event for a move of `amount` points from `from` to `to`.
    ///
    /// The reason quotes both APRs as they were when the move happened.
    pub fn new(
        kind: RebalanceKind,
        from: &ProtocolPosition,
        to: &ProtocolPosition,
        amount: f64,
        timestamp: i64,
    ) -> Self {
        let reason = format!(
            "{}: {} ({}%) → {} ({}%)",
            kind.label(),
            from.name(),
            from.apr(),
            to.name(),
            to.apr()
        );

        Self {
            id: format!("rb-{}", timestamp),
            from_protocol: from.name().to_string(),
            to_protocol: to.name().to_string(),
            amount,
            reason,
            timestamp,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn from_protocol(&self) -> &str {
        &self.from_protocol
    }

    pub fn to_protocol(&self) -> &str {
        &self.to_protocol
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }
}
