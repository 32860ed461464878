use thiserror::Error;
use yield_api::ProtocolId;

/// Reasons an initial set of positions is refused.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("A strategy needs at least one protocol position")]
    NoPositions,

    #[error("Protocol id '{0}' is used more than once")]
    DuplicateId(ProtocolId),

    #[error("Allocation of '{id}' is {allocation}, expected a value in [0, 100]")]
    AllocationOutOfRange { id: ProtocolId, allocation: f64 },

    #[error("Allocations sum to {0}, expected 100")]
    AllocationSum(f64),
}
