use serde::{Deserialize, Serialize};

fn default_step() -> f64 {
    5.0
}

fn default_min_apr_gap() -> f64 {
    1.0
}

/// Tuning of the auto-rebalance hill climb.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RebalancePolicy {
    /// Allocation points moved by one automatic rebalance.
    #[serde(default = "default_step")]
    pub step: f64,
    /// The APR spread (percentage points) between the best and the worst
    /// protocol must be strictly above this to trigger a move.
    #[serde(default = "default_min_apr_gap")]
    pub min_apr_gap: f64,
}

impl Default for RebalancePolicy {
    fn default() -> Self {
        Self {
            step: default_step(),
            min_apr_gap: default_min_apr_gap(),
        }
    }
}

impl RebalancePolicy {
    pub fn new(step: f64, min_apr_gap: f64) -> Self {
        Self { step, min_apr_gap }
    }

    pub fn is_valid(&self) -> bool {
        self.step.is_finite() && self.step > 0.0 && self.min_apr_gap.is_finite() && self.min_apr_gap >= 0.0
    }
}
