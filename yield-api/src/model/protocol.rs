//! Protocol position model.
//!
//! A position is one lending protocol the strategy allocates funds to. Only
//! `apr` and `allocation` change during a session; the remaining fields are
//! presentation data.

use super::identity::ProtocolId;
use super::round_to;
use serde::{Deserialize, Serialize};

/// Lowest APR a position can report (percent).
pub const MIN_APR: f64 = 0.5;
/// Highest APR a position can report (percent).
pub const MAX_APR: f64 = 15.0;

/// Clamps an APR into `[MIN_APR, MAX_APR]` and rounds it to 2 decimals.
pub fn normalize_apr(apr: f64) -> f64 {
    round_to(apr.clamp(MIN_APR, MAX_APR), 2)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolPosition {
    id: ProtocolId,
    name: String,
    /// Annual percentage rate, e.g. 5.5 for 5.5%.
    apr: f64,
    /// Share of the managed funds in percent, e.g. 30 for 30%.
    allocation: f64,
    /// Total value locked in USD. Display only.
    #[serde(default)]
    tvl: f64,
    #[serde(default)]
    icon: String,
    #[serde(default)]
    color: String,
}

impl ProtocolPosition {
    pub fn new(
        id: impl Into<ProtocolId>,
        name: impl Into<String>,
        apr: f64,
        allocation: f64,
        tvl: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            apr: normalize_apr(apr),
            allocation,
            tvl,
            icon: String::new(),
            color: String::new(),
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn id(&self) -> &ProtocolId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn apr(&self) -> f64 {
        self.apr
    }

    pub fn allocation(&self) -> f64 {
        self.allocation
    }

    pub fn tvl(&self) -> f64 {
        self.tvl
    }

    pub fn icon(&self) -> &str {
        &self.icon
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    /// Sets the APR, keeping it inside the reportable range.
    pub fn set_apr(&mut self, apr: f64) {
        self.apr = normalize_apr(apr);
    }

    pub fn set_allocation(&mut self, allocation: f64) {
        self.allocation = allocation;
    }

    /// Re-applies the APR bounds, used after deserializing external input.
    pub fn normalized(mut self) -> Self {
        self.apr = normalize_apr(self.apr);
        self
    }
}

/// The three lending markets the dashboard starts with.
pub fn default_positions() -> Vec<ProtocolPosition> {
    vec![
        ProtocolPosition::new("aave", "Aave V3", 4.2, 40.0, 1_200_000_000.0)
            .with_icon("https://cryptologos.cc/logos/aave-aave-logo.svg")
            .with_color("#B6509E"),
        ProtocolPosition::new("compound", "Compound", 3.8, 35.0, 850_000_000.0)
            .with_icon("https://cryptologos.cc/logos/compound-comp-logo.svg")
            .with_color("#00D395"),
        ProtocolPosition::new("morpho", "Morpho Blue", 5.1, 25.0, 420_000_000.0)
            .with_icon("https://assets.coingecko.com/coins/images/29837/standard/Morpho-token-icon.png")
            .with_color("#4B82FF"),
    ]
}
