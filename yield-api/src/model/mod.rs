pub mod deposit;
pub mod identity;
pub mod protocol;
pub mod rebalance;
pub mod strategy;
pub mod transfer;
pub mod wallet;

/// Rounds `value` to `decimals` fractional digits, half away from zero.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
