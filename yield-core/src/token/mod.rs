//! USDC on Base: contract constants, base-unit conversion and the ERC-20
//! calls the deposit flow needs.

use alloy_primitives::{address, Address, U256};
use alloy_sol_types::{sol, SolCall};
use yield_api::TransferRequest;

/// USDC contract on Base mainnet.
pub const USDC_ADDRESS: Address = address!("833589fCD6eDb6E08f4c7C32D4f71b54bdA02913");
pub const USDC_DECIMALS: u8 = 6;
pub const BASE_CHAIN_ID: u64 = 8453;

const UNITS_PER_USDC: f64 = 1_000_000.0;

sol! {
    function transfer(address to, uint256 amount) external returns (bool);
}

/// USDC amount to base units, rounded down. Negative or non-finite amounts
/// give zero.
pub fn parse_usdc(amount: f64) -> U256 {
    if !amount.is_finite() || amount <= 0.0 {
        return U256::ZERO;
    }
    U256::from((amount * UNITS_PER_USDC).floor() as u128)
}

/// Base units to a USDC amount.
pub fn format_usdc(units: U256) -> f64 {
    u128::try_from(units).unwrap_or(u128::MAX) as f64 / UNITS_PER_USDC
}

/// Renders an amount as US dollars with 2 to 6 fraction digits,
/// e.g. `$1,234.50` or `$0.000123`.
pub fn display_usdc(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let fixed = format!("{:.6}", amount.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

    let mut fraction = fraction.trim_end_matches('0').to_string();
    while fraction.len() < 2 {
        fraction.push('0');
    }

    format!("{}${}.{}", sign, group_thousands(whole), fraction)
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// Whether `input` is an acceptable partial amount: digits with at most one
/// decimal point. The empty string is accepted.
pub fn is_amount_input(input: &str) -> bool {
    input.chars().all(|c| c.is_ascii_digit() || c == '.')
        && input.chars().filter(|&c| c == '.').count() <= 1
}

/// Parses a typed amount. Returns `None` for rejected input and for input
/// that is not yet a number (`""`, `"."`).
pub fn parse_amount_input(input: &str) -> Option<f64> {
    if !is_amount_input(input) || !input.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    let normalized = if input.starts_with('.') {
        format!("0{}", input)
    } else {
        input.trim_end_matches('.').to_string()
    };
    normalized.parse().ok()
}

/// ABI-encoded `transfer(to, amount)` including the selector.
pub fn transfer_calldata(to: Address, amount: U256) -> Vec<u8> {
    transferCall { to, amount }.abi_encode()
}

/// A USDC transfer on Base from `from` to `to`.
pub fn transfer_request(from: Address, to: Address, units: U256) -> TransferRequest {
    TransferRequest {
        chain_id: BASE_CHAIN_ID,
        token: USDC_ADDRESS,
        from,
        to,
        amount: units,
        calldata: transfer_calldata(to, units),
    }
}
