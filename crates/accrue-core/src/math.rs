//! Fixed-point helpers with 256-bit intermediates.
//!
//! Products of two `u128` quantities are computed in [`U256`], which cannot
//! overflow, and narrowed back to `u128` only after the division by
//! [`SCALE`]. Narrowing a value that does not fit is an
//! [`LedgerError::ArithmeticOverflow`], never a truncation.

use alloy_primitives::U256;

use crate::constants::SCALE;
use crate::error::LedgerError;

/// Full-width product of two `u128` values.
pub fn mul_wide(a: u128, b: u128) -> U256 {
    // (2^128 - 1)^2 < 2^256
    U256::from(a) * U256::from(b)
}

/// Narrow a 256-bit value to `u128`, failing if it does not fit.
pub fn narrow(value: U256) -> Result<u128, LedgerError> {
    if value > U256::from(u128::MAX) {
        return Err(LedgerError::ArithmeticOverflow);
    }
    Ok(value.to::<u128>())
}

/// `floor(a * b / denominator)` with a 256-bit intermediate.
pub fn mul_div_floor(a: u128, b: u128, denominator: u128) -> Result<u128, LedgerError> {
    if denominator == 0 {
        return Err(LedgerError::ArithmeticOverflow);
    }
    narrow(mul_wide(a, b) / U256::from(denominator))
}

/// `floor(amount * scaled / SCALE)`: apply a 1e18-scaled factor to an amount.
///
/// # Examples
///
/// ```
/// use accrue_core::constants::SCALE;
/// use accrue_core::math::apply_scaled;
/// // 500 * 0.15
/// assert_eq!(apply_scaled(500, 15 * SCALE / 100).unwrap(), 75);
/// ```
pub fn apply_scaled(amount: u128, scaled: u128) -> Result<u128, LedgerError> {
    mul_div_floor(amount, scaled, SCALE)
}
