//! Aggregate solvency tracking.
//!
//! Two running totals are kept across all live stakes:
//!
//! - `A = Σ principal_i`
//! - `B = Σ principal_i · C(t0_i)` (unscaled, carries the 10^18 factor)
//!
//! Since each stake is worth `principal_i · (1 + C(t) − C(t0_i))`, the sum
//! over all stakes is `A + (A·C(t) − B) / SCALE`, which needs no iteration.
//! `B` is held in 256 bits; every update is checked and fails loudly.

use accrue_core::U256;
use accrue_core::constants::SCALE;
use accrue_core::error::LedgerError;
use accrue_core::math::{mul_wide, narrow};
use accrue_core::types::Amount;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SolvencyLedger {
    total_principal: Amount,
    weighted_anchor: U256,
}

impl SolvencyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// `A`: total principal across live stakes.
    pub fn total_principal(&self) -> Amount {
        self.total_principal
    }

    /// `B`: Σ principal · C(t0) across live stakes.
    pub fn weighted_anchor(&self) -> U256 {
        self.weighted_anchor
    }

    /// Account for a new position of `amount` opened when the integral was `c_t0`.
    pub fn open_position(&mut self, amount: Amount, c_t0: u128) -> Result<(), LedgerError> {
        let total_principal = self
            .total_principal
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        let weighted_anchor = self
            .weighted_anchor
            .checked_add(mul_wide(amount, c_t0))
            .ok_or(LedgerError::ArithmeticOverflow)?;
        self.total_principal = total_principal;
        self.weighted_anchor = weighted_anchor;
        Ok(())
    }

    /// Retire a position previously opened with [`open_position`](Self::open_position).
    pub fn close_position(&mut self, amount: Amount, c_t0: u128) -> Result<(), LedgerError> {
        let total_principal = self
            .total_principal
            .checked_sub(amount)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        let weighted_anchor = self
            .weighted_anchor
            .checked_sub(mul_wide(amount, c_t0))
            .ok_or(LedgerError::ArithmeticOverflow)?;
        self.total_principal = total_principal;
        self.weighted_anchor = weighted_anchor;
        Ok(())
    }

    /// Total owed to all depositors when the integral is `c_now`:
    /// `A + floor((A·c_now − B) / SCALE)`.
    pub fn total_liabilities(&self, c_now: u128) -> Result<Amount, LedgerError> {
        let accrued = mul_wide(self.total_principal, c_now)
            .checked_sub(self.weighted_anchor)
            .ok_or(LedgerError::ArithmeticOverflow)?
            / U256::from(SCALE);
        self.total_principal
            .checked_add(narrow(accrued)?)
            .ok_or(LedgerError::ArithmeticOverflow)
    }

    /// Shortfall of `assets` against total liabilities, floored at zero.
    pub fn net_owed(&self, c_now: u128, assets: Amount) -> Result<Amount, LedgerError> {
        Ok(self.total_liabilities(c_now)?.saturating_sub(assets))
    }
}
