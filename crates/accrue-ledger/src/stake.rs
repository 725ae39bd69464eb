//! Per-account stake record and accrual formulas.

use serde::{Deserialize, Serialize};

use accrue_core::error::LedgerError;
use accrue_core::math::apply_scaled;
use accrue_core::types::{Amount, Timestamp};

/// A live position: `principal` deposited (or re-based) at `t0`.
///
/// `anchor` caches `C(t0)`. Past schedule segments are immutable, so the
/// cached value always equals the integral recomputed at `t0`; it is also
/// exactly the value the position contributed to the aggregate `B`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccountStake {
    pub principal: Amount,
    pub t0: Timestamp,
    pub anchor: u128,
}

impl AccountStake {
    pub fn new(principal: Amount, t0: Timestamp, anchor: u128) -> Self {
        Self {
            principal,
            t0,
            anchor,
        }
    }

    /// Simple interest earned since `t0`: `floor(principal · (c_now − C(t0)) / SCALE)`.
    ///
    /// A `c_now` below the anchor yields zero.
    pub fn interest(&self, c_now: u128) -> Result<Amount, LedgerError> {
        apply_scaled(self.principal, c_now.saturating_sub(self.anchor))
    }

    /// Principal plus interest at `c_now`.
    pub fn value(&self, c_now: u128) -> Result<Amount, LedgerError> {
        self.principal
            .checked_add(self.interest(c_now)?)
            .ok_or(LedgerError::ArithmeticOverflow)
    }
}
