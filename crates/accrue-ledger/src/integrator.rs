//! Cumulative yield integral `C(t)`.
//!
//! `C(t)` is the integral of the per-second rate from 0 to `t`, in the same
//! 10^18 fixed-point scale as the rates. It is derived on demand from the
//! schedule and never stored. All arithmetic is checked.

use accrue_core::error::LedgerError;
use accrue_core::types::Timestamp;

use crate::schedule::RateSchedule;

/// `rate * (end - start)`, checked. Requires `start <= end`.
fn segment(rate: u128, start: Timestamp, end: Timestamp) -> Result<u128, LedgerError> {
    rate.checked_mul((end - start) as u128)
        .ok_or(LedgerError::ArithmeticOverflow)
}

/// Compute `C(t)` by piecewise integration of the schedule.
///
/// Each entry closes the sub-interval `[prev_start, entry.start)` at the
/// rate that was in force before it. The first entry at or beyond `t` closes
/// `[prev_start, t)` instead; if every entry precedes `t`, the last rate
/// covers `[last_start, t)`.
pub fn cumulative(schedule: &RateSchedule, t: Timestamp) -> Result<u128, LedgerError> {
    let mut acc: u128 = 0;
    let mut prev_start: Timestamp = 0;
    let mut prev_rate = schedule.base_rate();

    for entry in schedule.entries() {
        if entry.start_time >= t {
            let tail = segment(prev_rate, prev_start, t)?;
            return acc.checked_add(tail).ok_or(LedgerError::ArithmeticOverflow);
        }
        let closed = segment(prev_rate, prev_start, entry.start_time)?;
        acc = acc.checked_add(closed).ok_or(LedgerError::ArithmeticOverflow)?;
        prev_start = entry.start_time;
        prev_rate = entry.rate_per_second;
    }

    let tail = segment(prev_rate, prev_start, t)?;
    acc.checked_add(tail).ok_or(LedgerError::ArithmeticOverflow)
}

/// `C(t2) - C(t1)`: the yield accrued over `[t1, t2]`. Returns 0 if `t2 < t1`.
pub fn accrued_between(
    schedule: &RateSchedule,
    t1: Timestamp,
    t2: Timestamp,
) -> Result<u128, LedgerError> {
    if t2 <= t1 {
        return Ok(0);
    }
    let start = cumulative(schedule, t1)?;
    let end = cumulative(schedule, t2)?;
    end.checked_sub(start).ok_or(LedgerError::ArithmeticOverflow)
}
