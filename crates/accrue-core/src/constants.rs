//! Ledger constants. All rates and the yield integral are fixed-point
//! integers scaled by [`SCALE`] (10^18).

/// Fixed-point denominator shared by rates and the cumulative yield integral.
pub const SCALE: u128 = 1_000_000_000_000_000_000;

/// One whole token in base units (18 decimals).
///
/// Amounts are not required to use 18 decimals, but the scenario tests and
/// the CLI simulator do.
pub const UNIT: u128 = 1_000_000_000_000_000_000;

/// Seconds in a 365-day year. Annual rates are converted to per-second
/// rates by floor division by this value.
pub const SECONDS_PER_YEAR: u64 = 31_536_000;

/// Convert an annualized rate (scaled by [`SCALE`]) to a per-second rate.
///
/// Uses floor division, so the per-second rate may under-represent the
/// annual rate by up to one unit of precision per second.
///
/// # Examples
///
/// ```
/// use accrue_core::constants::{rate_per_second, SCALE};
/// // 15% per year
/// let r = rate_per_second(15 * SCALE / 100);
/// assert_eq!(r, 4_756_468_797);
/// ```
pub fn rate_per_second(rate_per_year: u128) -> u128 {
    rate_per_year / SECONDS_PER_YEAR as u128
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_is_1e18() {
        assert_eq!(SCALE, 10u128.pow(18));
        assert_eq!(UNIT, SCALE);
    }

    #[test]
    fn seconds_per_year_is_365_days() {
        assert_eq!(SECONDS_PER_YEAR, 365 * 24 * 60 * 60);
    }

    #[test]
    fn rate_conversion_floors() {
        // 150000000000000000 / 31536000 = 4756468797.56...
        assert_eq!(rate_per_second(150_000_000_000_000_000), 4_756_468_797);
        assert_eq!(rate_per_second(SECONDS_PER_YEAR as u128 - 1), 0);
        assert_eq!(rate_per_second(SECONDS_PER_YEAR as u128), 1);
    }

    #[test]
    fn zero_rate_is_zero() {
        assert_eq!(rate_per_second(0), 0);
    }
}
