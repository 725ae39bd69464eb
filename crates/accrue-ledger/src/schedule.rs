//! Piecewise-constant yield rate schedule.
//!
//! A base per-second rate applies from time zero. Scheduled entries switch
//! the rate at strictly increasing future instants. Entries are never
//! mutated in place: they are added or removed whole.

use std::collections::BTreeMap;

use accrue_core::constants::rate_per_second;
use accrue_core::error::LedgerError;
use accrue_core::types::{RateEntry, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateSchedule {
    base_rate: u128,
    /// start_time → per-second rate.
    entries: BTreeMap<Timestamp, u128>,
}

impl RateSchedule {
    /// Create an empty schedule from an annualized base rate (scaled by 10^18).
    pub fn new(base_rate_per_year: u128) -> Self {
        Self {
            base_rate: rate_per_second(base_rate_per_year),
            entries: BTreeMap::new(),
        }
    }

    /// Per-second base rate effective before the first entry.
    pub fn base_rate(&self) -> u128 {
        self.base_rate
    }

    /// Register a rate change at `start_time`.
    ///
    /// `start_time` may equal `now` but not precede it, and must be strictly
    /// later than every registered entry. The annual rate is converted to a
    /// per-second rate with floor division.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidStartTime`] if `start_time < now`
    /// - [`LedgerError::StartTimeNotIncreasing`] if `start_time <= last_start()`
    pub fn add_rate(
        &mut self,
        rate_per_year: u128,
        start_time: Timestamp,
        now: Timestamp,
    ) -> Result<RateEntry, LedgerError> {
        self.check_new_start(start_time, now)?;
        let entry = RateEntry {
            start_time,
            rate_per_second: rate_per_second(rate_per_year),
        };
        self.entries.insert(entry.start_time, entry.rate_per_second);
        Ok(entry)
    }

    /// Validate a prospective start time without inserting it.
    pub fn check_new_start(&self, start_time: Timestamp, now: Timestamp) -> Result<(), LedgerError> {
        if start_time < now {
            return Err(LedgerError::InvalidStartTime { start_time, now });
        }
        if let Some(last) = self.last_start() {
            if start_time <= last {
                return Err(LedgerError::StartTimeNotIncreasing { start_time, last });
            }
        }
        Ok(())
    }

    /// Remove the entry at exactly `start_time`.
    ///
    /// Removing an unscheduled start time is a no-op and returns `None`.
    pub fn remove_rate(&mut self, start_time: Timestamp) -> Option<RateEntry> {
        self.entries.remove(&start_time).map(|rate_per_second| RateEntry {
            start_time,
            rate_per_second,
        })
    }

    /// The rate in force at `t`: the entry with the greatest
    /// `start_time <= t`, or the base rate with `start_time == 0`.
    pub fn active_rate(&self, t: Timestamp) -> RateEntry {
        match self.entries.range(..=t).next_back() {
            Some((&start_time, &rate_per_second)) => RateEntry {
                start_time,
                rate_per_second,
            },
            None => RateEntry {
                start_time: 0,
                rate_per_second: self.base_rate,
            },
        }
    }

    /// Entries in ascending start-time order.
    pub fn entries(&self) -> impl Iterator<Item = RateEntry> + '_ {
        self.entries.iter().map(|(&start_time, &rate_per_second)| RateEntry {
            start_time,
            rate_per_second,
        })
    }

    pub fn contains(&self, start_time: Timestamp) -> bool {
        self.entries.contains_key(&start_time)
    }

    pub fn last_start(&self) -> Option<Timestamp> {
        self.entries.keys().next_back().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
