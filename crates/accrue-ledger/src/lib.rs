//! # accrue-ledger: Perpetual simple-interest ledger.
//!
//! All balance arithmetic is integer fixed point at 10^18 with 256-bit
//! intermediates.
//!
//! - **Rate schedule**: a base rate plus future rate changes at strictly
//!   increasing start times.
//! - **Yield integral**: `C(t)`, the integral of the per-second rate, derived
//!   on demand from the schedule.
//! - **Solvency totals**: `A = Σ principal` and `B = Σ principal·C(t0)` give
//!   total liabilities in O(1) regardless of the number of stakes.
//! - **Stake lifecycle**: deposit, compound-and-deposit and claim, each
//!   all-or-nothing against the asset vault.

pub mod collaborators;
pub mod config;
pub mod events;
pub mod gates;
pub mod integrator;
pub mod ledger;
pub mod schedule;
pub mod solvency;
pub mod stake;

pub use collaborators::{ManualClock, MemoryVault, StaticAuthority, SystemClock};
pub use config::{LedgerConfig, ScheduledRate};
pub use events::LedgerEvent;
pub use gates::{FeatureGates, Gate};
pub use integrator::{accrued_between, cumulative};
pub use ledger::{ClaimReceipt, CompoundReceipt, YieldLedger};
pub use schedule::RateSchedule;
pub use solvency::SolvencyLedger;
pub use stake::AccountStake;
