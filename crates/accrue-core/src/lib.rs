//! # accrue-core
//! Foundation types, fixed-point math, and collaborator traits for the
//! Accrue interest ledger.

pub mod constants;
pub mod error;
pub mod math;
pub mod traits;
pub mod types;

pub use alloy_primitives::U256;
