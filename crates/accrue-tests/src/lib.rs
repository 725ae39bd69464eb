//! Integration test suite for Accrue.
//!
//! Tests drive the ledger end to end through its public API with in-memory
//! collaborators, checking payouts against hand-computed values and the
//! solvency aggregates against brute-force sums.

pub mod helpers;
