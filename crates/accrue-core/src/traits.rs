//! Collaborator interfaces consumed by the ledger.
//!
//! - [`AssetVault`]: moves the pooled fungible asset in and out
//! - [`Authority`]: decides which callers may run privileged operations
//! - [`Clock`]: supplies the current time
//!
//! The ledger calls these while holding its lock. Implementations must not
//! call back into the ledger.

use crate::error::TransferError;
use crate::types::{AccountId, Amount, AssetId, Timestamp};

/// Custody of the pooled asset.
///
/// `debit` and `credit` are the only points where a lifecycle operation can
/// fail for external reasons. A failed call must leave the vault unchanged.
pub trait AssetVault: Send + Sync {
    /// Pull `amount` from `from` into the pool.
    fn debit(&self, from: &AccountId, amount: Amount) -> Result<(), TransferError>;

    /// Pay `amount` out of the pool to `to`.
    fn credit(&self, to: &AccountId, amount: Amount) -> Result<(), TransferError>;

    /// Pool balance currently available for payouts.
    fn available_balance(&self) -> Result<Amount, TransferError>;

    /// Move `amount` of any asset held by the pool to `to`, the pooled
    /// asset included.
    ///
    /// Used by privileged rescue. No ledger accounting is involved, so
    /// rescuing the pooled asset shows up as a larger `net_owed`.
    fn rescue(&self, asset: &AssetId, to: &AccountId, amount: Amount) -> Result<(), TransferError>;
}

/// Authorization predicate for privileged operations.
pub trait Authority: Send + Sync {
    fn is_privileged(&self, caller: &AccountId) -> bool;
}

/// Source of the current time in Unix seconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}
