//! Error types for the Accrue ledger.
use thiserror::Error;

use crate::types::{AccountId, Amount, Timestamp};

/// Failures reported by the asset-transfer collaborator.
///
/// Lifecycle operations propagate these unchanged (wrapped in
/// [`LedgerError::Transfer`]) after discarding their staged state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("insufficient funds in {account}: have {have}, need {need}")] InsufficientFunds { account: AccountId, have: Amount, need: Amount },
    #[error("transfer not authorized for {0}")] NotAuthorized(AccountId),
    #[error("transfer rejected: {0}")] Rejected(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("deposits are closed")] DepositsClosed,
    #[error("claims are closed")] ClaimsClosed,
    #[error("compounding is closed")] CompoundClosed,
    #[error("account {0} already has a live stake")] AlreadyHasStake(AccountId),
    #[error("nothing to claim")] NothingToClaim,
    #[error("nothing to deposit")] NothingToDeposit,
    #[error("insufficient ledger balance: requested {requested}, available {available}")] InsufficientLedgerBalance { requested: Amount, available: Amount },
    #[error("rate change starts in the past: {start_time} < {now}")] InvalidStartTime { start_time: Timestamp, now: Timestamp },
    #[error("rate change at {start_time} took effect before {now} and cannot be removed")] RateAlreadyActive { start_time: Timestamp, now: Timestamp },
    #[error("rate change start {start_time} does not follow {last}")] StartTimeNotIncreasing { start_time: Timestamp, last: Timestamp },
    #[error("arithmetic overflow")] ArithmeticOverflow,
    #[error("caller {0} is not privileged")] Unauthorized(AccountId),
    #[error("invariant violation: {0}")] InvariantViolation(String),
    #[error(transparent)] Transfer(#[from] TransferError),
}

/// Failures while loading ledger configuration from a file or the environment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("reading {path}: {reason}")] Io { path: String, reason: String },
    #[error("parsing {path}: {reason}")] Parse { path: String, reason: String },
    #[error("invalid value for {key}: {value}")] InvalidValue { key: String, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_error_converts_into_ledger_error() {
        let err: LedgerError = TransferError::Rejected("frozen".into()).into();
        assert_eq!(err, LedgerError::Transfer(TransferError::Rejected("frozen".into())));
        assert_eq!(err.to_string(), "transfer rejected: frozen");
    }

    #[test]
    fn balance_error_reports_both_amounts() {
        let err = LedgerError::InsufficientLedgerBalance { requested: 575, available: 100 };
        assert_eq!(
            err.to_string(),
            "insufficient ledger balance: requested 575, available 100"
        );
    }

    #[test]
    fn stake_error_names_account() {
        let id = AccountId([0xAB; 20]);
        let msg = LedgerError::AlreadyHasStake(id).to_string();
        assert!(msg.contains("0xabab"), "unexpected message: {msg}");
    }

    #[test]
    fn active_rate_error_is_distinct_from_backdated_add() {
        let removal = LedgerError::RateAlreadyActive { start_time: 10, now: 11 };
        assert_ne!(removal, LedgerError::InvalidStartTime { start_time: 10, now: 11 });
        assert!(removal.to_string().contains("cannot be removed"));
    }
}
