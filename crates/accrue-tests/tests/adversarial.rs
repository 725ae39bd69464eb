//! Adversarial tests: unprivileged callers, arithmetic extremes, and
//! attempts to rewrite accrued history or drain the pool.

use accrue_core::constants::{SECONDS_PER_YEAR, UNIT};
use accrue_core::error::LedgerError;
use accrue_core::types::AssetId;
use accrue_tests::helpers::*;

#[test]
fn non_admin_cannot_touch_privileged_surface() {
    let h = Harness::new();
    let mallory = acct(0x66);
    h.fund_and_deposit(acct(1), UNIT);
    h.vault.hold_foreign(AssetId([7; 20]), 100);

    let denied = LedgerError::Unauthorized(mallory);
    assert_eq!(h.ledger.add_yield_change(&mallory, pct(1_000), GENESIS).unwrap_err(), denied);
    assert_eq!(h.ledger.remove_yield_change(&mallory, GENESIS).unwrap_err(), denied);
    assert_eq!(h.ledger.pause_claim(&mallory).unwrap_err(), denied);
    assert_eq!(h.ledger.unpause_deposit(&mallory).unwrap_err(), denied);
    assert_eq!(
        h.ledger.remove_tokens(&mallory, AssetId([7; 20]), mallory, 100).unwrap_err(),
        denied
    );
    assert_eq!(
        h.ledger.change_user_address(&mallory, acct(1), mallory).unwrap_err(),
        denied
    );

    assert!(h.ledger.stake_of(&acct(1)).is_some());
    assert_eq!(h.vault.foreign_balance(&AssetId([7; 20])), 100);
    assert_eq!(h.ledger.drain_events().len(), 1);
}

#[test]
fn in_effect_rate_cannot_be_removed() {
    let h = Harness::new();
    let start = GENESIS + 10;
    h.ledger.add_yield_change(&admin(), pct(50), start).unwrap();
    h.fund_and_deposit(acct(1), UNIT);
    h.clock.set(start + 1);
    let before = h.ledger.withdrawable_balance(&acct(1)).unwrap();

    assert_eq!(
        h.ledger.remove_yield_change(&admin(), start),
        Err(LedgerError::RateAlreadyActive { start_time: start, now: start + 1 })
    );
    assert_eq!(h.ledger.withdrawable_balance(&acct(1)).unwrap(), before);
    h.ledger.verify_invariants().unwrap();
}

#[test]
fn rate_starting_now_can_still_be_removed() {
    let h = Harness::new();
    h.ledger.add_yield_change(&admin(), pct(50), GENESIS).unwrap();
    assert!(h.ledger.remove_yield_change(&admin(), GENESIS).unwrap().is_some());
    assert!(h.ledger.schedule_entries().is_empty());
}

#[test]
fn backdated_or_reordered_rates_rejected() {
    let h = Harness::new();
    h.ledger.add_yield_change(&admin(), pct(20), GENESIS + 500).unwrap();
    assert!(matches!(
        h.ledger.add_yield_change(&admin(), pct(20), GENESIS - 1),
        Err(LedgerError::InvalidStartTime { .. })
    ));
    assert!(matches!(
        h.ledger.add_yield_change(&admin(), pct(20), GENESIS + 499),
        Err(LedgerError::StartTimeNotIncreasing { .. })
    ));
    assert_eq!(h.ledger.schedule_entries().len(), 1);
}

#[test]
fn principal_overflow_is_rejected_without_moving_funds() {
    let h = Harness::new();
    h.fund_and_deposit(acct(1), u128::MAX);
    h.vault.fund(acct(2), 1);

    assert_eq!(h.ledger.deposit(acct(2), 1), Err(LedgerError::ArithmeticOverflow));
    assert_eq!(h.vault.wallet_balance(&acct(2)), 1);
    assert!(h.ledger.stake_of(&acct(2)).is_none());
    h.ledger.verify_invariants().unwrap();
}

#[test]
fn interest_overflow_surfaces_as_error() {
    let h = Harness::new();
    h.fund_and_deposit(acct(1), u128::MAX);
    h.clock.advance(SECONDS_PER_YEAR);

    assert_eq!(
        h.ledger.withdrawable_balance(&acct(1)),
        Err(LedgerError::ArithmeticOverflow)
    );
    let before = h.ledger.totals();
    assert_eq!(h.ledger.claim(acct(1)), Err(LedgerError::ArithmeticOverflow));
    assert_eq!(h.ledger.totals(), before);
    assert!(h.ledger.stake_of(&acct(1)).is_some());
}

#[test]
fn runaway_rate_overflows_integral_cleanly() {
    let h = Harness::new();
    h.ledger.add_yield_change(&admin(), u128::MAX, GENESIS + 10).unwrap();
    h.clock.set(GENESIS + 10 + 100_000_000);
    h.vault.fund(acct(1), 10);

    assert_eq!(h.ledger.deposit(acct(1), 10), Err(LedgerError::ArithmeticOverflow));
    assert_eq!(h.vault.wallet_balance(&acct(1)), 10);
    assert_eq!(h.ledger.totals().total_principal(), 0);
}

#[test]
fn claims_cannot_drain_other_depositors_beyond_pool() {
    let h = Harness::new();
    h.fund_and_deposit(acct(1), 100 * UNIT);
    h.fund_and_deposit(acct(2), 100 * UNIT);
    h.clock.advance(SECONDS_PER_YEAR);

    // no reserves seeded: the first claim eats into the second's principal
    let first = h.ledger.claim(acct(1)).unwrap();
    assert!(first.payout > 100 * UNIT);
    let err = h.ledger.claim(acct(2)).unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientLedgerBalance { .. }));
    assert!(h.ledger.stake_of(&acct(2)).is_some());
    assert_eq!(h.ledger.net_owed().unwrap(), h.ledger.total_funds_needed().unwrap() - h.vault.pool_balance());
}

#[test]
fn rescue_cannot_exceed_foreign_holdings() {
    let h = Harness::new();
    let stray = AssetId([0x42; 20]);
    h.fund_and_deposit(acct(1), 10 * UNIT);
    h.vault.hold_foreign(stray, 5);

    assert!(matches!(
        h.ledger.remove_tokens(&admin(), stray, acct(9), 6),
        Err(LedgerError::Transfer(_))
    ));
    assert_eq!(h.vault.holding(&acct(9), &stray), 0);
    h.ledger.remove_tokens(&admin(), stray, acct(9), 5).unwrap();
    assert_eq!(h.vault.foreign_balance(&stray), 0);
    assert_eq!(h.vault.holding(&acct(9), &stray), 5);
    assert_eq!(h.vault.pool_balance(), 10 * UNIT);
    assert_eq!(h.ledger.total_funds_needed().unwrap(), 10 * UNIT);
}

#[test]
fn admin_rescue_of_pool_asset_shows_as_shortfall() {
    let h = Harness::new();
    h.fund_and_deposit(acct(1), 10 * UNIT);
    h.clock.advance(SECONDS_PER_YEAR);
    let owed_before = h.ledger.net_owed().unwrap();

    let pool_asset = h.vault.pool_asset();
    h.ledger.remove_tokens(&admin(), pool_asset, acct(9), 4 * UNIT).unwrap();

    assert_eq!(h.vault.wallet_balance(&acct(9)), 4 * UNIT);
    assert_eq!(h.vault.pool_balance(), 6 * UNIT);
    assert_eq!(h.ledger.net_owed().unwrap(), owed_before + 4 * UNIT);
    // books are untouched: the stake is still owed in full
    assert_eq!(h.ledger.totals().total_principal(), 10 * UNIT);
    assert!(matches!(
        h.ledger.claim(acct(1)),
        Err(LedgerError::InsufficientLedgerBalance { .. })
    ));
    assert!(matches!(
        h.ledger.remove_tokens(&admin(), pool_asset, acct(9), 7 * UNIT),
        Err(LedgerError::Transfer(_))
    ));
}

#[test]
fn migration_onto_existing_stake_keeps_books_balanced() {
    let h = Harness::new();
    h.fund_and_deposit(acct(1), 7 * UNIT);
    h.clock.advance(1_000);
    h.fund_and_deposit(acct(2), 3 * UNIT);
    h.clock.advance(1_000);

    assert!(h.ledger.change_user_address(&admin(), acct(1), acct(2)).unwrap());
    h.ledger.verify_invariants().unwrap();
    assert_eq!(h.ledger.live_stakes().len(), 1);
    assert_eq!(h.ledger.totals().total_principal(), 7 * UNIT);
    let total = h.ledger.total_funds_needed().unwrap();
    assert_eq!(total, h.sum_of_balances());
}
