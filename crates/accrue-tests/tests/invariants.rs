//! Property-based checks of the solvency aggregates.
//!
//! Random sequences of deposits, compounds, claims, migrations, rate
//! changes and clock moves are applied to a fresh ledger. After every step
//! the running totals must equal the brute-force sums over live stakes, and
//! the O(1) liability figure must sit within one unit per stake above the
//! sum of individual balances. Failed steps must leave the totals untouched.

use proptest::prelude::*;

use accrue_core::constants::UNIT;
use accrue_tests::helpers::*;

#[derive(Debug, Clone)]
enum Op {
    Deposit { who: u8, amount: u128 },
    Compound { who: u8, extra: u128 },
    Claim { who: u8 },
    Migrate { from: u8, to: u8 },
    ScheduleRate { percent: u128, delay: u64 },
    Advance { secs: u64 },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (1u8..6, 1u128..1_000_000 * UNIT).prop_map(|(who, amount)| Op::Deposit { who, amount }),
        2 => (1u8..6, prop_oneof![Just(0u128), 1u128..1_000 * UNIT])
            .prop_map(|(who, extra)| Op::Compound { who, extra }),
        2 => (1u8..6).prop_map(|who| Op::Claim { who }),
        1 => (1u8..6, 1u8..6).prop_map(|(from, to)| Op::Migrate { from, to }),
        1 => (0u128..100, 0u64..90 * 86_400).prop_map(|(percent, delay)| Op::ScheduleRate { percent, delay }),
        3 => (0u64..120 * 86_400).prop_map(|secs| Op::Advance { secs }),
    ]
}

fn apply(h: &Harness, op: &Op) -> bool {
    match *op {
        Op::Deposit { who, amount } => {
            h.vault.fund(acct(who), amount);
            h.ledger.deposit(acct(who), amount).is_ok()
        }
        Op::Compound { who, extra } => {
            h.vault.fund(acct(who), extra);
            h.ledger.compound_and_deposit(acct(who), extra).is_ok()
        }
        Op::Claim { who } => h.ledger.claim(acct(who)).is_ok(),
        Op::Migrate { from, to } => h
            .ledger
            .change_user_address(&admin(), acct(from), acct(to))
            .is_ok(),
        Op::ScheduleRate { percent, delay } => {
            let start = h.now() + delay;
            h.ledger.add_yield_change(&admin(), pct(percent), start).is_ok()
        }
        Op::Advance { secs } => {
            h.clock.advance(secs);
            true
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// A and B always equal the sums over live stakes, and the aggregate
    /// liability bounds the per-stake sum from above by less than one unit
    /// per stake.
    #[test]
    fn aggregates_match_live_stakes(ops in prop::collection::vec(op(), 1..40)) {
        let h = Harness::new();
        h.vault.seed_pool(u128::MAX / 4);

        for op in &ops {
            let before = h.ledger.totals();
            let ok = apply(&h, op);
            if !ok {
                prop_assert_eq!(h.ledger.totals(), before, "failed {:?} changed totals", op);
            }
            prop_assert!(h.ledger.verify_invariants().is_ok(), "after {:?}", op);

            let total = h.ledger.total_funds_needed().unwrap();
            let sum = h.sum_of_balances();
            let n = h.ledger.live_stakes().len() as u128;
            prop_assert!(total >= sum, "total {} < sum {}", total, sum);
            prop_assert!(total - sum <= n, "total {} exceeds sum {} by more than {}", total, sum, n);
        }
    }

    /// `C(t)` never decreases as the clock moves forward.
    #[test]
    fn cumulative_yield_is_monotone(
        rates in prop::collection::vec((0u128..500, 1u64..30 * 86_400), 0..20),
        probes in prop::collection::vec(0u64..5 * 365 * 86_400, 2..20),
    ) {
        let h = Harness::new();
        let mut start = GENESIS;
        for (percent, gap) in rates {
            start += gap;
            h.ledger.add_yield_change(&admin(), pct(percent), start).unwrap();
        }
        let mut probes: Vec<u64> = probes.into_iter().map(|p| GENESIS + p).collect();
        probes.sort_unstable();
        let values: Vec<u128> = probes
            .iter()
            .map(|t| h.ledger.cumulative_yield(*t).unwrap())
            .collect();
        prop_assert!(values.windows(2).all(|w| w[0] <= w[1]));
    }

    /// With no withdrawals, the pool's shortfall only grows while time passes.
    #[test]
    fn net_owed_grows_with_time(
        deposits in prop::collection::vec(1u128..1_000 * UNIT, 1..5),
        steps in prop::collection::vec(1u64..60 * 86_400, 1..10),
    ) {
        let h = Harness::new();
        for (i, amount) in deposits.iter().enumerate() {
            h.fund_and_deposit(acct(i as u8 + 1), *amount);
        }
        let mut last = h.ledger.net_owed().unwrap();
        prop_assert_eq!(last, 0);
        for secs in steps {
            h.clock.advance(secs);
            let owed = h.ledger.net_owed().unwrap();
            prop_assert!(owed >= last);
            last = owed;
        }
    }
}
