//! Shared test helpers for scenario and property tests.

use std::sync::Arc;

use accrue_core::constants::SCALE;
use accrue_core::traits::Clock;
use accrue_core::types::{AccountId, Amount, Timestamp};
use accrue_ledger::{LedgerConfig, ManualClock, MemoryVault, StaticAuthority, YieldLedger};

/// Clock reading at which every harness starts.
pub const GENESIS: Timestamp = 1_700_000_000;

/// Account id from a seed byte.
pub fn acct(seed: u8) -> AccountId {
    AccountId([seed; 20])
}

/// The single privileged account in every harness.
pub fn admin() -> AccountId {
    acct(0xAD)
}

/// Annual rate of `p` percent, scaled by 10^18.
pub fn pct(p: u128) -> u128 {
    p * SCALE / 100
}

/// A ledger wired to in-memory collaborators the test can reach into.
pub struct Harness {
    pub ledger: YieldLedger,
    pub vault: Arc<MemoryVault>,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(&LedgerConfig::default())
    }

    pub fn with_config(config: &LedgerConfig) -> Self {
        let vault = Arc::new(MemoryVault::new());
        let clock = Arc::new(ManualClock::new(GENESIS));
        let ledger = YieldLedger::new(
            config,
            vault.clone(),
            Arc::new(StaticAuthority::new([admin()])),
            clock.clone(),
        )
        .unwrap();
        Self { ledger, vault, clock }
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Fund `account`'s wallet and deposit all of it.
    pub fn fund_and_deposit(&self, account: AccountId, amount: Amount) {
        self.vault.fund(account, amount);
        self.ledger.deposit(account, amount).unwrap();
    }

    /// Sum of every live stake's withdrawable balance.
    pub fn sum_of_balances(&self) -> Amount {
        self.ledger
            .live_stakes()
            .iter()
            .map(|(account, _)| self.ledger.withdrawable_balance(account).unwrap())
            .sum()
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}
