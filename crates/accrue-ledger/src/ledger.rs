//! Stake lifecycle: deposit, compound, claim, and administration.
//!
//! [`YieldLedger`] owns the schedule, the aggregate totals, the stake map,
//! the feature gates and the event journal behind a single mutex. Every
//! operation holds the lock from start to finish, including its call into
//! the [`AssetVault`], so operations never interleave.
//!
//! Mutating operations work on a staged copy of the records they touch.
//! The staged records are committed only after the vault transfer
//! succeeds; a failed transfer leaves the ledger exactly as it was.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info, warn};

use accrue_core::U256;
use accrue_core::error::LedgerError;
use accrue_core::math::mul_wide;
use accrue_core::traits::{AssetVault, Authority, Clock};
use accrue_core::types::{AccountId, Amount, AssetId, RateEntry, Timestamp};

use crate::config::LedgerConfig;
use crate::events::{EventBus, LedgerEvent};
use crate::gates::{FeatureGates, Gate};
use crate::integrator::cumulative;
use crate::schedule::RateSchedule;
use crate::solvency::SolvencyLedger;
use crate::stake::AccountStake;

/// Outcome of a successful [`YieldLedger::claim`].
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClaimReceipt {
    pub principal: Amount,
    pub interest: Amount,
    pub payout: Amount,
}

/// Outcome of a successful [`YieldLedger::compound_and_deposit`].
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompoundReceipt {
    pub previous_principal: Amount,
    pub interest: Amount,
    pub extra: Amount,
    pub new_principal: Amount,
}

struct LedgerState {
    schedule: RateSchedule,
    solvency: SolvencyLedger,
    stakes: HashMap<AccountId, AccountStake>,
    gates: FeatureGates,
    journal: Vec<LedgerEvent>,
    bus: EventBus,
}

impl LedgerState {
    fn c_at(&self, t: Timestamp) -> Result<u128, LedgerError> {
        cumulative(&self.schedule, t)
    }

    fn record(&mut self, event: LedgerEvent) {
        self.bus.emit(&event);
        self.journal.push(event);
    }
}

pub struct YieldLedger {
    vault: Arc<dyn AssetVault>,
    authority: Arc<dyn Authority>,
    clock: Arc<dyn Clock>,
    state: Mutex<LedgerState>,
}

impl YieldLedger {
    /// Build a ledger from `config`, registering its scheduled rate changes
    /// against the clock's current time.
    ///
    /// # Errors
    ///
    /// Any schedule entry rejected by [`RateSchedule::add_rate`].
    pub fn new(
        config: &LedgerConfig,
        vault: Arc<dyn AssetVault>,
        authority: Arc<dyn Authority>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, LedgerError> {
        let now = clock.now();
        let mut schedule = RateSchedule::new(config.base_rate_per_year);
        for entry in &config.schedule {
            schedule.add_rate(entry.rate_per_year, entry.start_time, now)?;
        }
        info!(
            base_rate_per_second = schedule.base_rate(),
            scheduled = schedule.len(),
            "yield ledger initialized"
        );
        Ok(Self {
            vault,
            authority,
            clock,
            state: Mutex::new(LedgerState {
                schedule,
                solvency: SolvencyLedger::new(),
                stakes: HashMap::new(),
                gates: config.gates(),
                journal: Vec::new(),
                bus: EventBus::new(),
            }),
        })
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Open a stake of `amount` for `account`, pulling the funds from the vault.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::DepositsClosed`] if the deposit gate is closed
    /// - [`LedgerError::AlreadyHasStake`] if `account` already has a live stake
    /// - [`LedgerError::Transfer`] if the vault debit fails
    pub fn deposit(&self, account: AccountId, amount: Amount) -> Result<AccountStake, LedgerError> {
        let mut state = self.state.lock();
        let now = self.clock.now();

        state.gates.require(Gate::Deposit)?;
        if state.stakes.contains_key(&account) {
            return Err(LedgerError::AlreadyHasStake(account));
        }

        let c_now = state.c_at(now)?;
        let stake = AccountStake::new(amount, now, c_now);
        let mut solvency = state.solvency;
        solvency.open_position(amount, c_now)?;

        self.vault.debit(&account, amount)?;

        state.solvency = solvency;
        state.stakes.insert(account, stake);
        state.record(LedgerEvent::Deposited {
            account,
            amount,
            timestamp: now,
        });
        info!(%account, amount, "deposit");
        Ok(stake)
    }

    /// Fold accrued interest (and optionally `extra` new funds) into a fresh
    /// stake anchored at the current time.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::CompoundClosed`] if the compound gate is closed
    /// - [`LedgerError::NothingToDeposit`] if there is no stake and `extra` is zero
    /// - [`LedgerError::DepositsClosed`] if `extra > 0` and the deposit gate is closed
    /// - [`LedgerError::Transfer`] if the vault debit of `extra` fails
    pub fn compound_and_deposit(
        &self,
        account: AccountId,
        extra: Amount,
    ) -> Result<CompoundReceipt, LedgerError> {
        let mut state = self.state.lock();
        let now = self.clock.now();

        state.gates.require(Gate::Compound)?;
        let existing = state.stakes.get(&account).copied();
        let principal = existing.map_or(0, |s| s.principal);
        if principal == 0 && extra == 0 {
            return Err(LedgerError::NothingToDeposit);
        }
        if extra > 0 {
            state.gates.require(Gate::Deposit)?;
        }

        let c_now = state.c_at(now)?;
        let mut solvency = state.solvency;
        let interest = match existing {
            Some(stake) => {
                let interest = stake.interest(c_now)?;
                solvency.close_position(stake.principal, stake.anchor)?;
                interest
            }
            None => 0,
        };
        let new_principal = principal
            .checked_add(interest)
            .and_then(|p| p.checked_add(extra))
            .ok_or(LedgerError::ArithmeticOverflow)?;
        solvency.open_position(new_principal, c_now)?;

        if extra > 0 {
            self.vault.debit(&account, extra)?;
        }

        state.solvency = solvency;
        state
            .stakes
            .insert(account, AccountStake::new(new_principal, now, c_now));
        state.record(LedgerEvent::Compounded {
            account,
            new_principal,
            interest,
            timestamp: now,
        });
        info!(%account, principal, interest, extra, new_principal, "compound");
        Ok(CompoundReceipt {
            previous_principal: principal,
            interest,
            extra,
            new_principal,
        })
    }

    /// Close `account`'s stake and pay out principal plus interest.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::ClaimsClosed`] if the claim gate is closed
    /// - [`LedgerError::NothingToClaim`] if `account` has no live stake
    /// - [`LedgerError::InsufficientLedgerBalance`] if the vault cannot cover the payout
    /// - [`LedgerError::Transfer`] if the vault credit fails
    pub fn claim(&self, account: AccountId) -> Result<ClaimReceipt, LedgerError> {
        let mut state = self.state.lock();
        let now = self.clock.now();

        state.gates.require(Gate::Claim)?;
        let stake = state
            .stakes
            .get(&account)
            .copied()
            .ok_or(LedgerError::NothingToClaim)?;

        let c_now = state.c_at(now)?;
        let interest = stake.interest(c_now)?;
        let payout = stake
            .principal
            .checked_add(interest)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        let mut solvency = state.solvency;
        solvency.close_position(stake.principal, stake.anchor)?;

        let available = self.vault.available_balance()?;
        if available < payout {
            warn!(%account, payout, available, "claim exceeds pool balance");
            return Err(LedgerError::InsufficientLedgerBalance {
                requested: payout,
                available,
            });
        }
        self.vault.credit(&account, payout)?;

        state.solvency = solvency;
        state.stakes.remove(&account);
        state.record(LedgerEvent::Claimed {
            account,
            principal: stake.principal,
            interest,
            timestamp: now,
        });
        info!(%account, principal = stake.principal, interest, "claim");
        Ok(ClaimReceipt {
            principal: stake.principal,
            interest,
            payout,
        })
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// The rate in force now, with its start time (0 for the base rate).
    pub fn current_yield_rate(&self) -> RateEntry {
        let state = self.state.lock();
        state.schedule.active_rate(self.clock.now())
    }

    /// Principal plus interest `account` could claim now; 0 without a stake.
    pub fn withdrawable_balance(&self, account: &AccountId) -> Result<Amount, LedgerError> {
        let state = self.state.lock();
        match state.stakes.get(account) {
            Some(stake) => stake.value(state.c_at(self.clock.now())?),
            None => Ok(0),
        }
    }

    /// Total owed to all depositors now, computed from the aggregates alone.
    pub fn total_funds_needed(&self) -> Result<Amount, LedgerError> {
        let state = self.state.lock();
        state.solvency.total_liabilities(state.c_at(self.clock.now())?)
    }

    /// How far the vault's available balance falls short of total liabilities.
    pub fn net_owed(&self) -> Result<Amount, LedgerError> {
        let state = self.state.lock();
        let c_now = state.c_at(self.clock.now())?;
        let assets = self.vault.available_balance()?;
        state.solvency.net_owed(c_now, assets)
    }

    /// `C(t)` under the current schedule.
    pub fn cumulative_yield(&self, t: Timestamp) -> Result<u128, LedgerError> {
        self.state.lock().c_at(t)
    }

    pub fn stake_of(&self, account: &AccountId) -> Option<AccountStake> {
        self.state.lock().stakes.get(account).copied()
    }

    /// All live stakes, ordered by account.
    pub fn live_stakes(&self) -> Vec<(AccountId, AccountStake)> {
        let state = self.state.lock();
        let mut stakes: Vec<_> = state.stakes.iter().map(|(a, s)| (*a, *s)).collect();
        stakes.sort_by_key(|(a, _)| *a);
        stakes
    }

    pub fn totals(&self) -> SolvencyLedger {
        self.state.lock().solvency
    }

    pub fn schedule_entries(&self) -> Vec<RateEntry> {
        self.state.lock().schedule.entries().collect()
    }

    pub fn gates(&self) -> FeatureGates {
        self.state.lock().gates
    }

    /// Recompute `A` and `B` from the stake map and compare them with the
    /// running totals. Also checks every cached anchor against `C(t0)`.
    ///
    /// O(number of stakes); intended for audits and tests.
    pub fn verify_invariants(&self) -> Result<(), LedgerError> {
        let state = self.state.lock();
        let mut principal_sum: Amount = 0;
        let mut anchor_sum = U256::ZERO;
        for (account, stake) in &state.stakes {
            let expected = state.c_at(stake.t0)?;
            if stake.anchor != expected {
                return Err(LedgerError::InvariantViolation(format!(
                    "stake {account} anchor {} != C({}) = {expected}",
                    stake.anchor, stake.t0
                )));
            }
            principal_sum = principal_sum
                .checked_add(stake.principal)
                .ok_or(LedgerError::ArithmeticOverflow)?;
            anchor_sum = anchor_sum
                .checked_add(mul_wide(stake.principal, stake.anchor))
                .ok_or(LedgerError::ArithmeticOverflow)?;
        }
        if principal_sum != state.solvency.total_principal() {
            return Err(LedgerError::InvariantViolation(format!(
                "total principal {} != sum of stakes {principal_sum}",
                state.solvency.total_principal()
            )));
        }
        if anchor_sum != state.solvency.weighted_anchor() {
            return Err(LedgerError::InvariantViolation(format!(
                "weighted anchor {} != sum of stakes {anchor_sum}",
                state.solvency.weighted_anchor()
            )));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    /// Take every event recorded since the last drain.
    pub fn drain_events(&self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.state.lock().journal)
    }

    /// Register a listener invoked synchronously for every future event.
    pub fn subscribe(&self, listener: Box<dyn Fn(&LedgerEvent) + Send + Sync>) {
        self.state.lock().bus.subscribe(listener);
    }

    // ------------------------------------------------------------------
    // Privileged
    // ------------------------------------------------------------------

    fn require_privileged(&self, caller: &AccountId) -> Result<(), LedgerError> {
        if self.authority.is_privileged(caller) {
            return Ok(());
        }
        warn!(%caller, "privileged operation rejected");
        Err(LedgerError::Unauthorized(*caller))
    }

    /// Schedule a rate change. See [`RateSchedule::add_rate`] for validation.
    pub fn add_yield_change(
        &self,
        caller: &AccountId,
        rate_per_year: u128,
        start_time: Timestamp,
    ) -> Result<RateEntry, LedgerError> {
        self.require_privileged(caller)?;
        let mut state = self.state.lock();
        let now = self.clock.now();
        let entry = state.schedule.add_rate(rate_per_year, start_time, now)?;
        state.record(LedgerEvent::RateAdded {
            rate_per_year,
            start_time,
            timestamp: now,
        });
        info!(rate_per_year, start_time, rate_per_second = entry.rate_per_second, "rate change scheduled");
        Ok(entry)
    }

    /// Remove the scheduled change at exactly `start_time`.
    ///
    /// An unscheduled `start_time` is a silent no-op returning `None`. An
    /// entry that has already taken effect (`start_time < now`) is rejected
    /// with [`LedgerError::RateAlreadyActive`].
    pub fn remove_yield_change(
        &self,
        caller: &AccountId,
        start_time: Timestamp,
    ) -> Result<Option<RateEntry>, LedgerError> {
        self.require_privileged(caller)?;
        let mut state = self.state.lock();
        let now = self.clock.now();
        if !state.schedule.contains(start_time) {
            debug!(start_time, "no rate change scheduled at start time");
            return Ok(None);
        }
        if start_time < now {
            return Err(LedgerError::RateAlreadyActive { start_time, now });
        }
        let removed = state.schedule.remove_rate(start_time);
        state.record(LedgerEvent::RateRemoved {
            start_time,
            timestamp: now,
        });
        info!(start_time, "rate change removed");
        Ok(removed)
    }

    /// Open or close a feature gate.
    pub fn set_gate(&self, caller: &AccountId, gate: Gate, open: bool) -> Result<(), LedgerError> {
        self.require_privileged(caller)?;
        let mut state = self.state.lock();
        if state.gates.set(gate, open) {
            let timestamp = self.clock.now();
            state.record(LedgerEvent::GateChanged {
                gate,
                open,
                timestamp,
            });
            info!(%gate, open, "gate changed");
        }
        Ok(())
    }

    pub fn pause_deposit(&self, caller: &AccountId) -> Result<(), LedgerError> {
        self.set_gate(caller, Gate::Deposit, false)
    }

    pub fn unpause_deposit(&self, caller: &AccountId) -> Result<(), LedgerError> {
        self.set_gate(caller, Gate::Deposit, true)
    }

    pub fn pause_claim(&self, caller: &AccountId) -> Result<(), LedgerError> {
        self.set_gate(caller, Gate::Claim, false)
    }

    pub fn unpause_claim(&self, caller: &AccountId) -> Result<(), LedgerError> {
        self.set_gate(caller, Gate::Claim, true)
    }

    pub fn pause_compound(&self, caller: &AccountId) -> Result<(), LedgerError> {
        self.set_gate(caller, Gate::Compound, false)
    }

    pub fn unpause_compound(&self, caller: &AccountId) -> Result<(), LedgerError> {
        self.set_gate(caller, Gate::Compound, true)
    }

    /// Move `amount` of `asset` out of the vault to `to`. No ledger
    /// accounting is touched.
    pub fn remove_tokens(
        &self,
        caller: &AccountId,
        asset: AssetId,
        to: AccountId,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        self.require_privileged(caller)?;
        let mut state = self.state.lock();
        self.vault.rescue(&asset, &to, amount)?;
        let timestamp = self.clock.now();
        state.record(LedgerEvent::TokensRemoved {
            asset,
            to,
            amount,
            timestamp,
        });
        warn!(%asset, %to, amount, "tokens removed from vault");
        Ok(())
    }

    /// Move the stake at `from` to `to` unchanged.
    ///
    /// A stake already at `to` is overwritten and its position closed, so
    /// the aggregates keep matching the stake map. Returns `false` when
    /// `from` has no stake or equals `to`.
    pub fn change_user_address(
        &self,
        caller: &AccountId,
        from: AccountId,
        to: AccountId,
    ) -> Result<bool, LedgerError> {
        self.require_privileged(caller)?;
        let mut state = self.state.lock();
        if from == to {
            return Ok(false);
        }
        let Some(stake) = state.stakes.get(&from).copied() else {
            debug!(%from, "no stake to migrate");
            return Ok(false);
        };

        let mut solvency = state.solvency;
        if let Some(overwritten) = state.stakes.get(&to).copied() {
            solvency.close_position(overwritten.principal, overwritten.anchor)?;
            warn!(%to, principal = overwritten.principal, "overwriting existing stake");
        }

        state.solvency = solvency;
        state.stakes.remove(&from);
        state.stakes.insert(to, stake);
        let timestamp = self.clock.now();
        state.record(LedgerEvent::AddressChanged {
            from,
            to,
            timestamp,
        });
        info!(%from, %to, "stake migrated");
        Ok(true)
    }
}

impl std::fmt::Debug for YieldLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("YieldLedger")
            .field("stakes", &state.stakes.len())
            .field("total_principal", &state.solvency.total_principal())
            .field("gates", &state.gates)
            .field("scheduled", &state.schedule.len())
            .finish()
    }
}
