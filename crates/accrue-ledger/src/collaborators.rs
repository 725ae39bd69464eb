//! In-memory collaborator implementations.
//!
//! [`MemoryVault`], [`StaticAuthority`] and [`ManualClock`] are suitable for
//! tests and the CLI simulator; [`SystemClock`] reads wall-clock time.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use accrue_core::error::TransferError;
use accrue_core::traits::{AssetVault, Authority, Clock};
use accrue_core::types::{AccountId, Amount, AssetId, Timestamp};

#[derive(Debug, Default)]
struct VaultBalances {
    /// Depositor wallets, outside the pool.
    wallets: HashMap<AccountId, Amount>,
    /// Pooled asset available for payouts.
    pool: Amount,
    /// Other assets held by the pool, keyed by asset.
    foreign: HashMap<AssetId, Amount>,
    /// Other assets rescued out to accounts.
    holdings: HashMap<(AccountId, AssetId), Amount>,
}

/// Wallet balances plus a single pool, all in memory.
///
/// The pooled asset is identified by `pool_asset` ([`AssetId::ZERO`] unless
/// set), so a rescue naming it draws on the pool itself.
#[derive(Debug, Default)]
pub struct MemoryVault {
    pool_asset: AssetId,
    inner: Mutex<VaultBalances>,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pool_asset(pool_asset: AssetId) -> Self {
        Self {
            pool_asset,
            inner: Mutex::default(),
        }
    }

    pub fn pool_asset(&self) -> AssetId {
        self.pool_asset
    }

    /// Credit a depositor wallet outside the pool.
    pub fn fund(&self, account: AccountId, amount: Amount) {
        let mut inner = self.inner.lock();
        let entry = inner.wallets.entry(account).or_default();
        *entry = entry.saturating_add(amount);
    }

    /// Add liquidity to the pool without a depositor (e.g. yield reserves).
    pub fn seed_pool(&self, amount: Amount) {
        let mut inner = self.inner.lock();
        inner.pool = inner.pool.saturating_add(amount);
    }

    /// Place a non-pool asset in the vault's custody.
    pub fn hold_foreign(&self, asset: AssetId, amount: Amount) {
        let mut inner = self.inner.lock();
        let entry = inner.foreign.entry(asset).or_default();
        *entry = entry.saturating_add(amount);
    }

    pub fn wallet_balance(&self, account: &AccountId) -> Amount {
        self.inner.lock().wallets.get(account).copied().unwrap_or(0)
    }

    pub fn pool_balance(&self) -> Amount {
        self.inner.lock().pool
    }

    pub fn foreign_balance(&self, asset: &AssetId) -> Amount {
        self.inner.lock().foreign.get(asset).copied().unwrap_or(0)
    }

    /// What `account` holds of `asset` outside the pool. For the pooled
    /// asset this is the wallet balance.
    pub fn holding(&self, account: &AccountId, asset: &AssetId) -> Amount {
        if *asset == self.pool_asset {
            return self.wallet_balance(account);
        }
        self.inner
            .lock()
            .holdings
            .get(&(*account, *asset))
            .copied()
            .unwrap_or(0)
    }
}

impl AssetVault for MemoryVault {
    fn debit(&self, from: &AccountId, amount: Amount) -> Result<(), TransferError> {
        let mut inner = self.inner.lock();
        let have = inner.wallets.get(from).copied().unwrap_or(0);
        if have < amount {
            return Err(TransferError::InsufficientFunds { account: *from, have, need: amount });
        }
        let pool = inner
            .pool
            .checked_add(amount)
            .ok_or_else(|| TransferError::Rejected("pool balance overflow".into()))?;
        inner.wallets.insert(*from, have - amount);
        inner.pool = pool;
        Ok(())
    }

    fn credit(&self, to: &AccountId, amount: Amount) -> Result<(), TransferError> {
        let mut inner = self.inner.lock();
        if inner.pool < amount {
            return Err(TransferError::Rejected(format!(
                "pool holds {}, cannot pay {amount}",
                inner.pool
            )));
        }
        inner.pool -= amount;
        let wallet = inner.wallets.entry(*to).or_default();
        *wallet = wallet.saturating_add(amount);
        Ok(())
    }

    fn available_balance(&self) -> Result<Amount, TransferError> {
        Ok(self.inner.lock().pool)
    }

    fn rescue(&self, asset: &AssetId, to: &AccountId, amount: Amount) -> Result<(), TransferError> {
        let mut inner = self.inner.lock();
        let pooled = *asset == self.pool_asset;
        let held = if pooled {
            inner.pool
        } else {
            inner.foreign.get(asset).copied().unwrap_or(0)
        };
        if held < amount {
            return Err(TransferError::Rejected(format!(
                "vault holds {held} of {asset}, cannot rescue {amount}"
            )));
        }
        if pooled {
            inner.pool = held - amount;
            let wallet = inner.wallets.entry(*to).or_default();
            *wallet = wallet.saturating_add(amount);
        } else {
            inner.foreign.insert(*asset, held - amount);
            let holding = inner.holdings.entry((*to, *asset)).or_default();
            *holding = holding.saturating_add(amount);
        }
        tracing::debug!(%asset, %to, amount, pooled, "rescued asset");
        Ok(())
    }
}

/// Fixed set of privileged callers.
#[derive(Debug, Clone, Default)]
pub struct StaticAuthority {
    admins: HashSet<AccountId>,
}

impl StaticAuthority {
    pub fn new(admins: impl IntoIterator<Item = AccountId>) -> Self {
        Self {
            admins: admins.into_iter().collect(),
        }
    }
}

impl Authority for StaticAuthority {
    fn is_privileged(&self, caller: &AccountId) -> bool {
        self.admins.contains(caller)
    }
}

/// Clock advanced explicitly by the caller.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: AtomicU64::new(start),
        }
    }

    pub fn set(&self, t: Timestamp) {
        self.now.store(t, Ordering::SeqCst);
    }

    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}

/// Wall-clock time in Unix seconds. Times before the epoch read as 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
    }
}
