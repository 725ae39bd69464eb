//! Notifications emitted by successful ledger operations.

use serde::{Deserialize, Serialize};

use accrue_core::types::{AccountId, Amount, AssetId, Timestamp};

use crate::gates::Gate;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    Deposited {
        account: AccountId,
        amount: Amount,
        timestamp: Timestamp,
    },
    Claimed {
        account: AccountId,
        principal: Amount,
        interest: Amount,
        timestamp: Timestamp,
    },
    Compounded {
        account: AccountId,
        new_principal: Amount,
        interest: Amount,
        timestamp: Timestamp,
    },
    RateAdded {
        rate_per_year: u128,
        start_time: Timestamp,
        timestamp: Timestamp,
    },
    RateRemoved {
        start_time: Timestamp,
        timestamp: Timestamp,
    },
    GateChanged {
        gate: Gate,
        open: bool,
        timestamp: Timestamp,
    },
    TokensRemoved {
        asset: AssetId,
        to: AccountId,
        amount: Amount,
        timestamp: Timestamp,
    },
    AddressChanged {
        from: AccountId,
        to: AccountId,
        timestamp: Timestamp,
    },
}

type Listener = Box<dyn Fn(&LedgerEvent) + Send + Sync>;

/// Synchronous fan-out of ledger events.
///
/// Listeners run inline while the ledger lock is held. They must be fast and
/// must not call back into the ledger.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<Listener>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: Listener) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &LedgerEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}
