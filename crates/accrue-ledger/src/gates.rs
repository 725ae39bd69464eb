//! Feature gates for deposit, claim, and compound.

use serde::{Deserialize, Serialize};
use std::fmt;

use accrue_core::error::LedgerError;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Gate {
    Deposit,
    Claim,
    Compound,
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deposit => f.write_str("deposit"),
            Self::Claim => f.write_str("claim"),
            Self::Compound => f.write_str("compound"),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeatureGates {
    pub deposits_open: bool,
    pub claims_open: bool,
    pub compound_open: bool,
}

impl Default for FeatureGates {
    fn default() -> Self {
        Self {
            deposits_open: true,
            claims_open: true,
            compound_open: true,
        }
    }
}

impl FeatureGates {
    pub fn is_open(&self, gate: Gate) -> bool {
        match gate {
            Gate::Deposit => self.deposits_open,
            Gate::Claim => self.claims_open,
            Gate::Compound => self.compound_open,
        }
    }

    /// Set a gate, returning whether the value changed.
    pub fn set(&mut self, gate: Gate, open: bool) -> bool {
        let slot = match gate {
            Gate::Deposit => &mut self.deposits_open,
            Gate::Claim => &mut self.claims_open,
            Gate::Compound => &mut self.compound_open,
        };
        let changed = *slot != open;
        *slot = open;
        changed
    }

    /// Fail with the gate's "closed" error unless it is open.
    pub fn require(&self, gate: Gate) -> Result<(), LedgerError> {
        if self.is_open(gate) {
            return Ok(());
        }
        Err(match gate {
            Gate::Deposit => LedgerError::DepositsClosed,
            Gate::Claim => LedgerError::ClaimsClosed,
            Gate::Compound => LedgerError::CompoundClosed,
        })
    }
}
