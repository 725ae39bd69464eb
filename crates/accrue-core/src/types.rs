//! Core ledger types: identifiers, amounts, timestamps, rate entries.
//!
//! Amounts are `u128` base units. Rates are `u128` per-second values
//! scaled by [`SCALE`](crate::constants::SCALE).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Seconds since the Unix epoch.
pub type Timestamp = u64;

/// Token amount in base units.
pub type Amount = u128;

/// Error returned when parsing a hex identifier fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid identifier {input:?}: {reason}")]
pub struct ParseIdError {
    pub input: String,
    pub reason: String,
}

macro_rules! hex_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name(pub [u8; 20]);

        impl $name {
            /// The all-zero identifier.
            pub const ZERO: Self = Self([0u8; 20]);

            /// Return the underlying bytes.
            pub fn as_bytes(&self) -> &[u8; 20] {
                &self.0
            }

            pub fn is_zero(&self) -> bool {
                self.0 == [0u8; 20]
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{}", hex::encode(self.0))
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let digits = s.strip_prefix("0x").unwrap_or(s);
                let bytes = hex::decode(digits).map_err(|e| ParseIdError {
                    input: s.to_string(),
                    reason: e.to_string(),
                })?;
                let array: [u8; 20] = bytes.try_into().map_err(|b: Vec<u8>| ParseIdError {
                    input: s.to_string(),
                    reason: format!("expected 20 bytes, got {}", b.len()),
                })?;
                Ok(Self(array))
            }
        }

        impl From<[u8; 20]> for $name {
            fn from(bytes: [u8; 20]) -> Self {
                Self(bytes)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

hex_id!(
    /// A 20-byte depositor or caller identifier, displayed as `0x`-prefixed hex.
    AccountId
);

hex_id!(
    /// A 20-byte fungible asset identifier, used by privileged asset rescue.
    AssetId
);

/// A per-second rate effective from `start_time` onward.
///
/// The base rate is reported with `start_time == 0`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateEntry {
    pub start_time: Timestamp,
    /// Per-second rate scaled by 10^18.
    pub rate_per_second: u128,
}
