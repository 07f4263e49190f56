//! Core types for the ledger
//!
//! All types are designed for:
//! - Exact, unbounded arithmetic (BigUint balances, no wrapping)
//! - Cheap cloning of account keys
//! - Serde round-tripping for snapshots and journals (amounts as decimal strings)

use crate::{Error, Result};
use chrono::Utc;
use num_bigint::{BigInt, BigUint};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Token balance (non-negative, unbounded)
pub type Balance = BigUint;

/// Account identifier (address string, principal, etc.)
///
/// Opaque to the ledger: any value is a valid key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Create new account ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AccountId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for AccountId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Check that `amount` is non-negative and return it as a balance delta.
pub fn validate_amount(amount: &BigInt) -> Result<Balance> {
    amount
        .to_biguint()
        .ok_or_else(|| Error::InvalidAmount(amount.to_string()))
}

/// Convert a decimal amount (config files, money-typed callers) into a whole
/// token count.
///
/// Fractional values are rejected. The result is normalized, so `-0` becomes
/// `0` and `5.00` becomes `5`.
pub fn amount_from_decimal(amount: Decimal) -> Result<BigInt> {
    if !amount.fract().is_zero() {
        return Err(Error::InvalidAmount(amount.to_string()));
    }
    Ok(BigInt::from(amount.normalize().mantissa()))
}

/// Balances serialized as decimal strings
pub(crate) mod biguint_str {
    use num_bigint::BigUint;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigUint, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

mod balance_map_str {
    use super::AccountId;
    use num_bigint::BigUint;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S: Serializer>(
        balances: &BTreeMap<AccountId, BigUint>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_map(balances.iter().map(|(account, balance)| (account, balance.to_string())))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<AccountId, BigUint>, D::Error> {
        BTreeMap::<AccountId, String>::deserialize(deserializer)?
            .into_iter()
            .map(|(account, raw)| {
                raw.parse()
                    .map(|balance| (account, balance))
                    .map_err(serde::de::Error::custom)
            })
            .collect()
    }
}

/// State transition recorded in the journal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// Balance moved between two accounts
    Transfer {
        /// Debited account
        from: AccountId,
        /// Credited account
        to: AccountId,
        /// Amount moved
        #[serde(with = "biguint_str")]
        amount: Balance,
    },
    /// New tokens credited, supply increased
    Mint {
        /// Credited account
        recipient: AccountId,
        /// Amount created
        #[serde(with = "biguint_str")]
        amount: Balance,
    },
    /// Tokens destroyed, supply decreased
    Burn {
        /// Debited account
        holder: AccountId,
        /// Amount destroyed
        #[serde(with = "biguint_str")]
        amount: Balance,
    },
}

impl EventKind {
    /// Amount carried by the event
    pub fn amount(&self) -> &Balance {
        match self {
            EventKind::Transfer { amount, .. }
            | EventKind::Mint { amount, .. }
            | EventKind::Burn { amount, .. } => amount,
        }
    }

    /// Short label for logs and metrics
    pub fn label(&self) -> &'static str {
        match self {
            EventKind::Transfer { .. } => "transfer",
            EventKind::Mint { .. } => "mint",
            EventKind::Burn { .. } => "burn",
        }
    }
}

/// Applied ledger event.
///
/// Returned to the caller as the confirmation of a successful operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEvent {
    /// Unique event ID (UUIDv7 for time-ordering)
    pub event_id: Uuid,

    /// Position in the ledger history (genesis is 0, first operation is 1)
    pub sequence: u64,

    /// What happened
    pub kind: EventKind,

    /// Total supply after the event was applied
    #[serde(with = "biguint_str")]
    pub total_supply: Balance,

    /// Event timestamp (nanoseconds since Unix epoch)
    pub timestamp_nanos: i64,
}

impl LedgerEvent {
    pub(crate) fn new(sequence: u64, kind: EventKind, total_supply: Balance) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            sequence,
            kind,
            total_supply,
            timestamp_nanos: Utc::now().timestamp_nanos_opt().unwrap_or(0),
        }
    }
}

/// Point-in-time view of the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Balances of every account with an entry, sorted by account
    #[serde(with = "balance_map_str")]
    pub balances: BTreeMap<AccountId, Balance>,

    /// Total supply
    #[serde(with = "biguint_str")]
    pub total_supply: Balance,

    /// Sequence of the last applied event
    pub sequence: u64,
}
