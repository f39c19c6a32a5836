//! Value objects exchanged with the account handle

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of decimal places the ledger stores for an amount
pub const LEDGER_PRECISION: u32 = 7;

/// Public address of a ledger account
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Address(String);

impl Address {
    pub fn new(address: impl Into<String>) -> Self {
        Address(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Address(s.to_string())
    }
}

impl From<String> for Address {
    fn from(s: String) -> Self {
        Address(s)
    }
}

/// Opaque identifier of a submitted transaction
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TransactionId(String);

impl TransactionId {
    pub fn new(id: impl Into<String>) -> Self {
        TransactionId(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Account balance as read from the ledger at call time
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Balance(Decimal);

impl Balance {
    pub fn new(value: Decimal) -> Self {
        Balance(value)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Balance truncated (never rounded up) to `precision` decimal places,
    /// padded with zeros to exactly that many places.
    pub fn value_string(&self, precision: u32) -> String {
        let mut v = self.0.round_dp_with_strategy(precision, RoundingStrategy::ToZero);
        v.rescale(precision);
        v.to_string()
    }
}

impl From<Decimal> for Balance {
    fn from(value: Decimal) -> Self {
        Balance(value)
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

/// A payment delivered to a watcher
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PaymentInfo {
    pub source: Address,
    pub destination: Address,
    pub amount: Decimal,
    pub memo: Option<String>,
    pub transaction_id: TransactionId,
    pub created_at: DateTime<Utc>,
}
