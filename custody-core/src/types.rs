//! Core types for the custody engines
//!
//! All types are designed for:
//! - Deterministic serialization (serde)
//! - Memory safety (no unsafe code)
//! - Exact arithmetic (integer smallest units for money)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Account identifier (wallet address, internal account number, etc.)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
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

    /// Check the identifier is non-empty
    pub fn is_valid(&self) -> bool {
        !self.0.is_empty()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fungible asset identifier (token contract address, ticker, etc.)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetId(String);

/// Reserved identifier for the chain-native asset
const NATIVE_ASSET: &str = "native";

impl AssetId {
    /// Create new asset ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The chain-native asset (ETH in the original deployment)
    pub fn native() -> Self {
        Self(NATIVE_ASSET.to_string())
    }

    /// Check whether this is the chain-native asset
    pub fn is_native(&self) -> bool {
        self.0 == NATIVE_ASSET
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Non-negative amount in the asset's smallest unit
///
/// All arithmetic is checked; overflow and underflow surface as `None`
/// rather than wrapping. No floating point representation exists.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Amount(u128);

impl Amount {
    /// Zero amount
    pub const ZERO: Amount = Amount(0);

    /// Create from smallest units
    pub fn new(units: u128) -> Self {
        Self(units)
    }

    /// Raw smallest units
    pub fn units(&self) -> u128 {
        self.0
    }

    /// True if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition
    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    /// Checked subtraction
    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Amount)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u128> for Amount {
    fn from(units: u128) -> Self {
        Amount(units)
    }
}

impl From<u64> for Amount {
    fn from(units: u64) -> Self {
        Amount(units as u128)
    }
}
