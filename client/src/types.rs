//! # Primitive Types
//!
//! The handful of value types everything else is written in terms of:
//! 20-byte [`Address`]es, 32-byte hashes, [`TxHash`] handles and [`Wei`]
//! amounts. Addresses and hashes travel as `0x`-prefixed lowercase hex
//! whenever they leave the process (JSON, logs, terminal output).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::config::WEI_PER_ETHER;

/// A 32-byte keccak digest.
pub type Hash32 = [u8; 32];

/// Encodes bytes as `0x`-prefixed lowercase hex.
pub fn hex_encode(bytes: impl AsRef<[u8]>) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Parses a 32-byte hash from hex, with or without the `0x` prefix.
pub fn parse_hash32(s: &str) -> Result<Hash32, AddressError> {
    let cleaned = s.trim();
    let cleaned = cleaned.strip_prefix("0x").unwrap_or(cleaned);
    if cleaned.len() != 64 {
        return Err(AddressError::InvalidLength {
            expected: 64,
            got: cleaned.len(),
        });
    }
    let mut out = [0u8; 32];
    hex::decode_to_slice(cleaned, &mut out).map_err(|e| AddressError::InvalidHex(e.to_string()))?;
    Ok(out)
}

/// Serde adapter for `Hash32` fields, as `0x` hex strings.
pub mod hash32_hex {
    use super::{hex_encode, parse_hash32, Hash32};
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serializes as `0x`-prefixed hex.
    pub fn serialize<S: Serializer>(hash: &Hash32, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex_encode(hash))
    }

    /// Deserializes from hex, prefix optional.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Hash32, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_hash32(&s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// Errors from parsing hex identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// Wrong number of hex characters after stripping the prefix.
    #[error("invalid length: expected {expected} hex chars, got {got}")]
    InvalidLength {
        /// Expected character count.
        expected: usize,
        /// Actual character count.
        got: usize,
    },

    /// Non-hex characters.
    #[error("invalid hex encoding: {0}")]
    InvalidHex(String),

    /// The all-zero address can never hold or mint anything.
    #[error("zero address not allowed")]
    Zero,
}

/// A 20-byte account identifier.
///
/// Parsing accepts checksummed, lowercase, or uppercase hex with or without
/// `0x`. The checksum casing is not validated; wallets hand out checksummed
/// strings and whitelists are usually lowercase, and both must map to the
/// same leaf.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; 20]);

impl Address {
    /// Wraps raw bytes.
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// The raw 20 bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cleaned = s.trim();
        let cleaned = cleaned.strip_prefix("0x").unwrap_or(cleaned);
        if cleaned.len() != 40 {
            return Err(AddressError::InvalidLength {
                expected: 40,
                got: cleaned.len(),
            });
        }
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(cleaned, &mut bytes)
            .map_err(|e| AddressError::InvalidHex(e.to_string()))?;
        if bytes == [0u8; 20] {
            return Err(AddressError::Zero);
        }
        Ok(Self(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Transaction hash
// ---------------------------------------------------------------------------

/// Identifier of a submitted transaction.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxHash(pub Hash32);

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex_encode(self.0))
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({})", self)
    }
}

impl Serialize for TxHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

// ---------------------------------------------------------------------------
// Wei
// ---------------------------------------------------------------------------

/// A payment amount in wei.
///
/// `u128` covers ~3.4 * 10^20 ether, which is comfortably more than anyone
/// will pay for a JPEG.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Wei(pub u128);

impl Wei {
    /// Unit price times quantity, or `None` on overflow.
    pub fn checked_mul(self, quantity: u64) -> Option<Wei> {
        self.0.checked_mul(u128::from(quantity)).map(Wei)
    }

    /// Renders the amount in ether with trailing zeros trimmed, e.g.
    /// `0.005 ETH`, `0.1 ETH`, `2 ETH`.
    pub fn format_ether(&self) -> String {
        let whole = self.0 / WEI_PER_ETHER;
        let frac = self.0 % WEI_PER_ETHER;
        if frac == 0 {
            return format!("{} ETH", whole);
        }
        let digits = format!("{:018}", frac);
        format!("{}.{} ETH", whole, digits.trim_end_matches('0'))
    }
}

impl fmt::Display for Wei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_ether())
    }
}
