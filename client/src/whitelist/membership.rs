//! # Membership Set
//!
//! The list of addresses allowed into the whitelist phase. It is fixed when
//! the collection is deployed (the contract stores only the root), so the
//! list is embedded into the binary from `data/whitelist.json`.
//! `MembershipSet::load` takes any other list from disk.
//!
//! The embedded file is a generated stand-in, not the collection's
//! published account list. Proofs only verify on-chain when the tree is
//! built from exactly the list the deployed root was computed over, so a
//! real deployment must replace `data/whitelist.json` with that list.
//!
//! Order matters for the tree shape and therefore for the root: the list is
//! kept exactly as given.

use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

use crate::types::{Address, AddressError};

/// Stand-in whitelist bundled for local use; see the module docs.
const EMBEDDED_WHITELIST: &str = include_str!("../../data/whitelist.json");

/// Errors from loading a membership list.
#[derive(Debug, Error)]
pub enum MembershipError {
    /// A tree needs at least one leaf.
    #[error("membership set is empty")]
    Empty,

    /// An entry is not a valid address.
    #[error("invalid address at index {index}: {source}")]
    InvalidAddress {
        /// Position in the list.
        index: usize,
        /// Why it failed to parse.
        #[source]
        source: AddressError,
    },

    /// The same address appears twice, which would give it two leaves.
    #[error("duplicate address {address} at index {index}")]
    Duplicate {
        /// The repeated address.
        address: Address,
        /// Position of the second occurrence.
        index: usize,
    },

    /// The source is not a JSON array of strings.
    #[error("failed to parse membership list: {0}")]
    Parse(#[from] serde_json::Error),

    /// The file could not be read.
    #[error("failed to read membership list: {0}")]
    Io(#[from] std::io::Error),
}

/// An ordered, duplicate-free, non-empty list of eligible addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipSet {
    members: Vec<Address>,
}

impl MembershipSet {
    /// Builds a set from already-parsed addresses.
    ///
    /// # Errors
    ///
    /// [`MembershipError::Empty`] for an empty list and
    /// [`MembershipError::Duplicate`] if any address repeats.
    pub fn new(members: Vec<Address>) -> Result<Self, MembershipError> {
        if members.is_empty() {
            return Err(MembershipError::Empty);
        }
        let mut seen = HashSet::with_capacity(members.len());
        for (index, address) in members.iter().enumerate() {
            if !seen.insert(*address) {
                return Err(MembershipError::Duplicate {
                    address: *address,
                    index,
                });
            }
        }
        Ok(Self { members })
    }

    /// Parses a JSON array of hex address strings.
    pub fn from_json_str(json: &str) -> Result<Self, MembershipError> {
        let raw: Vec<String> = serde_json::from_str(json)?;
        let members = raw
            .iter()
            .enumerate()
            .map(|(index, s)| {
                s.parse::<Address>()
                    .map_err(|source| MembershipError::InvalidAddress { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(members)
    }

    /// Reads a JSON membership list from disk.
    pub fn load(path: &Path) -> Result<Self, MembershipError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// The whitelist compiled into the crate.
    pub fn embedded() -> Result<Self, MembershipError> {
        Self::from_json_str(EMBEDDED_WHITELIST)
    }

    /// Members in their original order.
    pub fn members(&self) -> &[Address] {
        &self.members
    }

    /// Number of members. Never zero.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Linear membership check, reported by `fifthdim proof` next to the
    /// proof verification. The session answers membership through the
    /// proof instead.
    pub fn contains(&self, address: &Address) -> bool {
        self.members.contains(address)
    }
}
