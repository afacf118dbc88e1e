//! # Whitelist Merkle Tree
//!
//! A plain binary Merkle tree over the membership leaves, built the way the
//! contract-side root was built:
//!
//! - leaves are `keccak256(address)` in membership order;
//! - each interior node is the sorted-pair hash of its two children;
//! - an odd node at the end of a level is promoted unchanged (no duplication).
//!
//! The tree is built once per session and never mutated. Proofs are cheap
//! (`O(log n)` lookups) and are produced on demand for the connected wallet.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;

use crate::crypto::{hash_sorted_pair, leaf_hash};
use crate::types::{hex_encode, parse_hash32, Address, Hash32};

use super::membership::MembershipSet;

// ---------------------------------------------------------------------------
// Inclusion proof
// ---------------------------------------------------------------------------

/// Sibling hashes from a leaf up to (but excluding) the root.
///
/// Serialised as a JSON array of `0x` hex strings, which is what the
/// contract's `bytes32[]` argument takes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InclusionProof(Vec<Hash32>);

impl InclusionProof {
    /// Wraps a list of sibling hashes.
    pub fn new(siblings: Vec<Hash32>) -> Self {
        Self(siblings)
    }

    /// The sibling hashes, leaf side first.
    pub fn siblings(&self) -> &[Hash32] {
        &self.0
    }

    /// Number of siblings.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` for the proof of a one-member tree and for absent addresses.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Hex strings, ready for display or an ABI encoder.
    pub fn to_hex(&self) -> Vec<String> {
        self.0.iter().map(hex_encode).collect()
    }
}

impl Serialize for InclusionProof {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_hex().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for InclusionProof {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Vec::<String>::deserialize(deserializer)?;
        raw.iter()
            .map(|s| parse_hash32(s).map_err(serde::de::Error::custom))
            .collect::<Result<Vec<_>, _>>()
            .map(InclusionProof)
    }
}

/// Recomputes the root from a leaf and its proof and compares.
///
/// This is the contract's check, reproduced locally.
pub fn verify_proof(root: &Hash32, leaf: &Hash32, proof: &InclusionProof) -> bool {
    let computed = proof
        .siblings()
        .iter()
        .fold(*leaf, |node, sibling| hash_sorted_pair(&node, sibling));
    &computed == root
}

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

/// A fully materialised Merkle tree.
///
/// `levels[0]` holds the leaves and the last level holds exactly one node,
/// the root.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    levels: Vec<Vec<Hash32>>,
    positions: HashMap<Hash32, usize>,
}

impl MerkleTree {
    /// Hashes every member and builds all levels.
    ///
    /// Never fails: [`MembershipSet`] guarantees at least one member.
    pub fn build(set: &MembershipSet) -> Self {
        let leaves: Vec<Hash32> = set.members().iter().map(leaf_hash).collect();
        let positions = leaves
            .iter()
            .enumerate()
            .map(|(index, leaf)| (*leaf, index))
            .collect();

        let mut levels = vec![leaves];
        loop {
            let next = {
                let current = &levels[levels.len() - 1];
                if current.len() <= 1 {
                    break;
                }
                current
                    .chunks(2)
                    .map(|pair| {
                        if pair.len() == 2 {
                            hash_sorted_pair(&pair[0], &pair[1])
                        } else {
                            // Odd node out: promoted as-is.
                            pair[0]
                        }
                    })
                    .collect::<Vec<_>>()
            };
            levels.push(next);
        }

        tracing::debug!(
            leaves = set.len(),
            depth = levels.len() - 1,
            "whitelist tree built"
        );

        Self { levels, positions }
    }

    /// The root the contract must have been configured with.
    pub fn root(&self) -> Hash32 {
        self.levels
            .last()
            .and_then(|level| level.first())
            .copied()
            .unwrap_or([0u8; 32])
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        self.levels[0].len()
    }

    /// Number of hashing levels above the leaves.
    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    /// Builds the inclusion proof for `address`.
    ///
    /// An address outside the set gets the empty proof rather than an error.
    /// Deciding membership is the verifier's job, and the empty proof only
    /// verifies when the leaf itself is the root, which cannot happen for a
    /// non-member short of a keccak collision.
    pub fn proof(&self, address: &Address) -> InclusionProof {
        let leaf = leaf_hash(address);
        let Some(&position) = self.positions.get(&leaf) else {
            tracing::debug!(%address, "address not in whitelist, returning empty proof");
            return InclusionProof::default();
        };

        let mut siblings = Vec::with_capacity(self.depth());
        let mut index = position;
        for level in &self.levels[..self.levels.len() - 1] {
            let sibling = index ^ 1;
            if sibling < level.len() {
                siblings.push(level[sibling]);
            }
            index /= 2;
        }
        InclusionProof(siblings)
    }

    /// Checks `proof` for `address` against this tree's root.
    pub fn verify(&self, address: &Address, proof: &InclusionProof) -> bool {
        verify_proof(&self.root(), &leaf_hash(address), proof)
    }
}
