//! # Hashing Utilities
//!
//! Keccak-256 is the only hash in the client, because it is the only hash the
//! EVM contract can verify cheaply. Every leaf and every interior node of the
//! whitelist tree goes through here.
//!
//! ## Sorted-pair hashing
//!
//! Interior nodes are `keccak256(min(a, b) || max(a, b))`, comparing the two
//! children as big-endian byte strings. Because the pair is sorted before
//! hashing, a proof does not need to say which side each sibling sits on, and
//! the contract-side verifier (OpenZeppelin's `MerkleProof`) does exactly the
//! same thing. Change the rule here and every proof silently stops verifying.

use sha3::{Digest, Keccak256};

use crate::types::{Address, Hash32};

/// Compute the Keccak-256 hash of the input data.
///
/// # Example
///
/// ```
/// use fifthdim_client::crypto::keccak256;
///
/// let hash = keccak256(b"");
/// assert_eq!(hash[0], 0xc5);
/// ```
pub fn keccak256(data: &[u8]) -> Hash32 {
    Keccak256::digest(data).into()
}

/// Hash multiple byte slices as if they were concatenated, without
/// allocating the concatenation.
pub fn keccak256_multi(parts: &[&[u8]]) -> Hash32 {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// Combine two nodes with the sorted-pair rule.
///
/// Symmetric by construction: `hash_sorted_pair(a, b) == hash_sorted_pair(b, a)`.
pub fn hash_sorted_pair(a: &Hash32, b: &Hash32) -> Hash32 {
    if a <= b {
        keccak256_multi(&[a.as_slice(), b.as_slice()])
    } else {
        keccak256_multi(&[b.as_slice(), a.as_slice()])
    }
}

/// The whitelist leaf for an address: keccak-256 of its raw 20 bytes.
///
/// No padding, no prefix. The contract computes
/// `keccak256(abi.encodePacked(msg.sender))`, which is the same 20 bytes.
pub fn leaf_hash(address: &Address) -> Hash32 {
    keccak256(address.as_bytes())
}
