//! # Cryptographic Primitives
//!
//! Just hashing. Signing is the wallet's job and never happens in this
//! process; all the client needs is to reproduce the contract's Merkle
//! arithmetic bit for bit.

pub mod hash;

pub use hash::{hash_sorted_pair, keccak256, keccak256_multi, leaf_hash};
