//! # Whitelist
//!
//! Membership list plus the Merkle tree that proves membership to the
//! contract.

pub mod membership;
pub mod merkle;

pub use membership::{MembershipError, MembershipSet};
pub use merkle::{verify_proof, InclusionProof, MerkleTree};
