// Copyright (c) 2026 Moiz Arfeen Khan. MIT License.
// See LICENSE for details.

//! # Fifth Dimension Mint Client
//!
//! Client-side core of the Fifth Dimension NFT mint: everything between
//! "a wallet connected" and "the contract confirmed the mint".
//!
//! ## Architecture
//!
//! - **whitelist**: the membership list and the Merkle tree that proves it.
//! - **crypto**: keccak256 and the sorted-pair node hash.
//! - **mint**: contract snapshot, eligibility rules, submission, session.
//! - **ports**: traits for the wallet provider and the collection contract.
//! - **adapters**: in-process implementations of those traits.
//! - **config**: collection constants and runtime configuration.
//! - **types**: addresses, hashes, and wei amounts.
//!
//! ## Ground rules
//!
//! 1. The contract is the source of truth. Local state is a snapshot that
//!    is re-read, never patched.
//! 2. Every mint decision goes through [`mint::evaluate`].
//! 3. One boundary rule for every cap: `count + quantity <= cap`.

pub mod adapters;
pub mod config;
pub mod crypto;
pub mod mint;
pub mod ports;
pub mod types;
pub mod whitelist;

/// Crate version, as reported by the CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
