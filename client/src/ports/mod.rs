//! # External Collaborators
//!
//! The wallet and the contract are reached only through these traits, so
//! the session logic runs unchanged against a browser provider, an RPC
//! client, or the in-process simulation in [`crate::adapters`].

pub mod contract;
pub mod wallet;

pub use contract::{ContractError, MintContract, MintReceipt, PendingMint};
pub use wallet::{WalletError, WalletProvider};
