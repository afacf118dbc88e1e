//! # In-Process Adapters
//!
//! Implementations of the [`crate::ports`] traits that need no browser and
//! no node.

pub mod simulated;
pub mod wallet;

pub use simulated::{ChainState, SimulatedChain, SimulatedContract};
pub use wallet::StaticWallet;
