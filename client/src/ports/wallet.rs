//! Port for the injected wallet provider.

use async_trait::async_trait;
use thiserror::Error;

use crate::types::Address;

/// Failures from the wallet provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    /// The user declined the connection request.
    #[error("user rejected the connection request")]
    Rejected,
}

/// An opaque signing capability. The client only ever asks it who it is;
/// signing happens behind the contract handle bound to it.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Provider name for logs ("MetaMask", "static", ...).
    fn name(&self) -> &str;

    /// Address of the selected account.
    async fn address(&self) -> Result<Address, WalletError>;
}
