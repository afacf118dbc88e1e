//! A wallet provider with a fixed account, for tests and the CLI.

use async_trait::async_trait;

use crate::ports::{WalletError, WalletProvider};
use crate::types::Address;

/// Hands out one preconfigured address, or refuses like a user who
/// dismissed the connection prompt.
#[derive(Debug, Clone)]
pub struct StaticWallet {
    account: Option<Address>,
}

impl StaticWallet {
    /// A wallet that connects as `address`.
    pub fn new(address: Address) -> Self {
        Self {
            account: Some(address),
        }
    }

    /// A wallet whose user rejects the connection request.
    pub fn rejecting() -> Self {
        Self { account: None }
    }
}

#[async_trait]
impl WalletProvider for StaticWallet {
    fn name(&self) -> &str {
        "static"
    }

    async fn address(&self) -> Result<Address, WalletError> {
        self.account.ok_or(WalletError::Rejected)
    }
}
