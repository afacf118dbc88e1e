//! Port for the collection contract.
//!
//! A handle is bound to one signer, the same way an ethers `Contract` built
//! from a signer is: reads that take a wallet argument can ask about anyone,
//! but writes always mint to the bound account.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::types::{Address, Hash32, TxHash, Wei};
use crate::whitelist::InclusionProof;

/// Failures reported by the contract or by the wallet relaying to it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    /// The user dismissed or cancelled the approval prompt.
    #[error("user rejected the request: {0}")]
    Rejected(String),

    /// The transaction reverted, or the node refused it (insufficient funds,
    /// cap reached, bad proof).
    #[error("execution reverted: {0}")]
    Reverted(String),

    /// A view call failed.
    #[error("contract read failed: {0}")]
    Read(String),
}

impl ContractError {
    /// The underlying reason string, without the category prefix.
    pub fn reason(&self) -> &str {
        match self {
            ContractError::Rejected(reason)
            | ContractError::Reverted(reason)
            | ContractError::Read(reason) => reason,
        }
    }
}

/// Outcome of a confirmed mint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MintReceipt {
    /// Transaction that carried the mint.
    pub tx_hash: TxHash,
    /// Units minted.
    pub quantity: u64,
    /// Value sent with the transaction.
    pub paid: Wei,
    /// Block the transaction landed in.
    pub block_number: u64,
}

/// A submitted mint that has not been confirmed yet.
#[async_trait]
pub trait PendingMint: Send {
    /// Hash of the submitted transaction.
    fn tx_hash(&self) -> TxHash;

    /// Resolves once the transaction is mined. A revert at this stage comes
    /// back as [`ContractError::Reverted`].
    async fn wait(&mut self) -> Result<MintReceipt, ContractError>;
}

/// Read and write surface of the collection contract.
#[async_trait]
pub trait MintContract: Send + Sync {
    /// Address of the deployed contract.
    fn address(&self) -> Address;

    /// `isWhitelistMintActive()`.
    async fn is_whitelist_mint_active(&self) -> Result<bool, ContractError>;

    /// `isPublicMintActive()`.
    async fn is_public_mint_active(&self) -> Result<bool, ContractError>;

    /// `isValidWhiteList(proof, leaf)`: the contract's own proof check.
    async fn is_valid_whitelist(
        &self,
        proof: &InclusionProof,
        leaf: Hash32,
    ) -> Result<bool, ContractError>;

    /// `totalMintedWhitelist(wallet)`.
    async fn total_minted_whitelist(&self, wallet: Address) -> Result<u64, ContractError>;

    /// `totalMintedPublic(wallet)`.
    async fn total_minted_public(&self, wallet: Address) -> Result<u64, ContractError>;

    /// `whitelistMintedAmount()`: units minted in the whitelist phase.
    async fn whitelist_minted_amount(&self) -> Result<u64, ContractError>;

    /// `publicMintedAmount()`: units minted in the public phase.
    async fn public_minted_amount(&self) -> Result<u64, ContractError>;

    /// `totalSupply()`.
    async fn total_supply(&self) -> Result<u64, ContractError>;

    /// `maxSupply()`.
    async fn max_supply(&self) -> Result<u64, ContractError>;

    /// The configured whitelist root, when the contract exposes a getter.
    async fn merkle_root(&self) -> Result<Option<Hash32>, ContractError> {
        Ok(None)
    }

    /// `whitelistMint(quantity, proof)` with `value` attached.
    async fn whitelist_mint(
        &self,
        quantity: u64,
        proof: &InclusionProof,
        value: Wei,
    ) -> Result<Box<dyn PendingMint>, ContractError>;

    /// `publicMint(quantity)` with `value` attached.
    async fn public_mint(
        &self,
        quantity: u64,
        value: Wei,
    ) -> Result<Box<dyn PendingMint>, ContractError>;
}
