//! Error type for everything the session and submitter can refuse or fail.
//!
//! None of these are fatal to the process. The front end catches them at
//! the session boundary and shows `to_string()` to the user.

use thiserror::Error;

use crate::ports::{ContractError, WalletError};
use crate::types::TxHash;

use super::eligibility::StatusMessage;

/// Errors surfaced by [`crate::mint::MintSession`] and
/// [`crate::mint::TransactionSubmitter`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MintError {
    /// No wallet provider in the host environment.
    #[error("no wallet provider found: please install a wallet such as MetaMask")]
    NoWalletProvider,

    /// An operation that needs a connected wallet was called without one.
    #[error("wallet is not connected")]
    NotConnected,

    /// The wallet refused to hand over an account.
    #[error("wallet error: {0}")]
    Wallet(#[from] WalletError),

    /// A contract read failed while connecting or refreshing.
    #[error("failed to read mint state: {0}")]
    Read(ContractError),

    /// The requested quantity is outside `1..=max`.
    #[error("invalid quantity {requested}: must be between 1 and {max}")]
    InvalidQuantity {
        /// Quantity that was asked for.
        requested: u64,
        /// Remaining per-wallet allowance.
        max: u64,
    },

    /// The current state does not allow the requested mint.
    #[error("not eligible to mint: {0}")]
    NotEligible(StatusMessage),

    /// Another mint from this session has not resolved yet.
    #[error("a mint transaction is already pending")]
    MintInFlight,

    /// The wallet or the chain refused the transaction.
    #[error("an error occurred while minting: {reason}")]
    TransactionRejected {
        /// Underlying reason string from the provider or the revert.
        reason: String,
    },

    /// The transaction failed because the state moved underneath it (sold
    /// out mid-click and similar). Detected on the re-read after failure.
    #[error("mint state changed before the transaction landed ({status}): {reason}")]
    StaleState {
        /// Status after re-reading the contract.
        status: StatusMessage,
        /// Underlying reason string from the failed transaction.
        reason: String,
    },

    /// The transaction was submitted but not confirmed in time. It may
    /// still land.
    #[error("transaction {tx_hash} not confirmed within {timeout_secs}s")]
    ConfirmationTimeout {
        /// Hash of the submitted transaction.
        tx_hash: TxHash,
        /// Configured bound.
        timeout_secs: u64,
    },

    /// `unit price * quantity` does not fit in a `u128`.
    #[error("payment overflows for quantity {0}")]
    PaymentOverflow(u64),
}

impl MintError {
    /// Builds the rejection variant from a contract failure during a write.
    pub(crate) fn rejected(err: &ContractError) -> Self {
        MintError::TransactionRejected {
            reason: err.reason().to_string(),
        }
    }
}
