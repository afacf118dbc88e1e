//! # Transaction Submitter
//!
//! Thin wrapper over the two contract entry points. It re-checks
//! eligibility against the snapshot it is given, attaches the right payment,
//! and waits for confirmation with an upper bound.
//!
//! The submitter never touches the snapshot. Whether the mint succeeded or
//! not, the caller is expected to re-read the contract.

use crate::config::MintConfig;
use crate::ports::{MintContract, MintReceipt, PendingMint};
use crate::whitelist::InclusionProof;

use super::eligibility::{
    evaluate, max_public_quantity, public_payment, validate_quantity, whitelist_payment,
    EligibilityInput,
};
use super::error::MintError;
use super::state::MintPhaseState;

/// Submits mints through one contract handle.
pub struct TransactionSubmitter<'a> {
    contract: &'a dyn MintContract,
    config: &'a MintConfig,
}

impl<'a> TransactionSubmitter<'a> {
    /// Binds the submitter to a contract handle and the collection config.
    pub fn new(contract: &'a dyn MintContract, config: &'a MintConfig) -> Self {
        Self { contract, config }
    }

    /// Whitelist mint: one unit, the wallet's proof, the whitelist price.
    ///
    /// # Errors
    ///
    /// - [`MintError::NotEligible`] unless the snapshot allows a whitelist mint.
    /// - [`MintError::TransactionRejected`] if the wallet or the chain refuses.
    /// - [`MintError::ConfirmationTimeout`] if confirmation takes too long.
    pub async fn submit_whitelist_mint(
        &self,
        state: &MintPhaseState,
        membership_verified: bool,
        proof: &InclusionProof,
    ) -> Result<MintReceipt, MintError> {
        let eligibility = evaluate(
            self.config,
            &EligibilityInput {
                connected: true,
                state,
                membership_verified,
                quantity: 1,
            },
        );
        if !eligibility.can_whitelist_mint {
            return Err(MintError::NotEligible(eligibility.status));
        }

        let value = whitelist_payment(self.config);
        tracing::info!(%value, proof_len = proof.len(), "submitting whitelist mint");
        let pending = self
            .contract
            .whitelist_mint(1, proof, value)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "whitelist mint rejected");
                MintError::rejected(&e)
            })?;
        self.confirm(pending).await
    }

    /// Public mint of `quantity` units at `unit price * quantity`.
    ///
    /// # Errors
    ///
    /// - [`MintError::InvalidQuantity`] if `quantity` is outside
    ///   `1..=remaining allowance`. Checked before anything else.
    /// - [`MintError::NotEligible`] unless the snapshot allows the mint.
    /// - [`MintError::TransactionRejected`] / [`MintError::ConfirmationTimeout`]
    ///   as for the whitelist path.
    pub async fn submit_public_mint(
        &self,
        state: &MintPhaseState,
        quantity: u64,
    ) -> Result<MintReceipt, MintError> {
        validate_quantity(quantity, max_public_quantity(self.config, state))?;

        let eligibility = evaluate(
            self.config,
            &EligibilityInput {
                connected: true,
                state,
                membership_verified: false,
                quantity,
            },
        );
        if !eligibility.can_public_mint {
            return Err(MintError::NotEligible(eligibility.status));
        }

        let value = public_payment(self.config, quantity)?;
        tracing::info!(quantity, %value, "submitting public mint");
        let pending = self
            .contract
            .public_mint(quantity, value)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "public mint rejected");
                MintError::rejected(&e)
            })?;
        self.confirm(pending).await
    }

    /// Waits for the receipt, warning once the wait gets slow and giving up
    /// at the configured bound.
    async fn confirm(&self, mut pending: Box<dyn PendingMint>) -> Result<MintReceipt, MintError> {
        let tx_hash = pending.tx_hash();
        let slow_after = self.config.slow_confirmation_after();
        let timeout = self.config.confirmation_timeout();
        tracing::info!(%tx_hash, "waiting for confirmation");

        let mut wait = pending.wait();
        let outcome = match tokio::time::timeout(slow_after, &mut wait).await {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::warn!(
                    %tx_hash,
                    waited_secs = slow_after.as_secs(),
                    "confirmation is taking longer than expected"
                );
                match tokio::time::timeout(timeout.saturating_sub(slow_after), wait).await {
                    Ok(outcome) => outcome,
                    Err(_) => {
                        tracing::warn!(%tx_hash, "gave up waiting for confirmation");
                        return Err(MintError::ConfirmationTimeout {
                            tx_hash,
                            timeout_secs: timeout.as_secs(),
                        });
                    }
                }
            }
        };

        let receipt = outcome.map_err(|e| {
            tracing::warn!(%tx_hash, error = %e, "mint transaction failed");
            MintError::rejected(&e)
        })?;
        tracing::info!(
            %tx_hash,
            quantity = receipt.quantity,
            block = receipt.block_number,
            "mint confirmed"
        );
        Ok(receipt)
    }
}
