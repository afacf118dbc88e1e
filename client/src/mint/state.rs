//! # Mint Phase State
//!
//! A typed snapshot of every contract field the eligibility rules look at.
//! The contract is the only writer; the client re-reads the whole snapshot
//! on connect and after every mint attempt instead of patching it locally.

use serde::{Deserialize, Serialize};

use crate::config::MintConfig;
use crate::ports::{ContractError, MintContract};
use crate::types::Address;

/// Snapshot of the contract's mint counters and phase flags, as seen by
/// one wallet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintPhaseState {
    /// Whitelist phase is open.
    pub whitelist_active: bool,
    /// Public phase is open.
    pub public_active: bool,
    /// Units minted so far, across phases.
    pub total_supply: u64,
    /// Collection-wide cap.
    pub max_supply: u64,
    /// Units minted in the whitelist phase.
    pub whitelist_phase_minted: u64,
    /// Whitelist phase allocation.
    pub whitelist_phase_cap: u64,
    /// Units minted in the public phase.
    pub public_phase_minted: u64,
    /// Public phase allocation.
    pub public_phase_cap: u64,
    /// Units this wallet minted in the whitelist phase.
    pub wallet_whitelist_minted: u64,
    /// Units this wallet minted in the public phase.
    pub wallet_public_minted: u64,
}

impl MintPhaseState {
    /// Reads the snapshot for `wallet`, one view call at a time.
    ///
    /// Phase caps have no getter on the contract, so they come from
    /// `config`.
    pub async fn fetch(
        contract: &dyn MintContract,
        wallet: Address,
        config: &MintConfig,
    ) -> Result<Self, ContractError> {
        let whitelist_active = contract.is_whitelist_mint_active().await?;
        let public_active = contract.is_public_mint_active().await?;
        let wallet_whitelist_minted = contract.total_minted_whitelist(wallet).await?;
        let wallet_public_minted = contract.total_minted_public(wallet).await?;
        let whitelist_phase_minted = contract.whitelist_minted_amount().await?;
        let public_phase_minted = contract.public_minted_amount().await?;
        let total_supply = contract.total_supply().await?;
        let max_supply = contract.max_supply().await?;

        let state = Self {
            whitelist_active,
            public_active,
            total_supply,
            max_supply,
            whitelist_phase_minted,
            whitelist_phase_cap: config.whitelist_phase_cap,
            public_phase_minted,
            public_phase_cap: config.public_phase_cap,
            wallet_whitelist_minted,
            wallet_public_minted,
        };
        tracing::debug!(%wallet, ?state, "mint state fetched");
        Ok(state)
    }

    /// Nothing is left to mint in any phase.
    pub fn is_sold_out(&self) -> bool {
        self.total_supply >= self.max_supply
    }

    /// Units left before the collection cap.
    pub fn remaining_supply(&self) -> u64 {
        self.max_supply.saturating_sub(self.total_supply)
    }

    /// Neither phase is open.
    pub fn is_between_phases(&self) -> bool {
        !self.whitelist_active && !self.public_active
    }
}
