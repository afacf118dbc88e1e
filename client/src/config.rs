//! # Mint Configuration & Constants
//!
//! Every number the client compares against or pays with lives here. The
//! contract enforces the same values on-chain; if the two ever disagree the
//! contract wins and the client simply shows the wrong buttons, so keep them
//! in sync with the deployed collection.
//!
//! [`MintConfig`] carries the constants at runtime. Its `Default` is built
//! from the constants below, and a JSON file can override any subset of them
//! (handy for pointing the CLI at a differently-parameterised test deploy).

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::types::{Address, Wei};

// ---------------------------------------------------------------------------
// Collection
// ---------------------------------------------------------------------------

/// Address of the deployed collection contract.
pub const CONTRACT_ADDRESS: &str = "0xEf8a091d6e90e3F2092FF6cb47e8C0d44EB22e3e";

/// Hard cap on the collection. Nothing mints past this, in any phase.
pub const MAX_SUPPLY: u64 = 8888;

/// Units reserved for the whitelist phase.
pub const WHITELIST_PHASE_CAP: u64 = 1111;

/// Units available to the public phase.
pub const PUBLIC_PHASE_CAP: u64 = 7777;

// ---------------------------------------------------------------------------
// Per-wallet limits
// ---------------------------------------------------------------------------

/// A whitelisted wallet gets exactly one unit, and the quantity is fixed at 1.
pub const WHITELIST_WALLET_CAP: u64 = 1;

/// Units a single wallet may mint across the whole public phase.
pub const PUBLIC_WALLET_CAP: u64 = 10;

// ---------------------------------------------------------------------------
// Pricing
// ---------------------------------------------------------------------------

/// 10^18 wei per ether.
pub const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;

/// Whitelist unit price: 0.005 ETH.
pub const WHITELIST_PRICE_WEI: u128 = 5_000_000_000_000_000;

/// Public unit price: 0.01 ETH. Multiplied by the requested quantity.
pub const PUBLIC_PRICE_WEI: u128 = 10_000_000_000_000_000;

// ---------------------------------------------------------------------------
// Confirmation
// ---------------------------------------------------------------------------

/// Upper bound on waiting for a mint to confirm. The transaction may still
/// land afterwards, which is why the session re-reads state on timeout.
pub const CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(120);

/// After this long the wait is reported as slow.
pub const SLOW_CONFIRMATION_AFTER: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// Runtime configuration
// ---------------------------------------------------------------------------

/// Errors raised while loading or validating a [`MintConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid JSON for a `MintConfig`.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// The values parse but contradict each other.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Runtime view of the collection parameters.
///
/// Every field has a default, so a config file only needs the keys it
/// wants to change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MintConfig {
    /// Collection contract address.
    pub contract_address: Address,
    /// Collection-wide supply cap.
    pub max_supply: u64,
    /// Units reserved for the whitelist phase.
    pub whitelist_phase_cap: u64,
    /// Units available in the public phase.
    pub public_phase_cap: u64,
    /// Per-wallet whitelist allowance.
    pub whitelist_wallet_cap: u64,
    /// Per-wallet public allowance.
    pub public_wallet_cap: u64,
    /// Whitelist unit price in wei.
    pub whitelist_price: Wei,
    /// Public unit price in wei.
    pub public_price: Wei,
    /// Bound on waiting for a confirmation, in seconds.
    pub confirmation_timeout_secs: u64,
    /// Seconds after which a pending confirmation is reported as slow.
    pub slow_confirmation_secs: u64,
}

impl Default for MintConfig {
    fn default() -> Self {
        Self {
            contract_address: CONTRACT_ADDRESS
                .parse()
                .unwrap_or(Address::new([0xEF; 20])),
            max_supply: MAX_SUPPLY,
            whitelist_phase_cap: WHITELIST_PHASE_CAP,
            public_phase_cap: PUBLIC_PHASE_CAP,
            whitelist_wallet_cap: WHITELIST_WALLET_CAP,
            public_wallet_cap: PUBLIC_WALLET_CAP,
            whitelist_price: Wei(WHITELIST_PRICE_WEI),
            public_price: Wei(PUBLIC_PRICE_WEI),
            confirmation_timeout_secs: CONFIRMATION_TIMEOUT.as_secs(),
            slow_confirmation_secs: SLOW_CONFIRMATION_AFTER.as_secs(),
        }
    }
}

impl MintConfig {
    /// Parses and validates a config from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: MintConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses, and validates a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Rejects parameter sets no contract could have been deployed with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_supply == 0 {
            return Err(ConfigError::Invalid("max_supply must be positive".into()));
        }
        if self.whitelist_wallet_cap == 0 || self.public_wallet_cap == 0 {
            return Err(ConfigError::Invalid(
                "per-wallet caps must be positive".into(),
            ));
        }
        if self.whitelist_phase_cap > self.max_supply || self.public_phase_cap > self.max_supply {
            return Err(ConfigError::Invalid(format!(
                "phase caps ({} / {}) cannot exceed max_supply {}",
                self.whitelist_phase_cap, self.public_phase_cap, self.max_supply
            )));
        }
        if self.slow_confirmation_secs >= self.confirmation_timeout_secs {
            return Err(ConfigError::Invalid(
                "slow_confirmation_secs must be below confirmation_timeout_secs".into(),
            ));
        }
        Ok(())
    }

    /// Bound on waiting for a mint confirmation.
    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_secs)
    }

    /// Point at which a pending confirmation is reported as slow.
    pub fn slow_confirmation_after(&self) -> Duration {
        Duration::from_secs(self.slow_confirmation_secs)
    }
}
