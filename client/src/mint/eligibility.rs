//! # Eligibility Evaluator
//!
//! One pure function decides what the connected wallet may do right now.
//! The view, the submitter, and the session all call [`evaluate`] instead
//! of re-deriving their own conditions.
//!
//! ## Boundary convention
//!
//! A unit may be minted only while the counter *before* it is strictly below
//! the cap. For a batch of `q` units that means `count + q <= cap`, and the
//! same rule applies to every cap: per-wallet, per-phase, and total supply.
//!
//! ## Status priority
//!
//! 1. no wallet: `NotConnected`
//! 2. collection exhausted: `SoldOut` (overrides every phase flag)
//! 3. whitelist mint possible: `WhitelistReady`
//! 4. public phase open: `PublicLimitReached`, `PublicPhaseSoldOut`, or
//!    `PublicReady`
//! 5. whitelist phase open: `NotWhitelisted`, `WhitelistUsed`, or
//!    `WhitelistPhaseSoldOut`
//! 6. otherwise `AwaitingNextPhase`

use serde::Serialize;
use std::fmt;

use crate::config::MintConfig;
use crate::types::Wei;

use super::error::MintError;
use super::state::MintPhaseState;

/// What the front end tells the user, in priority order of evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StatusMessage {
    /// No wallet connected.
    NotConnected,
    /// Whitelist phase is open but this wallet is not on the list.
    NotWhitelisted,
    /// Whitelist mint is available.
    WhitelistReady,
    /// This wallet already used its whitelist allowance.
    WhitelistUsed,
    /// The whitelist allocation is gone.
    WhitelistPhaseSoldOut,
    /// Public mint is available for the requested quantity.
    PublicReady,
    /// The requested quantity exceeds this wallet's public allowance.
    PublicLimitReached,
    /// The public allocation cannot cover the requested quantity.
    PublicPhaseSoldOut,
    /// No phase is open.
    AwaitingNextPhase,
    /// Every unit of the collection is minted.
    SoldOut,
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            StatusMessage::NotConnected => "Connect your wallet to mint",
            StatusMessage::NotWhitelisted => "You are not Whitelisted",
            StatusMessage::WhitelistReady => "Whitelist Mint is Live",
            StatusMessage::WhitelistUsed => "Your Whitelist Mint Limit Exceeded",
            StatusMessage::WhitelistPhaseSoldOut => "Whitelist Supply Sold Out",
            StatusMessage::PublicReady => "Public Mint is Live",
            StatusMessage::PublicLimitReached => "Your Public Mint Limit Exceeded",
            StatusMessage::PublicPhaseSoldOut => "Public Supply Sold Out",
            StatusMessage::AwaitingNextPhase => "Mint is not Live",
            StatusMessage::SoldOut => "We're Sold Out",
        };
        f.write_str(text)
    }
}

/// Everything the evaluator looks at.
#[derive(Debug, Clone, Copy)]
pub struct EligibilityInput<'a> {
    /// A wallet is connected. When `false`, `state` is ignored.
    pub connected: bool,
    /// Latest contract snapshot.
    pub state: &'a MintPhaseState,
    /// The contract accepted this wallet's whitelist proof.
    pub membership_verified: bool,
    /// Quantity requested for a public mint.
    pub quantity: u64,
}

/// Derived permissions. Recomputed on every request, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Eligibility {
    /// A whitelist mint of one unit would be accepted.
    pub can_whitelist_mint: bool,
    /// A public mint of `quantity` units would be accepted.
    pub can_public_mint: bool,
    /// The message to show.
    pub status: StatusMessage,
    /// Quantity this evaluation was made for.
    pub quantity: u64,
    /// Largest public quantity this wallet may still request.
    pub max_quantity: u64,
}

impl Eligibility {
    /// Either mint path is open.
    pub fn can_mint(&self) -> bool {
        self.can_whitelist_mint || self.can_public_mint
    }
}

/// `count + n <= cap`, without overflow.
fn fits(count: u64, n: u64, cap: u64) -> bool {
    count.checked_add(n).is_some_and(|total| total <= cap)
}

/// Computes the permissions and status for one wallet.
pub fn evaluate(config: &MintConfig, input: &EligibilityInput<'_>) -> Eligibility {
    let s = input.state;
    let q = input.quantity;
    let max_quantity = if input.connected {
        max_public_quantity(config, s)
    } else {
        0
    };

    let wl_wallet_ok = fits(s.wallet_whitelist_minted, 1, config.whitelist_wallet_cap);
    let wl_phase_ok = fits(s.whitelist_phase_minted, 1, s.whitelist_phase_cap);
    let wl_supply_ok = s.remaining_supply() >= 1;
    let can_whitelist_mint = input.connected
        && s.whitelist_active
        && input.membership_verified
        && wl_wallet_ok
        && wl_phase_ok
        && wl_supply_ok;

    let pub_wallet_ok = q >= 1 && fits(s.wallet_public_minted, q, config.public_wallet_cap);
    let pub_phase_ok = fits(s.public_phase_minted, q, s.public_phase_cap);
    let pub_supply_ok = q <= s.remaining_supply();
    let can_public_mint =
        input.connected && s.public_active && pub_wallet_ok && pub_phase_ok && pub_supply_ok;

    let status = if !input.connected {
        StatusMessage::NotConnected
    } else if s.is_sold_out() {
        StatusMessage::SoldOut
    } else if can_whitelist_mint {
        StatusMessage::WhitelistReady
    } else if s.public_active {
        if !pub_wallet_ok {
            StatusMessage::PublicLimitReached
        } else if !(pub_phase_ok && pub_supply_ok) {
            StatusMessage::PublicPhaseSoldOut
        } else {
            StatusMessage::PublicReady
        }
    } else if s.whitelist_active {
        if !input.membership_verified {
            StatusMessage::NotWhitelisted
        } else if !wl_wallet_ok {
            StatusMessage::WhitelistUsed
        } else {
            StatusMessage::WhitelistPhaseSoldOut
        }
    } else {
        StatusMessage::AwaitingNextPhase
    };

    Eligibility {
        can_whitelist_mint,
        can_public_mint,
        status,
        quantity: q,
        max_quantity,
    }
}

// ---------------------------------------------------------------------------
// Quantity
// ---------------------------------------------------------------------------

/// Remaining public allowance for the wallet: `cap - minted`, floored at 0.
pub fn max_public_quantity(config: &MintConfig, state: &MintPhaseState) -> u64 {
    config
        .public_wallet_cap
        .saturating_sub(state.wallet_public_minted)
}

/// Clamps a stepper value into `1..=max`. With no allowance left the
/// stepper rests at 1 and the mint button is what gets disabled.
pub fn clamp_quantity(quantity: u64, max: u64) -> u64 {
    quantity.min(max).max(1)
}

/// Checks a directly entered quantity. Never clamps: a silently adjusted
/// quantity would change the payment.
pub fn validate_quantity(requested: u64, max: u64) -> Result<u64, MintError> {
    if requested == 0 || requested > max {
        return Err(MintError::InvalidQuantity { requested, max });
    }
    Ok(requested)
}

// ---------------------------------------------------------------------------
// Pricing
// ---------------------------------------------------------------------------

/// Value sent with a whitelist mint. Quantity is always one.
pub fn whitelist_payment(config: &MintConfig) -> Wei {
    config.whitelist_price
}

/// Value sent with a public mint of `quantity` units.
pub fn public_payment(config: &MintConfig, quantity: u64) -> Result<Wei, MintError> {
    config
        .public_price
        .checked_mul(quantity)
        .ok_or(MintError::PaymentOverflow(quantity))
}
