//! # Mint View Model
//!
//! The strings and enable/disable flags the mint panel renders. Everything
//! is derived from one [`Eligibility`] plus the snapshot, so the panel can
//! never disagree with what [`crate::mint::MintSession::mint`] will do.

use serde::Serialize;

use crate::config::MintConfig;
use crate::types::Address;

use super::eligibility::{public_payment, whitelist_payment, Eligibility, StatusMessage};
use super::state::MintPhaseState;

/// Inputs to [`render`].
#[derive(Debug, Clone, Copy)]
pub struct ViewInput<'a> {
    /// Connected account, if any.
    pub wallet: Option<Address>,
    /// Latest snapshot; ignored while disconnected.
    pub state: &'a MintPhaseState,
    /// The contract accepted this wallet's proof.
    pub membership_verified: bool,
    /// Evaluation for the current quantity.
    pub eligibility: &'a Eligibility,
    /// A mint is in flight.
    pub pending: bool,
    /// A wallet connection is in flight.
    pub connecting: bool,
    /// The last mint from this session confirmed.
    pub completed: bool,
}

/// Render-ready description of the mint panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MintView {
    /// Connected account.
    pub wallet: Option<Address>,
    /// "Connect Wallet" or "Connected".
    pub connect_label: &'static str,
    /// "minted / max", once connected.
    pub supply_line: Option<String>,
    /// Whitelist membership line; hidden once sold out.
    pub whitelist_line: Option<String>,
    /// Which phase is live; hidden once sold out.
    pub phase_line: Option<String>,
    /// Evaluator status.
    pub status: StatusMessage,
    /// Evaluator status as text.
    pub status_text: String,
    /// Mint button label with the price attached.
    pub mint_label: String,
    /// Mint button is clickable.
    pub mint_enabled: bool,
    /// Current stepper value.
    pub quantity: u64,
    /// Stepper upper bound.
    pub max_quantity: u64,
    /// Stepper buttons are clickable.
    pub quantity_controls_enabled: bool,
    /// Red banners: per-wallet limits and sold-out notices.
    pub banners: Vec<String>,
    /// "Minting..." while a transaction is in flight.
    pub pending_line: Option<&'static str>,
    /// "Loading..." while the wallet connects.
    pub loading_line: Option<&'static str>,
    /// "Transaction Completed!" after a confirmed mint.
    pub success_line: Option<&'static str>,
}

/// Builds the panel description.
pub fn render(config: &MintConfig, input: &ViewInput<'_>) -> MintView {
    let eligibility = input.eligibility;
    let connected = input.wallet.is_some();
    let s = input.state;
    let sold_out = connected && s.is_sold_out();

    let price = if !connected {
        None
    } else if eligibility.can_whitelist_mint {
        Some(whitelist_payment(config))
    } else if s.public_active {
        public_payment(config, eligibility.quantity).ok()
    } else if s.whitelist_active {
        Some(whitelist_payment(config))
    } else {
        None
    };
    let mint_label = match price {
        Some(price) => format!("Mint / {}", price),
        None => "Mint".to_string(),
    };

    let whitelist_line = (connected && !sold_out).then(|| {
        if input.membership_verified {
            "You are Whitelisted".to_string()
        } else {
            "You are not Whitelisted".to_string()
        }
    });

    let phase_line = (connected && !sold_out).then(|| {
        match (s.whitelist_active, s.public_active) {
            (true, true) => "Whitelist and Public Mint are Live",
            (true, false) => "Whitelist Mint is Live",
            (false, true) => "Public Mint is Live",
            (false, false) => "Mint is not Live",
        }
        .to_string()
    });

    MintView {
        wallet: input.wallet,
        connect_label: if connected { "Connected" } else { "Connect Wallet" },
        supply_line: connected.then(|| format!("{} / {}", s.total_supply, s.max_supply)),
        whitelist_line,
        phase_line,
        status: eligibility.status,
        status_text: eligibility.status.to_string(),
        mint_label,
        mint_enabled: eligibility.can_mint() && !input.pending,
        quantity: eligibility.quantity,
        max_quantity: eligibility.max_quantity,
        quantity_controls_enabled: connected
            && s.public_active
            && !eligibility.can_whitelist_mint
            && !sold_out
            && !input.pending,
        banners: if connected {
            banners(config, s)
        } else {
            Vec::new()
        },
        pending_line: input.pending.then_some("Minting..."),
        loading_line: input.connecting.then_some("Loading..."),
        success_line: (connected && input.completed && !input.pending)
            .then_some("Transaction Completed!"),
    }
}

fn banners(config: &MintConfig, s: &MintPhaseState) -> Vec<String> {
    let mut out = Vec::new();
    if s.whitelist_active && s.wallet_whitelist_minted >= config.whitelist_wallet_cap {
        out.push("Your Whitelist Mint Limit Exceeded");
    }
    if s.public_active && s.wallet_public_minted >= config.public_wallet_cap {
        out.push("Your Public Mint Limit Exceeded");
    }
    if s.is_between_phases() && s.wallet_whitelist_minted >= config.whitelist_wallet_cap {
        out.push("You have already minted from this phase");
    }
    if s.whitelist_phase_minted >= s.whitelist_phase_cap {
        out.push("Whitelist Supply Sold Out");
    }
    if s.public_phase_minted >= s.public_phase_cap {
        out.push("Public Supply Sold Out");
    }
    if s.is_sold_out() {
        out.push("We're Sold Out");
    }
    out.into_iter().map(String::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mint::eligibility::{evaluate, EligibilityInput};

    fn view_for(state: &MintPhaseState, member: bool, quantity: u64, pending: bool) -> MintView {
        let config = MintConfig::default();
        let eligibility = evaluate(
            &config,
            &EligibilityInput {
                connected: true,
                state,
                membership_verified: member,
                quantity,
            },
        );
        render(
            &config,
            &ViewInput {
                wallet: Some(Address::new([1; 20])),
                state,
                membership_verified: member,
                eligibility: &eligibility,
                pending,
                connecting: false,
                completed: false,
            },
        )
    }

    fn open_state(whitelist: bool, public: bool) -> MintPhaseState {
        MintPhaseState {
            whitelist_active: whitelist,
            public_active: public,
            max_supply: 8888,
            whitelist_phase_cap: 1111,
            public_phase_cap: 7777,
            ..Default::default()
        }
    }

    #[test]
    fn test_disconnected_view() {
        let config = MintConfig::default();
        let state = MintPhaseState::default();
        let eligibility = evaluate(
            &config,
            &EligibilityInput {
                connected: false,
                state: &state,
                membership_verified: false,
                quantity: 1,
            },
        );
        let view = render(
            &config,
            &ViewInput {
                wallet: None,
                state: &state,
                membership_verified: false,
                eligibility: &eligibility,
                pending: false,
                connecting: true,
                completed: true,
            },
        );
        assert_eq!(view.connect_label, "Connect Wallet");
        assert_eq!(view.mint_label, "Mint");
        assert!(!view.mint_enabled);
        assert!(view.supply_line.is_none());
        assert!(view.banners.is_empty());
        assert_eq!(view.loading_line, Some("Loading..."));
        assert_eq!(view.success_line, None);
    }

    #[test]
    fn test_completed_mint_line() {
        let config = MintConfig::default();
        let state = MintPhaseState {
            total_supply: 1,
            public_phase_minted: 1,
            wallet_public_minted: 1,
            ..open_state(false, true)
        };
        let eligibility = evaluate(
            &config,
            &EligibilityInput {
                connected: true,
                state: &state,
                membership_verified: false,
                quantity: 1,
            },
        );
        let input = ViewInput {
            wallet: Some(Address::new([1; 20])),
            state: &state,
            membership_verified: false,
            eligibility: &eligibility,
            pending: false,
            connecting: false,
            completed: true,
        };
        let view = render(&config, &input);
        assert_eq!(view.success_line, Some("Transaction Completed!"));
        assert_eq!(view.loading_line, None);

        let view = render(&config, &ViewInput { pending: true, ..input });
        assert_eq!(view.success_line, None);
        assert_eq!(view.pending_line, Some("Minting..."));
    }

    #[test]
    fn test_whitelist_view() {
        let view = view_for(&open_state(true, false), true, 1, false);
        assert_eq!(view.mint_label, "Mint / 0.005 ETH");
        assert!(view.mint_enabled);
        assert!(!view.quantity_controls_enabled);
        assert_eq!(view.whitelist_line.as_deref(), Some("You are Whitelisted"));
        assert_eq!(view.phase_line.as_deref(), Some("Whitelist Mint is Live"));
        assert_eq!(view.supply_line.as_deref(), Some("0 / 8888"));
    }

    #[test]
    fn test_public_view_prices_quantity() {
        let view = view_for(&open_state(false, true), false, 3, false);
        assert_eq!(view.mint_label, "Mint / 0.03 ETH");
        assert!(view.quantity_controls_enabled);
        assert_eq!(view.max_quantity, 10);
    }

    #[test]
    fn test_pending_disables_controls() {
        let view = view_for(&open_state(false, true), false, 1, true);
        assert!(!view.mint_enabled);
        assert!(!view.quantity_controls_enabled);
        assert_eq!(view.pending_line, Some("Minting..."));
    }

    #[test]
    fn test_sold_out_view() {
        let state = MintPhaseState {
            total_supply: 8888,
            public_phase_minted: 7777,
            whitelist_phase_minted: 1111,
            ..open_state(false, true)
        };
        let view = view_for(&state, true, 1, false);
        assert!(!view.mint_enabled);
        assert!(view.whitelist_line.is_none());
        assert!(view.phase_line.is_none());
        assert_eq!(
            view.banners,
            vec![
                "Whitelist Supply Sold Out",
                "Public Supply Sold Out",
                "We're Sold Out"
            ]
        );
    }

    #[test]
    fn test_limit_banners() {
        let state = MintPhaseState {
            wallet_public_minted: 10,
            ..open_state(false, true)
        };
        let view = view_for(&state, false, 1, false);
        assert_eq!(view.banners, vec!["Your Public Mint Limit Exceeded"]);

        let between = MintPhaseState {
            wallet_whitelist_minted: 1,
            ..open_state(false, false)
        };
        let view = view_for(&between, true, 1, false);
        assert_eq!(view.banners, vec!["You have already minted from this phase"]);
    }
}
