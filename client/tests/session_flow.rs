//! Integration tests for the mint session against the simulated contract.
//!
//! Each test deploys its own chain and drives the session the way the mint
//! page would: connect, read the view, press mint, read the view again.

use std::sync::Arc;
use std::time::Duration;

use fifthdim_client::adapters::{SimulatedChain, StaticWallet};
use fifthdim_client::config::MintConfig;
use fifthdim_client::mint::{MintError, MintSession, StatusMessage};
use fifthdim_client::ports::{ContractError, MintContract, WalletError, WalletProvider};
use fifthdim_client::types::Address;
use fifthdim_client::whitelist::MembershipSet;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn member(i: u8) -> Address {
    Address::new([i; 20])
}

fn outsider() -> Address {
    Address::new([0xee; 20])
}

/// A session over seven members and a fresh chain deployed with the same
/// root.
fn setup() -> (Arc<MintSession>, SimulatedChain) {
    let set = MembershipSet::new((1u8..=7).map(member).collect()).expect("members");
    let session = MintSession::new(MintConfig::default(), &set);
    let chain = SimulatedChain::new(session.config(), session.tree().root());
    (Arc::new(session), chain)
}

async fn connect(session: &MintSession, chain: &SimulatedChain, who: Address) {
    let provider: Arc<dyn WalletProvider> = Arc::new(StaticWallet::new(who));
    let contract: Arc<dyn MintContract> = Arc::new(chain.contract_for(who));
    session
        .connect(Some(provider), contract)
        .await
        .expect("connect");
}

// ---------------------------------------------------------------------------
// Connecting
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_no_wallet_provider() {
    let (session, chain) = setup();
    let contract: Arc<dyn MintContract> = Arc::new(chain.contract_for(member(1)));
    let err = session.connect(None, contract).await.unwrap_err();
    assert_eq!(err, MintError::NoWalletProvider);
    assert!(session.wallet().is_none());
    assert_eq!(session.view().connect_label, "Connect Wallet");
}

#[tokio::test]
async fn test_wallet_refuses_connection() {
    let (session, chain) = setup();
    let provider: Arc<dyn WalletProvider> = Arc::new(StaticWallet::rejecting());
    let contract: Arc<dyn MintContract> = Arc::new(chain.contract_for(member(1)));
    let err = session.connect(Some(provider), contract).await.unwrap_err();
    assert_eq!(err, MintError::Wallet(WalletError::Rejected));
    assert_eq!(session.eligibility().status, StatusMessage::NotConnected);
}

#[tokio::test]
async fn test_embedded_whitelist_member_is_verified() {
    let set = MembershipSet::embedded().expect("embedded whitelist");
    let first = set.members()[0];
    let session = MintSession::new(MintConfig::default(), &set);
    let chain = SimulatedChain::new(session.config(), session.tree().root());
    chain.set_phases(true, false);

    connect(&session, &chain, first).await;
    assert!(session.membership_verified());
    assert_eq!(session.eligibility().status, StatusMessage::WhitelistReady);
}

#[tokio::test]
async fn test_root_drift_follows_contract() {
    let (session, _) = setup();
    let drifted = SimulatedChain::new(session.config(), [0x55; 32]);
    drifted.set_phases(true, false);

    connect(&session, &drifted, member(2)).await;
    assert!(!session.membership_verified());
    assert_eq!(session.eligibility().status, StatusMessage::NotWhitelisted);
}

// ---------------------------------------------------------------------------
// Minting
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_connect_survives_failing_root_getter() {
    let (session, chain) = setup();
    chain.set_phases(true, false);
    chain.fail_root_reads(ContractError::Read("execution reverted: no getter".into()));

    connect(&session, &chain, member(2)).await;
    assert!(session.membership_verified());
    assert_eq!(session.eligibility().status, StatusMessage::WhitelistReady);
    assert_eq!(session.view().connect_label, "Connected");
}

#[tokio::test]
async fn test_whitelist_mint_then_used() {
    let (session, chain) = setup();
    chain.set_phases(true, false);
    connect(&session, &chain, member(3)).await;

    let view = session.view();
    assert_eq!(view.mint_label, "Mint / 0.005 ETH");
    assert!(view.mint_enabled);

    let receipt = session.mint().await.expect("whitelist mint");
    assert_eq!(receipt.quantity, 1);
    assert_eq!(chain.state().whitelist_minted, 1);

    let after = session.eligibility();
    assert_eq!(after.status, StatusMessage::WhitelistUsed);
    assert!(!after.can_mint());
    assert_eq!(session.state().map(|s| s.total_supply), Some(1));
    assert_eq!(
        session.mint().await,
        Err(MintError::NotEligible(StatusMessage::WhitelistUsed))
    );
}

#[tokio::test]
async fn test_non_member_cannot_whitelist_mint() {
    let (session, chain) = setup();
    chain.set_phases(true, false);
    connect(&session, &chain, outsider()).await;

    assert!(session.proof().is_some_and(|p| p.is_empty()));
    assert_eq!(session.eligibility().status, StatusMessage::NotWhitelisted);
    assert_eq!(
        session.mint().await,
        Err(MintError::NotEligible(StatusMessage::NotWhitelisted))
    );
    assert_eq!(chain.state().nonce, 0);
}

#[tokio::test]
async fn test_public_mint_with_quantity() {
    let (session, chain) = setup();
    chain.set_phases(false, true);
    connect(&session, &chain, outsider()).await;

    session.set_quantity(4).expect("quantity");
    assert_eq!(session.view().mint_label, "Mint / 0.04 ETH");
    let receipt = session.mint().await.expect("public mint");
    assert_eq!(receipt.quantity, 4);
    assert_eq!(receipt.paid.format_ether(), "0.04 ETH");
    assert_eq!(session.view().success_line, Some("Transaction Completed!"));

    // Six left in the allowance; the stepper stays where it was.
    assert_eq!(session.view().max_quantity, 6);
    assert_eq!(session.quantity(), 4);
    assert!(matches!(
        session.set_quantity(7),
        Err(MintError::InvalidQuantity { requested: 7, max: 6 })
    ));
}

#[tokio::test]
async fn test_public_allowance_exhausted() {
    let (session, chain) = setup();
    chain.set_phases(false, true);
    chain.update(|s| {
        s.minted_public.insert(outsider(), 10);
    });
    connect(&session, &chain, outsider()).await;

    let view = session.view();
    assert_eq!(view.status, StatusMessage::PublicLimitReached);
    assert!(!view.mint_enabled);
    assert!(view
        .banners
        .iter()
        .any(|b| b == "Your Public Mint Limit Exceeded"));
}

#[tokio::test]
async fn test_rejection_leaves_state_unchanged() {
    let (session, chain) = setup();
    chain.set_phases(false, true);
    connect(&session, &chain, outsider()).await;
    let before = session.state();

    chain.reject_next(ContractError::Rejected(
        "MetaMask Tx Signature: User denied transaction signature.".into(),
    ));
    let err = session.mint().await.unwrap_err();
    assert_eq!(
        err,
        MintError::TransactionRejected {
            reason: "MetaMask Tx Signature: User denied transaction signature.".into()
        }
    );
    assert_eq!(session.state(), before);
    assert_eq!(chain.state().total_supply, 0);
    assert!(!session.is_pending());

    // The next attempt goes through.
    session.mint().await.expect("retry");
}

#[tokio::test]
async fn test_sold_out_mid_flight_is_stale() {
    let (session, chain) = setup();
    chain.set_phases(false, true);
    connect(&session, &chain, outsider()).await;
    assert!(session.eligibility().can_public_mint);

    // Someone else mints the last units after our snapshot was taken.
    chain.update(|s| s.total_supply = s.max_supply);

    let err = session.mint().await.unwrap_err();
    assert!(matches!(
        err,
        MintError::StaleState {
            status: StatusMessage::SoldOut,
            ..
        }
    ));
    let view = session.view();
    assert_eq!(view.status, StatusMessage::SoldOut);
    assert!(view.phase_line.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_second_mint_while_pending() {
    let (session, chain) = setup();
    chain.set_phases(false, true);
    connect(&session, &chain, outsider()).await;
    chain.set_confirmation_delay(Duration::from_secs(5));

    let first = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.mint().await })
    };
    while !session.is_pending() {
        tokio::task::yield_now().await;
    }
    assert_eq!(session.mint().await, Err(MintError::MintInFlight));
    assert!(!session.view().mint_enabled);

    let receipt = first.await.expect("join").expect("first mint");
    assert_eq!(receipt.quantity, 1);
    assert!(!session.is_pending());
    assert_eq!(chain.state().public_minted, 1);
}

#[tokio::test(start_paused = true)]
async fn test_confirmation_timeout_refreshes_state() {
    let (session, chain) = setup();
    chain.set_phases(false, true);
    connect(&session, &chain, outsider()).await;
    chain.set_confirmation_delay(Duration::from_secs(300));

    let minting = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.mint().await })
    };
    // Another buyer's mint lands while ours is still in the mempool.
    tokio::time::sleep(Duration::from_secs(10)).await;
    chain.update(|s| {
        s.total_supply += 5;
        s.public_minted += 5;
    });

    let err = minting.await.expect("join").unwrap_err();
    assert!(matches!(
        err,
        MintError::ConfirmationTimeout { timeout_secs: 120, .. }
    ));
    assert!(!session.is_pending());
    assert_eq!(session.view().success_line, None);

    let state = session.state().expect("connected");
    assert_eq!(state.total_supply, 5);
    assert_eq!(state.public_phase_minted, 5);
    assert_eq!(state.wallet_public_minted, 0);
    assert_eq!(session.view().supply_line.as_deref(), Some("5 / 8888"));

    // The abandoned transaction still confirms; the next read picks it up.
    tokio::time::advance(Duration::from_secs(200)).await;
    session.refresh().await.expect("refresh");
    let state = session.state().expect("connected");
    assert_eq!(state.total_supply, 6);
    assert_eq!(state.wallet_public_minted, 1);
}
