//! # Mint Session
//!
//! The one place mint-page state lives: the connected wallet, its proof,
//! the latest contract snapshot, the stepper quantity, and whether a mint
//! is in flight.
//!
//! Methods take `&self` so the session can be shared behind an `Arc` by a
//! UI event loop. The snapshot lock is never held across an `.await`; port
//! calls work on a cloned [`Connection`] and write back afterwards.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::MintConfig;
use crate::crypto::leaf_hash;
use crate::ports::{MintContract, MintReceipt, WalletProvider};
use crate::types::Address;
use crate::whitelist::{InclusionProof, MembershipSet, MerkleTree};

use super::eligibility::{
    clamp_quantity, evaluate, max_public_quantity, validate_quantity, Eligibility,
    EligibilityInput,
};
use super::error::MintError;
use super::state::MintPhaseState;
use super::submitter::TransactionSubmitter;
use super::view::{render, MintView, ViewInput};

/// Everything learned while connecting one wallet.
#[derive(Clone)]
struct Connection {
    wallet: Address,
    provider: String,
    contract: Arc<dyn MintContract>,
    proof: InclusionProof,
    membership_verified: bool,
    state: MintPhaseState,
}

struct SessionState {
    connection: Option<Connection>,
    quantity: u64,
    /// The last mint from this session confirmed.
    completed: bool,
}

/// Clears a busy flag when the owning future finishes or is dropped.
struct FlagGuard<'a>(&'a AtomicBool);

impl<'a> FlagGuard<'a> {
    /// Sets the flag, or returns `None` if it was already set.
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }

    /// Sets the flag unconditionally.
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self(flag)
    }
}

impl Drop for FlagGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Which entry point a mint went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MintPath {
    Whitelist,
    Public,
}

/// Mint-page state for one user.
pub struct MintSession {
    config: MintConfig,
    tree: MerkleTree,
    inner: Mutex<SessionState>,
    pending: AtomicBool,
    connecting: AtomicBool,
}

impl MintSession {
    /// Builds the Merkle tree over `membership`. Disconnected, quantity 1.
    pub fn new(config: MintConfig, membership: &MembershipSet) -> Self {
        let tree = MerkleTree::build(membership);
        tracing::info!(
            members = tree.leaf_count(),
            root = %crate::types::hex_encode(tree.root()),
            "mint session ready"
        );
        Self {
            config,
            tree,
            inner: Mutex::new(SessionState {
                connection: None,
                quantity: 1,
                completed: false,
            }),
            pending: AtomicBool::new(false),
            connecting: AtomicBool::new(false),
        }
    }

    /// Collection parameters this session evaluates against.
    pub fn config(&self) -> &MintConfig {
        &self.config
    }

    /// The whitelist tree.
    pub fn tree(&self) -> &MerkleTree {
        &self.tree
    }

    /// Connected account, if any.
    pub fn wallet(&self) -> Option<Address> {
        self.inner.lock().connection.as_ref().map(|c| c.wallet)
    }

    /// Whether the contract accepted the connected wallet's proof.
    pub fn membership_verified(&self) -> bool {
        self.inner
            .lock()
            .connection
            .as_ref()
            .is_some_and(|c| c.membership_verified)
    }

    /// Latest snapshot, if connected.
    pub fn state(&self) -> Option<MintPhaseState> {
        self.inner.lock().connection.as_ref().map(|c| c.state)
    }

    /// A mint is in flight.
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// A wallet connection is being established.
    pub fn is_connecting(&self) -> bool {
        self.connecting.load(Ordering::Acquire)
    }

    /// Current stepper value.
    pub fn quantity(&self) -> u64 {
        self.inner.lock().quantity
    }

    /// Connects `provider`'s account and reads its mint state.
    ///
    /// Membership comes from the contract's own `isValidWhiteList` check on
    /// the locally built proof. A disagreement with local verification
    /// means the embedded list and the deployed root have drifted; it is
    /// logged and the contract's answer wins.
    ///
    /// # Errors
    ///
    /// - [`MintError::NoWalletProvider`] when `provider` is `None`.
    /// - [`MintError::Wallet`] when the user refuses the connection.
    /// - [`MintError::Read`] when the membership or state reads fail. A
    ///   failing root getter is logged and skipped.
    pub async fn connect(
        &self,
        provider: Option<Arc<dyn WalletProvider>>,
        contract: Arc<dyn MintContract>,
    ) -> Result<Eligibility, MintError> {
        let Some(provider) = provider else {
            tracing::warn!("no wallet provider available");
            return Err(MintError::NoWalletProvider);
        };
        let _connecting = FlagGuard::raise(&self.connecting);
        let wallet = provider.address().await.map_err(|e| {
            tracing::warn!(provider = provider.name(), error = %e, "wallet connection refused");
            MintError::from(e)
        })?;

        // The root getter is optional; it only feeds the drift warning.
        match contract.merkle_root().await {
            Ok(Some(root)) if root != self.tree.root() => {
                tracing::warn!(
                    contract_root = %crate::types::hex_encode(root),
                    local_root = %crate::types::hex_encode(self.tree.root()),
                    "whitelist root does not match the contract"
                );
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, "could not read the contract's whitelist root");
            }
        }

        let proof = self.tree.proof(&wallet);
        let membership_verified = contract
            .is_valid_whitelist(&proof, leaf_hash(&wallet))
            .await
            .map_err(MintError::Read)?;
        let locally_verified = self.tree.verify(&wallet, &proof);
        if locally_verified != membership_verified {
            tracing::warn!(
                %wallet,
                contract = membership_verified,
                local = locally_verified,
                "whitelist verification disagrees with the contract"
            );
        }

        let state = MintPhaseState::fetch(contract.as_ref(), wallet, &self.config)
            .await
            .map_err(MintError::Read)?;

        tracing::info!(
            %wallet,
            contract = %contract.address(),
            provider = provider.name(),
            membership_verified,
            proof_len = proof.len(),
            "wallet connected"
        );

        let mut inner = self.inner.lock();
        inner.quantity = clamp_quantity(inner.quantity, max_public_quantity(&self.config, &state));
        inner.completed = false;
        inner.connection = Some(Connection {
            wallet,
            provider: provider.name().to_string(),
            contract,
            proof,
            membership_verified,
            state,
        });
        Ok(self.evaluate_locked(&inner))
    }

    /// Forgets the connected wallet.
    pub fn disconnect(&self) {
        let mut inner = self.inner.lock();
        if let Some(conn) = inner.connection.take() {
            tracing::info!(wallet = %conn.wallet, provider = %conn.provider, "wallet disconnected");
        }
        inner.quantity = 1;
        inner.completed = false;
    }

    /// Re-reads the snapshot from the contract.
    ///
    /// The stepper quantity is left as is; an out-of-range value shows up
    /// as a status rather than being silently changed.
    pub async fn refresh(&self) -> Result<Eligibility, MintError> {
        let conn = self.connection()?;
        let state = MintPhaseState::fetch(conn.contract.as_ref(), conn.wallet, &self.config)
            .await
            .map_err(|e| {
                tracing::warn!(wallet = %conn.wallet, error = %e, "refresh failed");
                MintError::Read(e)
            })?;

        let mut inner = self.inner.lock();
        if let Some(current) = inner.connection.as_mut() {
            // A reconnect may have raced the read.
            if current.wallet == conn.wallet {
                current.state = state;
            }
        }
        Ok(self.evaluate_locked(&inner))
    }

    /// Evaluates the current snapshot and quantity.
    pub fn eligibility(&self) -> Eligibility {
        let inner = self.inner.lock();
        self.evaluate_locked(&inner)
    }

    /// Steps the quantity up, stopping at the wallet's remaining allowance.
    pub fn increment_quantity(&self) -> u64 {
        let mut inner = self.inner.lock();
        let max = self.max_quantity_locked(&inner);
        inner.quantity = clamp_quantity(inner.quantity.saturating_add(1), max);
        inner.quantity
    }

    /// Steps the quantity down, stopping at 1.
    pub fn decrement_quantity(&self) -> u64 {
        let mut inner = self.inner.lock();
        let max = self.max_quantity_locked(&inner);
        inner.quantity = clamp_quantity(inner.quantity.saturating_sub(1), max);
        inner.quantity
    }

    /// Sets the quantity directly.
    ///
    /// # Errors
    ///
    /// [`MintError::InvalidQuantity`] outside `1..=remaining allowance`; the
    /// stored quantity is unchanged.
    pub fn set_quantity(&self, quantity: u64) -> Result<u64, MintError> {
        let mut inner = self.inner.lock();
        let max = self.max_quantity_locked(&inner);
        inner.quantity = validate_quantity(quantity, max)?;
        Ok(inner.quantity)
    }

    /// Mints through whichever path the current snapshot allows.
    ///
    /// The whitelist path wins when both are open. The snapshot is
    /// re-read after every submission, successful or not.
    ///
    /// # Errors
    ///
    /// - [`MintError::MintInFlight`] while another mint is pending.
    /// - [`MintError::NotConnected`] without a wallet.
    /// - [`MintError::NotEligible`] when neither path is open.
    /// - [`MintError::StaleState`] when the transaction was refused and the
    ///   re-read shows the mint is no longer possible.
    /// - Anything [`TransactionSubmitter`] returns otherwise.
    pub async fn mint(&self) -> Result<MintReceipt, MintError> {
        let _pending = FlagGuard::acquire(&self.pending).ok_or_else(|| {
            tracing::debug!("mint refused: already pending");
            MintError::MintInFlight
        })?;

        let (conn, quantity) = {
            let mut inner = self.inner.lock();
            let conn = inner.connection.clone().ok_or(MintError::NotConnected)?;
            inner.completed = false;
            (conn, inner.quantity)
        };
        let eligibility = evaluate(
            &self.config,
            &EligibilityInput {
                connected: true,
                state: &conn.state,
                membership_verified: conn.membership_verified,
                quantity,
            },
        );

        let submitter = TransactionSubmitter::new(conn.contract.as_ref(), &self.config);
        let (path, outcome) = if eligibility.can_whitelist_mint {
            let outcome = submitter
                .submit_whitelist_mint(&conn.state, conn.membership_verified, &conn.proof)
                .await;
            (MintPath::Whitelist, outcome)
        } else if eligibility.can_public_mint {
            (
                MintPath::Public,
                submitter.submit_public_mint(&conn.state, quantity).await,
            )
        } else {
            tracing::info!(wallet = %conn.wallet, status = ?eligibility.status, "mint not available");
            return Err(MintError::NotEligible(eligibility.status));
        };

        let refreshed = self.refresh().await;
        match outcome {
            Ok(receipt) => {
                if let Err(e) = refreshed {
                    tracing::warn!(error = %e, "mint confirmed but state refresh failed");
                }
                let mut inner = self.inner.lock();
                inner.completed = true;
                if path == MintPath::Public {
                    let max = self.max_quantity_locked(&inner);
                    inner.quantity = clamp_quantity(inner.quantity, max);
                }
                Ok(receipt)
            }
            Err(MintError::TransactionRejected { reason }) => match refreshed {
                Ok(after) if !still_open(path, &after) => {
                    tracing::warn!(status = ?after.status, %reason, "mint state moved before the transaction landed");
                    Err(MintError::StaleState {
                        status: after.status,
                        reason,
                    })
                }
                _ => Err(MintError::TransactionRejected { reason }),
            },
            Err(other) => Err(other),
        }
    }

    /// Display model for the current state.
    pub fn view(&self) -> MintView {
        let inner = self.inner.lock();
        let eligibility = self.evaluate_locked(&inner);
        let default_state = MintPhaseState::default();
        let conn = inner.connection.as_ref();
        render(
            &self.config,
            &ViewInput {
                wallet: conn.map(|c| c.wallet),
                state: conn.map_or(&default_state, |c| &c.state),
                membership_verified: conn.is_some_and(|c| c.membership_verified),
                eligibility: &eligibility,
                pending: self.is_pending(),
                connecting: self.is_connecting(),
                completed: inner.completed,
            },
        )
    }

    /// Proof for the connected wallet; empty when it is not a member.
    pub fn proof(&self) -> Option<InclusionProof> {
        self.inner
            .lock()
            .connection
            .as_ref()
            .map(|c| c.proof.clone())
    }

    fn connection(&self) -> Result<Connection, MintError> {
        self.inner
            .lock()
            .connection
            .clone()
            .ok_or(MintError::NotConnected)
    }

    fn evaluate_locked(&self, inner: &SessionState) -> Eligibility {
        let default_state = MintPhaseState::default();
        let conn = inner.connection.as_ref();
        evaluate(
            &self.config,
            &EligibilityInput {
                connected: conn.is_some(),
                state: conn.map_or(&default_state, |c| &c.state),
                membership_verified: conn.is_some_and(|c| c.membership_verified),
                quantity: inner.quantity,
            },
        )
    }

    fn max_quantity_locked(&self, inner: &SessionState) -> u64 {
        let state = inner
            .connection
            .as_ref()
            .map(|c| c.state)
            .unwrap_or_default();
        max_public_quantity(&self.config, &state)
    }
}

fn still_open(path: MintPath, after: &Eligibility) -> bool {
    match path {
        MintPath::Whitelist => after.can_whitelist_mint,
        MintPath::Public => after.can_public_mint,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{SimulatedChain, StaticWallet};
    use crate::mint::StatusMessage;

    fn members() -> (MembershipSet, Vec<Address>) {
        let addrs: Vec<Address> = (1u8..=5).map(|i| Address::new([i; 20])).collect();
        (MembershipSet::new(addrs.clone()).unwrap(), addrs)
    }

    fn wallet(addr: Address) -> Option<Arc<dyn WalletProvider>> {
        Some(Arc::new(StaticWallet::new(addr)))
    }

    #[tokio::test]
    async fn test_quantity_stepper_bounds() {
        let (set, addrs) = members();
        let session = MintSession::new(MintConfig::default(), &set);
        let chain = SimulatedChain::new(session.config(), session.tree().root());
        chain.set_phases(false, true);
        session
            .connect(wallet(addrs[0]), Arc::new(chain.contract_for(addrs[0])))
            .await
            .unwrap();

        assert_eq!(session.decrement_quantity(), 1);
        for _ in 0..20 {
            session.increment_quantity();
        }
        assert_eq!(session.quantity(), 10);
        assert_eq!(session.set_quantity(4).unwrap(), 4);
        assert!(matches!(
            session.set_quantity(11),
            Err(MintError::InvalidQuantity { requested: 11, max: 10 })
        ));
        assert_eq!(session.quantity(), 4);
    }

    #[tokio::test]
    async fn test_disconnected_session() {
        let (set, _) = members();
        let session = MintSession::new(MintConfig::default(), &set);
        assert_eq!(session.eligibility().status, StatusMessage::NotConnected);
        assert_eq!(session.mint().await, Err(MintError::NotConnected));
        assert!(!session.is_pending());
        assert_eq!(session.refresh().await, Err(MintError::NotConnected));
    }

    #[tokio::test]
    async fn test_not_eligible_between_phases() {
        let (set, addrs) = members();
        let session = MintSession::new(MintConfig::default(), &set);
        let chain = SimulatedChain::new(session.config(), session.tree().root());
        session
            .connect(wallet(addrs[1]), Arc::new(chain.contract_for(addrs[1])))
            .await
            .unwrap();
        assert_eq!(
            session.mint().await,
            Err(MintError::NotEligible(StatusMessage::AwaitingNextPhase))
        );
    }

    #[test]
    fn test_flag_guard_releases() {
        let flag = AtomicBool::new(false);
        {
            let _guard = FlagGuard::acquire(&flag).unwrap();
            assert!(FlagGuard::acquire(&flag).is_none());
        }
        assert!(!flag.load(Ordering::Acquire));
        {
            let _guard = FlagGuard::raise(&flag);
            assert!(flag.load(Ordering::Acquire));
        }
        assert!(!flag.load(Ordering::Acquire));
    }

    #[tokio::test]
    async fn test_disconnect_resets_session() {
        let (set, addrs) = members();
        let session = MintSession::new(MintConfig::default(), &set);
        let chain = SimulatedChain::new(session.config(), session.tree().root());
        chain.set_phases(false, true);
        session
            .connect(wallet(addrs[2]), Arc::new(chain.contract_for(addrs[2])))
            .await
            .unwrap();
        session.set_quantity(5).unwrap();
        session.mint().await.unwrap();
        assert!(session.view().success_line.is_some());

        session.disconnect();
        assert_eq!(session.eligibility().status, StatusMessage::NotConnected);
        assert_eq!(session.quantity(), 1);
        assert_eq!(session.wallet(), None);
        assert!(session.state().is_none());
        assert!(session.view().success_line.is_none());
        assert_eq!(session.mint().await, Err(MintError::NotConnected));
        assert_eq!(chain.state().public_minted, 5);
    }

    /// A wallet that takes its time answering the connection prompt.
    struct SlowWallet(Address);

    #[async_trait::async_trait]
    impl WalletProvider for SlowWallet {
        fn name(&self) -> &str {
            "slow"
        }

        async fn address(&self) -> Result<Address, crate::ports::WalletError> {
            tokio::time::sleep(std::time::Duration::from_secs(3)).await;
            Ok(self.0)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_connecting_flag_shows_loading() {
        let (set, addrs) = members();
        let session = Arc::new(MintSession::new(MintConfig::default(), &set));
        let chain = SimulatedChain::new(session.config(), session.tree().root());
        let contract: Arc<dyn MintContract> = Arc::new(chain.contract_for(addrs[0]));

        let task = {
            let session = Arc::clone(&session);
            tokio::spawn(async move {
                let provider: Arc<dyn WalletProvider> = Arc::new(SlowWallet(addrs[0]));
                session.connect(Some(provider), contract).await
            })
        };
        while !session.is_connecting() {
            tokio::task::yield_now().await;
        }
        assert_eq!(session.view().loading_line, Some("Loading..."));

        task.await.unwrap().unwrap();
        assert!(!session.is_connecting());
        assert_eq!(session.view().loading_line, None);
    }
}
