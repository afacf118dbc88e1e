//! # Simulated Collection Contract
//!
//! An in-process stand-in for the deployed contract. It enforces the same
//! caps, prices, and proof check the real one does, so the session can be
//! driven end to end without a node: in tests, in the benchmark, and in the
//! CLI's local mode (where the state is persisted to a JSON file between
//! invocations).
//!
//! Transactions are applied when they are *mined*, i.e. inside
//! [`PendingMint::wait`], not when they are submitted. That leaves a window
//! in which tests can change the state underneath a pending mint, which is
//! exactly how a real mint goes stale. A transaction whose waiter gives up
//! (a confirmation timeout) is not lost: it stays queued and is mined by
//! the first read after its delay, the way a slow transaction still lands.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::config::MintConfig;
use crate::crypto::{keccak256_multi, leaf_hash};
use crate::ports::{ContractError, MintContract, MintReceipt, PendingMint};
use crate::types::{hash32_hex, Address, Hash32, TxHash, Wei};
use crate::whitelist::{verify_proof, InclusionProof};

// ---------------------------------------------------------------------------
// Chain state
// ---------------------------------------------------------------------------

/// Everything the contract stores, plus a block counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainState {
    /// Contract address reported by handles.
    pub contract_address: Address,
    /// Whitelist root the contract verifies against.
    #[serde(with = "hash32_hex")]
    pub merkle_root: Hash32,
    /// Whitelist phase flag.
    pub whitelist_active: bool,
    /// Public phase flag.
    pub public_active: bool,
    /// Collection cap.
    pub max_supply: u64,
    /// Whitelist phase allocation.
    pub whitelist_phase_cap: u64,
    /// Public phase allocation.
    pub public_phase_cap: u64,
    /// Per-wallet whitelist allowance.
    pub whitelist_wallet_cap: u64,
    /// Per-wallet public allowance.
    pub public_wallet_cap: u64,
    /// Whitelist unit price.
    pub whitelist_price: Wei,
    /// Public unit price.
    pub public_price: Wei,
    /// Units minted across phases.
    pub total_supply: u64,
    /// Units minted in the whitelist phase.
    pub whitelist_minted: u64,
    /// Units minted in the public phase.
    pub public_minted: u64,
    /// Whitelist mints per wallet.
    pub minted_whitelist: BTreeMap<Address, u64>,
    /// Public mints per wallet.
    pub minted_public: BTreeMap<Address, u64>,
    /// Height of the last mined block.
    pub block_number: u64,
    /// Transactions submitted so far; feeds the fake tx hashes.
    pub nonce: u64,
}

impl ChainState {
    /// A fresh deployment with both phases closed.
    pub fn new(config: &MintConfig, merkle_root: Hash32) -> Self {
        Self {
            contract_address: config.contract_address,
            merkle_root,
            whitelist_active: false,
            public_active: false,
            max_supply: config.max_supply,
            whitelist_phase_cap: config.whitelist_phase_cap,
            public_phase_cap: config.public_phase_cap,
            whitelist_wallet_cap: config.whitelist_wallet_cap,
            public_wallet_cap: config.public_wallet_cap,
            whitelist_price: config.whitelist_price,
            public_price: config.public_price,
            total_supply: 0,
            whitelist_minted: 0,
            public_minted: 0,
            minted_whitelist: BTreeMap::new(),
            minted_public: BTreeMap::new(),
            block_number: 0,
            nonce: 0,
        }
    }

    fn reverted(reason: &str) -> ContractError {
        ContractError::Reverted(reason.to_string())
    }

    fn within(count: u64, quantity: u64, cap: u64) -> bool {
        count.checked_add(quantity).is_some_and(|total| total <= cap)
    }

    fn required(price: Wei, quantity: u64) -> Result<Wei, ContractError> {
        price
            .checked_mul(quantity)
            .ok_or_else(|| Self::reverted("payment overflow"))
    }

    fn apply(&mut self, call: &MintCall, sender: Address) -> Result<u64, ContractError> {
        match call {
            MintCall::Whitelist {
                quantity,
                proof,
                value,
            } => {
                let quantity = *quantity;
                if !self.whitelist_active {
                    return Err(Self::reverted("Whitelist mint is not active"));
                }
                if !verify_proof(&self.merkle_root, &leaf_hash(&sender), proof) {
                    return Err(Self::reverted("Invalid merkle proof"));
                }
                let wallet = self.minted_whitelist.get(&sender).copied().unwrap_or(0);
                if !Self::within(wallet, quantity, self.whitelist_wallet_cap) {
                    return Err(Self::reverted("Whitelist wallet limit exceeded"));
                }
                if !Self::within(self.whitelist_minted, quantity, self.whitelist_phase_cap) {
                    return Err(Self::reverted("Whitelist supply exceeded"));
                }
                if !Self::within(self.total_supply, quantity, self.max_supply) {
                    return Err(Self::reverted("Max supply exceeded"));
                }
                if *value < Self::required(self.whitelist_price, quantity)? {
                    return Err(Self::reverted("Insufficient payment"));
                }
                self.whitelist_minted += quantity;
                self.total_supply += quantity;
                *self.minted_whitelist.entry(sender).or_insert(0) += quantity;
                Ok(quantity)
            }
            MintCall::Public { quantity, value } => {
                let quantity = *quantity;
                if !self.public_active {
                    return Err(Self::reverted("Public mint is not active"));
                }
                if quantity == 0 {
                    return Err(Self::reverted("Quantity must be positive"));
                }
                let wallet = self.minted_public.get(&sender).copied().unwrap_or(0);
                if !Self::within(wallet, quantity, self.public_wallet_cap) {
                    return Err(Self::reverted("Public wallet limit exceeded"));
                }
                if !Self::within(self.public_minted, quantity, self.public_phase_cap) {
                    return Err(Self::reverted("Public supply exceeded"));
                }
                if !Self::within(self.total_supply, quantity, self.max_supply) {
                    return Err(Self::reverted("Max supply exceeded"));
                }
                if *value < Self::required(self.public_price, quantity)? {
                    return Err(Self::reverted("Insufficient payment"));
                }
                self.public_minted += quantity;
                self.total_supply += quantity;
                *self.minted_public.entry(sender).or_insert(0) += quantity;
                Ok(quantity)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Chain handle
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Faults {
    reject_next: Option<ContractError>,
    root_read_error: Option<ContractError>,
    confirmation_delay: Duration,
}

/// A submitted transaction waiting to be mined.
#[derive(Debug)]
struct QueuedMint {
    tx_hash: TxHash,
    sender: Address,
    call: MintCall,
    ready_at: Instant,
    /// Nobody is waiting on it any more; it is mined by the first read
    /// after `ready_at`.
    abandoned: bool,
}

/// Shared handle to one simulated deployment. Cheap to clone.
#[derive(Debug, Clone)]
pub struct SimulatedChain {
    state: Arc<Mutex<ChainState>>,
    faults: Arc<Mutex<Faults>>,
    mempool: Arc<Mutex<Vec<QueuedMint>>>,
}

impl SimulatedChain {
    /// Deploys a fresh contract with the given whitelist root.
    pub fn new(config: &MintConfig, merkle_root: Hash32) -> Self {
        Self::from_state(ChainState::new(config, merkle_root))
    }

    /// Resumes from a saved state.
    pub fn from_state(state: ChainState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            faults: Arc::new(Mutex::new(Faults::default())),
            mempool: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A copy of the current state, after mining any abandoned
    /// transactions that are due.
    pub fn state(&self) -> ChainState {
        self.mine_abandoned();
        self.state.lock().clone()
    }

    /// Mutates the state directly, as the contract owner (or another
    /// minter) would.
    pub fn update<F: FnOnce(&mut ChainState)>(&self, f: F) {
        f(&mut self.state.lock());
    }

    /// Opens or closes the two phases.
    pub fn set_phases(&self, whitelist_active: bool, public_active: bool) {
        self.update(|s| {
            s.whitelist_active = whitelist_active;
            s.public_active = public_active;
        });
    }

    /// The next write fails at submission with `error`, e.g. a user
    /// cancelling the wallet prompt.
    pub fn reject_next(&self, error: ContractError) {
        self.faults.lock().reject_next = Some(error);
    }

    /// Every `merkle_root` read fails with `error`, like a deployment
    /// without the getter.
    pub fn fail_root_reads(&self, error: ContractError) {
        self.faults.lock().root_read_error = Some(error);
    }

    /// Delay between submission and mining.
    pub fn set_confirmation_delay(&self, delay: Duration) {
        self.faults.lock().confirmation_delay = delay;
    }

    /// A contract handle that signs as `signer`.
    pub fn contract_for(&self, signer: Address) -> SimulatedContract {
        SimulatedContract {
            chain: self.clone(),
            signer,
        }
    }

    fn submit(&self, sender: Address, call: MintCall) -> Result<Box<dyn PendingMint>, ContractError> {
        let delay = {
            let mut faults = self.faults.lock();
            if let Some(error) = faults.reject_next.take() {
                return Err(error);
            }
            faults.confirmation_delay
        };
        let tx_hash = {
            let mut state = self.state.lock();
            state.nonce += 1;
            TxHash(keccak256_multi(&[
                sender.as_bytes().as_slice(),
                &state.nonce.to_be_bytes()[..],
            ]))
        };
        let ready_at = Instant::now() + delay;
        self.mempool.lock().push(QueuedMint {
            tx_hash,
            sender,
            call,
            ready_at,
            abandoned: false,
        });
        Ok(Box::new(SimulatedPending {
            chain: self.clone(),
            tx_hash,
            ready_at,
            settled: false,
        }))
    }

    /// Takes `tx_hash` out of the mempool and executes it.
    fn mine(&self, tx_hash: TxHash) -> Result<MintReceipt, ContractError> {
        let queued = {
            let mut pool = self.mempool.lock();
            let index = pool
                .iter()
                .position(|q| q.tx_hash == tx_hash)
                .ok_or_else(|| ContractError::Read(format!("unknown transaction {}", tx_hash)))?;
            pool.remove(index)
        };
        self.execute(&queued)
    }

    fn execute(&self, queued: &QueuedMint) -> Result<MintReceipt, ContractError> {
        let mut state = self.state.lock();
        let quantity = state.apply(&queued.call, queued.sender)?;
        state.block_number += 1;
        Ok(MintReceipt {
            tx_hash: queued.tx_hash,
            quantity,
            paid: queued.call.value(),
            block_number: state.block_number,
        })
    }

    fn abandon(&self, tx_hash: TxHash) {
        if let Some(queued) = self
            .mempool
            .lock()
            .iter_mut()
            .find(|q| q.tx_hash == tx_hash)
        {
            queued.abandoned = true;
        }
    }

    /// Mines abandoned transactions whose delay has elapsed, in
    /// submission order.
    fn mine_abandoned(&self) {
        let due = {
            let mut pool = self.mempool.lock();
            if pool.is_empty() {
                return;
            }
            let now = Instant::now();
            let (due, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut *pool)
                .into_iter()
                .partition(|q| q.abandoned && q.ready_at <= now);
            *pool = waiting;
            due
        };
        for queued in &due {
            match self.execute(queued) {
                Ok(receipt) => tracing::debug!(
                    tx_hash = %queued.tx_hash,
                    block = receipt.block_number,
                    "abandoned transaction mined"
                ),
                Err(e) => tracing::debug!(
                    tx_hash = %queued.tx_hash,
                    error = %e,
                    "abandoned transaction reverted"
                ),
            }
        }
    }
}

#[derive(Debug, Clone)]
enum MintCall {
    Whitelist {
        quantity: u64,
        proof: InclusionProof,
        value: Wei,
    },
    Public {
        quantity: u64,
        value: Wei,
    },
}

impl MintCall {
    fn value(&self) -> Wei {
        match self {
            MintCall::Whitelist { value, .. } | MintCall::Public { value, .. } => *value,
        }
    }
}

/// Handle on a queued transaction. Dropping it before `wait` completes
/// leaves the transaction in the mempool; it still lands.
struct SimulatedPending {
    chain: SimulatedChain,
    tx_hash: TxHash,
    ready_at: Instant,
    settled: bool,
}

#[async_trait]
impl PendingMint for SimulatedPending {
    fn tx_hash(&self) -> TxHash {
        self.tx_hash
    }

    async fn wait(&mut self) -> Result<MintReceipt, ContractError> {
        if self.ready_at > Instant::now() {
            tokio::time::sleep_until(self.ready_at).await;
        }
        self.settled = true;
        self.chain.mine(self.tx_hash)
    }
}

impl Drop for SimulatedPending {
    fn drop(&mut self) {
        if !self.settled {
            self.chain.abandon(self.tx_hash);
        }
    }
}

// ---------------------------------------------------------------------------
// Contract handle
// ---------------------------------------------------------------------------

/// [`MintContract`] implementation over a [`SimulatedChain`], bound to one
/// signer.
#[derive(Debug, Clone)]
pub struct SimulatedContract {
    chain: SimulatedChain,
    signer: Address,
}

impl SimulatedContract {
    fn read<T>(&self, f: impl FnOnce(&ChainState) -> T) -> T {
        self.chain.mine_abandoned();
        f(&self.chain.state.lock())
    }
}

#[async_trait]
impl MintContract for SimulatedContract {
    fn address(&self) -> Address {
        self.read(|s| s.contract_address)
    }

    async fn is_whitelist_mint_active(&self) -> Result<bool, ContractError> {
        Ok(self.read(|s| s.whitelist_active))
    }

    async fn is_public_mint_active(&self) -> Result<bool, ContractError> {
        Ok(self.read(|s| s.public_active))
    }

    async fn is_valid_whitelist(
        &self,
        proof: &InclusionProof,
        leaf: Hash32,
    ) -> Result<bool, ContractError> {
        Ok(self.read(|s| verify_proof(&s.merkle_root, &leaf, proof)))
    }

    async fn total_minted_whitelist(&self, wallet: Address) -> Result<u64, ContractError> {
        Ok(self.read(|s| s.minted_whitelist.get(&wallet).copied().unwrap_or(0)))
    }

    async fn total_minted_public(&self, wallet: Address) -> Result<u64, ContractError> {
        Ok(self.read(|s| s.minted_public.get(&wallet).copied().unwrap_or(0)))
    }

    async fn whitelist_minted_amount(&self) -> Result<u64, ContractError> {
        Ok(self.read(|s| s.whitelist_minted))
    }

    async fn public_minted_amount(&self) -> Result<u64, ContractError> {
        Ok(self.read(|s| s.public_minted))
    }

    async fn total_supply(&self) -> Result<u64, ContractError> {
        Ok(self.read(|s| s.total_supply))
    }

    async fn max_supply(&self) -> Result<u64, ContractError> {
        Ok(self.read(|s| s.max_supply))
    }

    async fn merkle_root(&self) -> Result<Option<Hash32>, ContractError> {
        if let Some(error) = self.chain.faults.lock().root_read_error.clone() {
            return Err(error);
        }
        Ok(Some(self.read(|s| s.merkle_root)))
    }

    async fn whitelist_mint(
        &self,
        quantity: u64,
        proof: &InclusionProof,
        value: Wei,
    ) -> Result<Box<dyn PendingMint>, ContractError> {
        self.chain.submit(
            self.signer,
            MintCall::Whitelist {
                quantity,
                proof: proof.clone(),
                value,
            },
        )
    }

    async fn public_mint(
        &self,
        quantity: u64,
        value: Wei,
    ) -> Result<Box<dyn PendingMint>, ContractError> {
        self.chain
            .submit(self.signer, MintCall::Public { quantity, value })
    }
}
