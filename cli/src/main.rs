// Copyright (c) 2026 Moiz Arfeen Khan. MIT License.
// See LICENSE for details.

//! # Fifth Dimension CLI
//!
//! Entry point for the `fifthdim` binary. Parses arguments, initializes
//! logging, loads the collection config, and dispatches:
//!
//! - `root`: print the whitelist Merkle root
//! - `proof`: print an address's inclusion proof
//! - `status`: show the mint page for a wallet on the local chain
//! - `mint`: mint on the local chain
//! - `phase`: open or close phases on the local chain
//! - `version`: print build version information
//!
//! Command output is JSON on stdout; logs go to stderr.

mod chain;
mod cli;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;

use fifthdim_client::adapters::{SimulatedChain, StaticWallet};
use fifthdim_client::config::MintConfig;
use fifthdim_client::crypto::leaf_hash;
use fifthdim_client::mint::MintSession;
use fifthdim_client::ports::{MintContract, WalletProvider};
use fifthdim_client::types::{hex_encode, Address};
use fifthdim_client::whitelist::{MembershipSet, MerkleTree};

use cli::{Commands, FifthDimCli, WhitelistArgs};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = FifthDimCli::parse();
    logging::init_logging(&cli.log_level, cli.log_format);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Root(args) => print_root(&args),
        Commands::Proof(args) => print_proof(args),
        Commands::Status(args) => status(&config, args).await,
        Commands::Mint(args) => mint(&config, args).await,
        Commands::Phase(args) => set_phase(&config, args),
        Commands::Version => {
            print_version(&config);
            Ok(())
        }
    }
}

/// Defaults, overridden by the JSON file when one is given.
fn load_config(path: Option<&Path>) -> Result<MintConfig> {
    let config = match path {
        Some(path) => MintConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => MintConfig::default(),
    };
    config.validate().context("invalid mint configuration")?;
    Ok(config)
}

fn load_whitelist(args: &WhitelistArgs) -> Result<MembershipSet> {
    match &args.whitelist {
        Some(path) => MembershipSet::load(path)
            .with_context(|| format!("failed to load whitelist {}", path.display())),
        None => MembershipSet::embedded().context("embedded whitelist is invalid"),
    }
}

fn parse_address(raw: &str) -> Result<Address> {
    raw.parse()
        .with_context(|| format!("invalid address: {}", raw))
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("failed to encode output")?
    );
    Ok(())
}

fn print_root(args: &WhitelistArgs) -> Result<()> {
    let set = load_whitelist(args)?;
    let tree = MerkleTree::build(&set);
    print_json(&json!({
        "root": hex_encode(tree.root()),
        "members": tree.leaf_count(),
        "depth": tree.depth(),
    }))
}

fn print_proof(args: cli::ProofArgs) -> Result<()> {
    let address = parse_address(&args.address)?;
    let set = load_whitelist(&args.whitelist)?;
    print_json(&proof_report(&set, address))
}

/// Proof, list membership and verification result for one address.
fn proof_report(set: &MembershipSet, address: Address) -> serde_json::Value {
    let tree = MerkleTree::build(set);
    let proof = tree.proof(&address);
    let verified = tree.verify(&address, &proof);
    let member = set.contains(&address);
    if member != verified {
        tracing::warn!(%address, member, verified, "list membership and proof disagree");
    } else if !member {
        tracing::info!(%address, "address is not on the whitelist");
    }
    json!({
        "address": address,
        "leaf": hex_encode(leaf_hash(&address)),
        "root": hex_encode(tree.root()),
        "member": member,
        "proof": proof,
        "verified": verified,
    })
}

/// Builds a session over the whitelist and connects `address` to the
/// local chain.
async fn connect(
    config: &MintConfig,
    whitelist: &WhitelistArgs,
    chain_path: &Path,
    address: &str,
) -> Result<(MintSession, SimulatedChain)> {
    let address = parse_address(address)?;
    let set = load_whitelist(whitelist)?;
    let session = MintSession::new(config.clone(), &set);
    let chain = chain::open(chain_path, config, session.tree().root())?;

    let provider: Arc<dyn WalletProvider> = Arc::new(StaticWallet::new(address));
    let contract: Arc<dyn MintContract> = Arc::new(chain.contract_for(address));
    session
        .connect(Some(provider), contract)
        .await
        .context("failed to connect wallet")?;
    Ok((session, chain))
}

async fn status(config: &MintConfig, args: cli::StatusArgs) -> Result<()> {
    let (session, chain) = connect(config, &args.whitelist, &args.chain.chain, &args.address).await?;
    chain::save(&args.chain.chain, &chain)?;
    print_json(&session.view())
}

async fn mint(config: &MintConfig, args: cli::MintArgs) -> Result<()> {
    let (session, chain) = connect(config, &args.whitelist, &args.chain.chain, &args.address).await?;

    if !session.eligibility().can_whitelist_mint {
        session
            .set_quantity(args.quantity)
            .context("quantity rejected")?;
    }

    let outcome = session.mint().await;
    chain::save(&args.chain.chain, &chain)?;

    match outcome {
        Ok(receipt) => print_json(&json!({
            "receipt": receipt,
            "view": session.view(),
        })),
        Err(e) => {
            tracing::warn!(error = %e, "mint failed");
            Err(e).context("mint failed")
        }
    }
}

fn set_phase(config: &MintConfig, args: cli::PhaseArgs) -> Result<()> {
    let set = load_whitelist(&WhitelistArgs {
        whitelist: args.whitelist_file.clone(),
    })?;
    let root = MerkleTree::build(&set).root();
    let chain = chain::open(&args.chain.chain, config, root)?;

    chain.update(|s| {
        if let Some(toggle) = args.whitelist {
            s.whitelist_active = toggle.is_on();
        }
        if let Some(toggle) = args.public {
            s.public_active = toggle.is_on();
        }
    });
    chain::save(&args.chain.chain, &chain)?;

    let state = chain.state();
    tracing::info!(
        whitelist = state.whitelist_active,
        public = state.public_active,
        "phases updated"
    );
    print_json(&json!({
        "whitelist_active": state.whitelist_active,
        "public_active": state.public_active,
        "total_supply": state.total_supply,
        "max_supply": state.max_supply,
    }))
}

/// Prints version information to stdout.
fn print_version(config: &MintConfig) {
    println!("fifthdim {}", env!("CARGO_PKG_VERSION"));
    println!("client   {}", fifthdim_client::VERSION);
    println!("contract {}", config.contract_address);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn members() -> MembershipSet {
        MembershipSet::new((1u8..=5).map(|i| Address::new([i; 20])).collect()).unwrap()
    }

    #[test]
    fn proof_report_for_member() {
        let report = proof_report(&members(), Address::new([3; 20]));
        assert_eq!(report["member"], true);
        assert_eq!(report["verified"], true);
        assert_eq!(report["proof"].as_array().map(Vec::len), Some(3));
    }

    #[test]
    fn proof_report_for_outsider() {
        let report = proof_report(&members(), Address::new([9; 20]));
        assert_eq!(report["member"], false);
        assert_eq!(report["verified"], false);
        assert_eq!(report["proof"], json!([]));
    }
}
