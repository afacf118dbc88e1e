//! # CLI Interface
//!
//! Command-line structure for `fifthdim`, via `clap` derive. The global
//! flags pick the config, the log format and the log level; subcommands
//! cover the whitelist tooling and the local mint flow.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::logging::LogFormat;

/// Fifth Dimension mint client.
///
/// Builds whitelist proofs, reports eligibility, and runs mints against a
/// local simulated contract whose state lives in a JSON file.
#[derive(Parser, Debug)]
#[command(
    name = "fifthdim",
    about = "Fifth Dimension mint client",
    version,
    propagate_version = true
)]
pub struct FifthDimCli {
    /// JSON file overriding any subset of the collection parameters.
    #[arg(long, short = 'c', global = true, env = "FIFTHDIM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Default log filter when `RUST_LOG` is unset.
    #[arg(long, global = true, default_value = "fifthdim=info,fifthdim_client=info")]
    pub log_level: String,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the Merkle root of the whitelist.
    Root(WhitelistArgs),
    /// Print the inclusion proof for an address and whether it verifies.
    Proof(ProofArgs),
    /// Connect to the local chain and print what the mint page would show.
    Status(StatusArgs),
    /// Run one mint against the local chain.
    Mint(MintArgs),
    /// Open or close mint phases on the local chain.
    Phase(PhaseArgs),
    /// Print version information and exit.
    Version,
}

/// Which whitelist to load.
#[derive(Args, Debug, Clone)]
pub struct WhitelistArgs {
    /// JSON array of addresses. The embedded list is used when omitted.
    #[arg(long, short = 'w')]
    pub whitelist: Option<PathBuf>,
}

/// Where the simulated contract state lives.
#[derive(Args, Debug, Clone)]
pub struct ChainArgs {
    /// Local chain state file. Created from the config on first use.
    #[arg(long, env = "FIFTHDIM_CHAIN", default_value = "fifthdim-chain.json")]
    pub chain: PathBuf,
}

/// Arguments for `proof`.
#[derive(Args, Debug)]
pub struct ProofArgs {
    /// Address to prove.
    pub address: String,

    #[command(flatten)]
    pub whitelist: WhitelistArgs,
}

/// Arguments for `status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Wallet to connect as.
    #[arg(long, short = 'a')]
    pub address: String,

    #[command(flatten)]
    pub whitelist: WhitelistArgs,

    #[command(flatten)]
    pub chain: ChainArgs,
}

/// Arguments for `mint`.
#[derive(Args, Debug)]
pub struct MintArgs {
    /// Wallet to mint from.
    #[arg(long, short = 'a')]
    pub address: String,

    /// Units to mint in the public phase. Ignored for whitelist mints.
    #[arg(long, short = 'q', default_value_t = 1)]
    pub quantity: u64,

    #[command(flatten)]
    pub whitelist: WhitelistArgs,

    #[command(flatten)]
    pub chain: ChainArgs,
}

/// On/off switch for a phase flag.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    /// Open the phase.
    On,
    /// Close the phase.
    Off,
}

impl Toggle {
    /// `true` for [`Toggle::On`].
    pub fn is_on(self) -> bool {
        self == Toggle::On
    }
}

/// Arguments for `phase`. Omitted flags keep their current value.
#[derive(Args, Debug)]
pub struct PhaseArgs {
    /// Whitelist phase.
    #[arg(long, value_enum)]
    pub whitelist: Option<Toggle>,

    /// Public phase.
    #[arg(long, value_enum)]
    pub public: Option<Toggle>,

    /// Whitelist used for the root when the chain file is created.
    #[arg(long = "whitelist-file", short = 'w')]
    pub whitelist_file: Option<PathBuf>,

    #[command(flatten)]
    pub chain: ChainArgs,
}
