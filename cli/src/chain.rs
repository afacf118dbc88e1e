//! Local chain file: the simulated contract's state persisted as JSON
//! between invocations.

use anyhow::{Context, Result};
use std::path::Path;

use fifthdim_client::adapters::{ChainState, SimulatedChain};
use fifthdim_client::config::MintConfig;
use fifthdim_client::types::{hex_encode, Hash32};

/// Loads the chain at `path`, or deploys a fresh one with `merkle_root`
/// when the file does not exist yet.
pub fn open(path: &Path, config: &MintConfig, merkle_root: Hash32) -> Result<SimulatedChain> {
    if !path.exists() {
        tracing::info!(
            path = %path.display(),
            root = %hex_encode(merkle_root),
            "creating local chain"
        );
        return Ok(SimulatedChain::new(config, merkle_root));
    }

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read chain file {}", path.display()))?;
    let state: ChainState = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse chain file {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        block = state.block_number,
        total_supply = state.total_supply,
        "local chain loaded"
    );
    Ok(SimulatedChain::from_state(state))
}

/// Writes the chain's current state to `path`.
pub fn save(path: &Path, chain: &SimulatedChain) -> Result<()> {
    let json = serde_json::to_string_pretty(&chain.state()).context("failed to encode chain state")?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write chain file {}", path.display()))?;
    tracing::debug!(path = %path.display(), "local chain saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fifthdim_client::types::Address;

    #[test]
    fn creates_then_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chain.json");
        let config = MintConfig::default();

        let chain = open(&path, &config, [7; 32]).unwrap();
        chain.set_phases(true, true);
        chain.update(|s| {
            s.total_supply = 12;
            s.minted_public.insert(Address::new([3; 20]), 2);
        });
        save(&path, &chain).unwrap();

        let reopened = open(&path, &config, [9; 32]).unwrap();
        assert_eq!(reopened.state(), chain.state());
        assert_eq!(reopened.state().merkle_root, [7; 32]);
    }

    #[test]
    fn rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chain.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = open(&path, &MintConfig::default(), [0; 32]).unwrap_err();
        assert!(err.to_string().contains("failed to parse chain file"));
    }
}
