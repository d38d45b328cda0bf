//! Network context: which stable asset the presale accepts on this chain.

use crate::chain::Chain;
use crate::config::StableAssetConfig;
use crate::error::{Result, RomeError};
use crate::registry::DeploymentRegistry;
use alloy_primitives::Address;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetSource {
    /// The canonical token on the production chain.
    Canonical,
    /// A mock token from the deployment registry.
    Mock,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkContext {
    pub chain_id: u64,
    pub stable_asset: Address,
    pub source: AssetSource,
}

/// Ask the node for its chain id and hold it to the configured one.
pub fn verify_chain_id(chain: &dyn Chain, network: &str, expected: Option<u64>) -> Result<u64> {
    let actual = chain.chain_id()?;
    if let Some(expected) = expected {
        if expected != actual {
            return Err(RomeError::ConfigurationMismatch(format!(
                "network '{network}' expects chain id {expected} but the node reports {actual}"
            )));
        }
    }
    Ok(actual)
}

/// Production chain: the configured canonical address, no registry lookup.
/// Any other chain: the mock deployment, or `MissingDependency`.
pub fn select(
    chain_id: u64,
    config: &StableAssetConfig,
    registry: &dyn DeploymentRegistry,
) -> Result<NetworkContext> {
    if chain_id == config.production_chain_id {
        let address = config
            .production_address
            .filter(|a| !a.is_zero())
            .ok_or_else(|| {
                RomeError::ConfigurationMismatch(format!(
                    "chain {chain_id} is the production chain: {}",
                    config.missing_address_hint()
                ))
            })?;
        return Ok(NetworkContext {
            chain_id,
            stable_asset: address,
            source: AssetSource::Canonical,
        });
    }

    let mock = registry.get(&config.mock_name)?;
    Ok(NetworkContext {
        chain_id,
        stable_asset: mock.address,
        source: AssetSource::Mock,
    })
}
