use crate::error::{Result, RomeError};
use crate::paths;
use crate::types::NamedAccounts;
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// PathsConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_deployments")]
    pub deployments: String,
    #[serde(default = "default_artifacts")]
    pub artifacts: String,
}

fn default_deployments() -> String {
    paths::DEFAULT_DEPLOYMENTS_DIR.to_string()
}

fn default_artifacts() -> String {
    paths::DEFAULT_ARTIFACTS_DIR.to_string()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            deployments: default_deployments(),
            artifacts: default_artifacts(),
        }
    }
}

// ---------------------------------------------------------------------------
// StableAssetConfig
// ---------------------------------------------------------------------------

/// Which token the presale accepts, per chain.
///
/// On `production_chain_id` the canonical `production_address` is used and
/// the registry is never consulted. Every other chain uses the deployment
/// named `mock_name`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StableAssetConfig {
    #[serde(default = "default_production_chain_id")]
    pub production_chain_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub production_address: Option<Address>,
    #[serde(default = "default_mock_name")]
    pub mock_name: String,
}

/// Moonriver mainnet.
fn default_production_chain_id() -> u64 {
    1285
}

fn default_mock_name() -> String {
    "mockDAI".to_string()
}

impl StableAssetConfig {
    /// What the operator has to set before the production chain can be used.
    pub fn missing_address_hint(&self) -> String {
        format!(
            "set stable_asset.production_address in {} to the canonical stable asset on chain {}",
            paths::CONFIG_FILE,
            self.production_chain_id
        )
    }
}

impl Default for StableAssetConfig {
    fn default() -> Self {
        Self {
            production_chain_id: default_production_chain_id(),
            production_address: None,
            mock_name: default_mock_name(),
        }
    }
}

// ---------------------------------------------------------------------------
// NetworkConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub rpc_url: String,
    pub chain_id: u64,
    #[serde(default)]
    pub accounts: NamedAccounts,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

fn default_poll_interval() -> u64 {
    1_000
}

// ---------------------------------------------------------------------------
// ProjectConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    pub project: ProjectConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub stable_asset: StableAssetConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_network: Option<String>,
    #[serde(default)]
    pub networks: BTreeMap<String, NetworkConfig>,
}

fn default_version() -> u32 {
    1
}

impl Config {
    pub fn new(project_name: impl Into<String>) -> Self {
        let mut networks = BTreeMap::new();
        networks.insert(
            "localhost".to_string(),
            NetworkConfig {
                rpc_url: "http://127.0.0.1:8545".to_string(),
                chain_id: 1337,
                accounts: NamedAccounts::default(),
                poll_interval_ms: 250,
            },
        );
        Self {
            version: 1,
            project: ProjectConfig {
                name: project_name.into(),
            },
            paths: PathsConfig::default(),
            stable_asset: StableAssetConfig::default(),
            default_network: Some("localhost".to_string()),
            networks,
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(RomeError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    /// Pick the active network: the explicit name wins, then `default_network`.
    pub fn network(&self, explicit: Option<&str>) -> Result<(&str, &NetworkConfig)> {
        let name = explicit
            .or(self.default_network.as_deref())
            .ok_or_else(|| {
                RomeError::UnknownNetwork("no --network given and no default_network set".into())
            })?;
        paths::validate_name(name)?;
        self.networks
            .get_key_value(name)
            .map(|(k, v)| (k.as_str(), v))
            .ok_or_else(|| RomeError::UnknownNetwork(name.to_string()))
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if let Some(default) = &self.default_network {
            if !self.networks.contains_key(default) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("default_network '{default}' is not defined in networks"),
                });
            }
        }

        if self.networks.is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "no networks configured".to_string(),
            });
        }

        for (name, net) in &self.networks {
            if let Err(e) = paths::validate_name(name) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: e.to_string(),
                });
            }

            if net.rpc_url.trim().is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("network '{name}' has an empty rpc_url"),
                });
            }

            for role in net.accounts.unset() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("network '{name}': account '{role}' is the zero address"),
                });
            }

            if net.chain_id == self.stable_asset.production_chain_id
                && self
                    .stable_asset
                    .production_address
                    .map_or(true, |a| a.is_zero())
            {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!(
                        "network '{name}' is the production chain ({}): {}",
                        net.chain_id,
                        self.stable_asset.missing_address_hint()
                    ),
                });
            }
        }

        warnings
    }
}
