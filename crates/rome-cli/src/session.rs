//! Config-derived handles shared by the commands that touch a network.

use anyhow::Context;
use rome_core::config::{Config, NetworkConfig};
use rome_core::registry::DeploymentStore;
use rome_core::rpc::RpcClient;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub struct Session {
    pub root: PathBuf,
    pub config: Config,
    pub network: String,
}

impl Session {
    pub fn open(root: &Path, network: Option<&str>) -> anyhow::Result<Self> {
        let config = Config::load(root).context("failed to load rome.yaml")?;
        let name = config.network(network)?.0.to_string();
        Ok(Self {
            root: root.to_path_buf(),
            config,
            network: name,
        })
    }

    pub fn net(&self) -> anyhow::Result<&NetworkConfig> {
        Ok(self.config.network(Some(&self.network))?.1)
    }

    pub fn store(&self) -> DeploymentStore {
        DeploymentStore::open(&self.root, &self.config.paths.deployments, &self.network)
    }

    pub fn rpc(&self) -> anyhow::Result<RpcClient> {
        let net = self.net()?;
        tracing::info!(network = %self.network, url = %net.rpc_url, "connecting");
        Ok(RpcClient::new(
            net.rpc_url.clone(),
            Duration::from_millis(net.poll_interval_ms),
        ))
    }
}
