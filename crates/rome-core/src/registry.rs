//! Deployment registry: where every contract of a network is recorded.
//!
//! Records use the hardhat-deploy layout (`deployments/<network>/<Name>.json`)
//! so contracts deployed by earlier tooling resolve without conversion.

use crate::abi::{self, Token};
use crate::chain::{Chain, TxRequest};
use crate::error::{Result, RomeError};
use crate::paths;
use alloy_primitives::{keccak256, Address, Bytes, B256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Deployment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    #[serde(default)]
    pub name: String,
    pub address: Address,
    #[serde(default)]
    pub args: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytecode_hash: Option<B256>,
    /// Full creation code, present in records written by hardhat-deploy.
    #[serde(default, skip_serializing)]
    pub bytecode: Option<Bytes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<B256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployer: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployed_at: Option<DateTime<Utc>>,
}

impl Deployment {
    pub fn new(name: impl Into<String>, address: Address) -> Self {
        Self {
            name: name.into(),
            address,
            args: Vec::new(),
            bytecode_hash: None,
            bytecode: None,
            transaction_hash: None,
            deployer: None,
            deployed_at: None,
        }
    }

    pub fn code_hash(&self) -> Option<B256> {
        self.bytecode_hash
            .or_else(|| self.bytecode.as_ref().map(keccak256))
    }

    /// Same creation code and same constructor arguments.
    pub fn matches(&self, code_hash: B256, args: &[Token]) -> bool {
        self.code_hash() == Some(code_hash) && args_match(&self.args, args)
    }
}

pub fn args_to_json(args: &[Token]) -> Vec<Value> {
    args.iter()
        .map(|t| match t {
            Token::Bool(b) => Value::Bool(*b),
            other => Value::String(other.to_string()),
        })
        .collect()
}

fn args_match(stored: &[Value], args: &[Token]) -> bool {
    let wanted = args_to_json(args);
    stored.len() == wanted.len()
        && stored.iter().zip(&wanted).all(|(a, b)| match (a, b) {
            (Value::String(a), Value::String(b)) => a.eq_ignore_ascii_case(b),
            (a, b) => a == b,
        })
}

// ---------------------------------------------------------------------------
// DeploymentRegistry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployRequest {
    pub from: Address,
    pub args: Vec<Token>,
}

#[derive(Debug, Clone)]
pub struct DeployOutcome {
    pub deployment: Deployment,
    /// True when an identical deployment already existed and nothing was sent.
    pub reused: bool,
}

pub trait DeploymentRegistry {
    fn find(&self, name: &str) -> Result<Option<Deployment>>;

    fn list(&self) -> Result<Vec<Deployment>>;

    /// Deploy `name` unless a deployment with identical code and args exists.
    fn deploy(&mut self, name: &str, request: &DeployRequest) -> Result<DeployOutcome>;

    fn get(&self, name: &str) -> Result<Deployment> {
        self.find(name)?.ok_or_else(|| RomeError::missing([name]))
    }
}

// ---------------------------------------------------------------------------
// DeploymentStore: the on-disk records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct DeploymentStore {
    dir: PathBuf,
}

impl DeploymentStore {
    pub fn open(root: &Path, deployments: &str, network: &str) -> Self {
        Self {
            dir: paths::network_deployments_dir(root, deployments, network),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn find(&self, name: &str) -> Result<Option<Deployment>> {
        let path = paths::deployment_record(&self.dir, name);
        if !path.exists() {
            return Ok(None);
        }
        let data = std::fs::read_to_string(&path)?;
        let mut deployment: Deployment = serde_json::from_str(&data)?;
        deployment.name = name.to_string();
        Ok(Some(deployment))
    }

    pub fn list(&self) -> Result<Vec<Deployment>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut names: Vec<String> = std::fs::read_dir(&self.dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == paths::RECORD_EXT))
            .filter_map(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .collect();
        names.sort();

        let mut out = Vec::with_capacity(names.len());
        for name in names {
            if let Some(d) = self.find(&name)? {
                out.push(d);
            }
        }
        Ok(out)
    }

    pub fn save(&self, deployment: &Deployment) -> Result<()> {
        let path = paths::deployment_record(&self.dir, &deployment.name);
        let data = serde_json::to_string_pretty(deployment)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }
}

// ---------------------------------------------------------------------------
// Artifact
// ---------------------------------------------------------------------------

/// Compiler output for one contract; only the creation code is used.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub bytecode: Bytes,
}

impl Artifact {
    pub fn load(root: &Path, artifacts: &str, name: &str) -> Result<Self> {
        let path = paths::artifact_path(root, artifacts, name);
        if !path.exists() {
            return Err(RomeError::ArtifactNotFound(path.display().to_string()));
        }
        let data = std::fs::read_to_string(&path)?;
        let artifact: Artifact = serde_json::from_str(&data)?;
        if artifact.bytecode.is_empty() {
            return Err(RomeError::ArtifactNotFound(format!(
                "{name}: artifact has no creation bytecode"
            )));
        }
        Ok(artifact)
    }
}

// ---------------------------------------------------------------------------
// FileRegistry
// ---------------------------------------------------------------------------

/// Registry backed by a `DeploymentStore`, deploying through a `Chain`.
pub struct FileRegistry<'c> {
    store: DeploymentStore,
    root: PathBuf,
    artifacts: String,
    chain: &'c dyn Chain,
}

impl<'c> FileRegistry<'c> {
    pub fn new(
        root: &Path,
        store: DeploymentStore,
        artifacts: impl Into<String>,
        chain: &'c dyn Chain,
    ) -> Self {
        Self {
            store,
            root: root.to_path_buf(),
            artifacts: artifacts.into(),
            chain,
        }
    }
}

impl DeploymentRegistry for FileRegistry<'_> {
    fn find(&self, name: &str) -> Result<Option<Deployment>> {
        self.store.find(name)
    }

    fn list(&self) -> Result<Vec<Deployment>> {
        self.store.list()
    }

    fn deploy(&mut self, name: &str, request: &DeployRequest) -> Result<DeployOutcome> {
        let artifact = Artifact::load(&self.root, &self.artifacts, name)?;
        let code_hash = keccak256(&artifact.bytecode);

        if let Some(existing) = self.store.find(name)? {
            if existing.matches(code_hash, &request.args) {
                tracing::info!(name, address = %existing.address, "reusing deployment");
                return Ok(DeployOutcome {
                    deployment: existing,
                    reused: true,
                });
            }
            tracing::info!(name, "code or args changed, redeploying");
        }

        let data = abi::encode_constructor(&artifact.bytecode, &request.args);
        let receipt = self
            .chain
            .send_transaction(&TxRequest::create(request.from, data))
            .map_err(|e| RomeError::tx_failure(format!("deploy {name}"), e.to_string()))?;
        let address = receipt.contract_address.ok_or_else(|| {
            RomeError::tx_failure(
                format!("deploy {name}"),
                "receipt carries no contract address",
            )
        })?;

        let deployment = Deployment {
            name: name.to_string(),
            address,
            args: args_to_json(&request.args),
            bytecode_hash: Some(code_hash),
            bytecode: None,
            transaction_hash: Some(receipt.transaction_hash),
            deployer: Some(request.from),
            deployed_at: Some(Utc::now()),
        };
        self.store.save(&deployment)?;
        tracing::info!(
            name,
            %address,
            tx = %receipt.transaction_hash,
            gas = receipt.gas_used,
            "deployed"
        );

        Ok(DeployOutcome {
            deployment,
            reused: false,
        })
    }
}
