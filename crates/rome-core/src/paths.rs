use crate::error::{Result, RomeError};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// File constants
// ---------------------------------------------------------------------------

pub const CONFIG_FILE: &str = "rome.yaml";
pub const DEFAULT_DEPLOYMENTS_DIR: &str = "deployments";
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";
pub const RECORD_EXT: &str = "json";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// `deployments/<network>/`: one directory of records per network.
pub fn network_deployments_dir(root: &Path, deployments: &str, network: &str) -> PathBuf {
    root.join(deployments).join(network)
}

pub fn deployment_record(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.{RECORD_EXT}"))
}

pub fn artifact_path(root: &Path, artifacts: &str, name: &str) -> PathBuf {
    root.join(artifacts).join(format!("{name}.{RECORD_EXT}"))
}

// ---------------------------------------------------------------------------
// Name validation
// ---------------------------------------------------------------------------

static NAME_RE: OnceLock<Regex> = OnceLock::new();

fn name_re() -> &'static Regex {
    NAME_RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_\-]*$").unwrap())
}

/// Network and contract names become path segments.
pub fn validate_name(name: &str) -> Result<()> {
    if name.len() > 64 || !name_re().is_match(name) {
        return Err(RomeError::InvalidName(name.to_string()));
    }
    Ok(())
}
