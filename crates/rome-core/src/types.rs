use crate::error::{Result, RomeError};
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Contract names
// ---------------------------------------------------------------------------

/// Registry names of every contract the workflows touch.
pub mod contract {
    pub const ROME: &str = "Rome";
    pub const AROME: &str = "aRome";
    pub const CLAIM_HELPER: &str = "ClaimHelper";
    pub const DAI_PRESALE: &str = "DaiRomePresale";

    pub const TREASURY: &str = "RomeTreasury";
    pub const DISTRIBUTOR: &str = "Distributor";
    pub const FRAX_BONDS: &str = "FRAXBondDepository";
    pub const MIM_BONDS: &str = "MIMBondDepository";
    pub const MOVR_BONDS: &str = "MOVRBondDepository";
    pub const ROME_FRAX_BONDS: &str = "ROMEFRAXBondDepository";
    pub const ROME_MIM_BONDS: &str = "ROMEMIMBondDepository";
    pub const ROME_MOVR_BONDS: &str = "ROMEMOVRBondDepository";
}

// ---------------------------------------------------------------------------
// Role / NamedAccounts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Deployer,
    Dao,
    Warchest,
}

impl Role {
    pub fn all() -> &'static [Role] {
        &[Role::Deployer, Role::Dao, Role::Warchest]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Deployer => "deployer",
            Role::Dao => "DAO",
            Role::Warchest => "WARCHEST",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role-named addresses for one network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamedAccounts {
    pub deployer: Address,
    pub dao: Address,
    pub warchest: Address,
}

impl NamedAccounts {
    pub fn get(&self, role: Role) -> Address {
        match role {
            Role::Deployer => self.deployer,
            Role::Dao => self.dao,
            Role::Warchest => self.warchest,
        }
    }

    /// Roles whose address is still the zero address.
    pub fn unset(&self) -> Vec<Role> {
        Role::all()
            .iter()
            .copied()
            .filter(|r| self.get(*r).is_zero())
            .collect()
    }

    /// Fail with `ConfigurationMismatch` if any of `roles` is still zero.
    /// A zero address must never reach a constructor or an ownership call.
    pub fn require(&self, network: &str, roles: &[Role]) -> Result<()> {
        let missing: Vec<&str> = roles
            .iter()
            .filter(|r| self.get(**r).is_zero())
            .map(|r| r.as_str())
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        Err(RomeError::ConfigurationMismatch(format!(
            "network '{network}' has no address for: {}",
            missing.join(", ")
        )))
    }
}

impl Default for NamedAccounts {
    fn default() -> Self {
        Self {
            deployer: Address::ZERO,
            dao: Address::ZERO,
            warchest: Address::ZERO,
        }
    }
}
