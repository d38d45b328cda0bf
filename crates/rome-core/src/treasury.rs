//! Treasury permission sequencer.
//!
//! Resolves the bond depositories and the distributor, then submits one
//! treasury call per entry of `PERMISSIONS`. Entries are independent: a
//! failed entry is reported and the rest are still attempted.

use crate::chain::Chain;
use crate::contracts::{PermissionCategory, Treasury};
use crate::error::Result;
use crate::network;
use crate::pipeline::{Pipeline, PlannedStep, Policy, Step, StepOutcome};
use crate::registry::DeploymentRegistry;
use crate::report::RunReport;
use crate::resolver::{self, Resolved};
use crate::types::{contract, NamedAccounts, Role};
use alloy_primitives::Address;
use serde::Serialize;
use std::fmt;

pub const VERIFY_NETWORK: &str = "verify-network";
pub const RESOLVE: &str = "resolve-dependencies";

/// Contracts that must already be deployed.
pub const PREREQUISITES: &[&str] = &[
    contract::TREASURY,
    contract::DISTRIBUTOR,
    contract::ROME_MOVR_BONDS,
    contract::MOVR_BONDS,
    contract::ROME_FRAX_BONDS,
    contract::FRAX_BONDS,
    contract::ROME_MIM_BONDS,
    contract::MIM_BONDS,
];

// ---------------------------------------------------------------------------
// Permission table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "name", rename_all = "snake_case")]
pub enum Target {
    Contract(&'static str),
    Account(Role),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Contract(name) => f.write_str(name),
            Target::Account(role) => f.write_str(role.as_str()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PermissionEntry {
    pub category: PermissionCategory,
    pub target: Target,
}

const fn entry(category: PermissionCategory, target: Target) -> PermissionEntry {
    PermissionEntry { category, target }
}

/// Submitted in this order.
pub const PERMISSIONS: &[PermissionEntry] = &[
    entry(PermissionCategory::ReserveDepositor, Target::Contract(contract::FRAX_BONDS)),
    entry(PermissionCategory::ReserveDepositor, Target::Contract(contract::MIM_BONDS)),
    entry(PermissionCategory::ReserveDepositor, Target::Account(Role::Dao)),
    entry(PermissionCategory::LiquidityDepositor, Target::Contract(contract::ROME_FRAX_BONDS)),
    entry(PermissionCategory::LiquidityDepositor, Target::Contract(contract::ROME_MIM_BONDS)),
    entry(PermissionCategory::RewardManager, Target::Contract(contract::MOVR_BONDS)),
    entry(PermissionCategory::RewardManager, Target::Contract(contract::ROME_MOVR_BONDS)),
    entry(PermissionCategory::RewardManager, Target::Contract(contract::DISTRIBUTOR)),
];

// ---------------------------------------------------------------------------
// TreasuryAction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TreasuryAction {
    /// `queue(category, target)`: starts the treasury's timelock.
    Queue,
    /// `toggle(category, target, 0x0)`: applies the permission.
    Toggle,
}

impl TreasuryAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TreasuryAction::Queue => "queue",
            TreasuryAction::Toggle => "toggle",
        }
    }

    pub fn workflow(&self) -> &'static str {
        match self {
            TreasuryAction::Queue => "treasury-queue",
            TreasuryAction::Toggle => "treasury-toggle",
        }
    }

    pub fn step_id(&self, entry: &PermissionEntry) -> String {
        format!("{}:{}:{}", self.as_str(), entry.category, entry.target)
    }
}

// ---------------------------------------------------------------------------
// TreasuryContext
// ---------------------------------------------------------------------------

pub struct TreasuryContext<'r, 'c> {
    pub network: String,
    pub expected_chain_id: Option<u64>,
    pub accounts: NamedAccounts,
    pub action: TreasuryAction,
    /// Read the flag first and leave already-granted entries alone.
    pub skip_granted: bool,
    registry: &'r dyn DeploymentRegistry,
    chain: &'c dyn Chain,

    chain_id: Option<u64>,
    resolved: Resolved,
}

impl<'r, 'c> TreasuryContext<'r, 'c> {
    pub fn new(
        network: impl Into<String>,
        accounts: NamedAccounts,
        action: TreasuryAction,
        registry: &'r dyn DeploymentRegistry,
        chain: &'c dyn Chain,
    ) -> Self {
        Self {
            network: network.into(),
            expected_chain_id: None,
            accounts,
            action,
            skip_granted: false,
            registry,
            chain,
            chain_id: None,
            resolved: Resolved::default(),
        }
    }

    pub fn expect_chain_id(mut self, chain_id: u64) -> Self {
        self.expected_chain_id = Some(chain_id);
        self
    }

    pub fn skip_granted(mut self, skip: bool) -> Self {
        self.skip_granted = skip;
        self
    }

    fn target_address(&self, target: Target) -> Result<Address> {
        match target {
            Target::Contract(name) => self.resolved.address(name),
            Target::Account(role) => Ok(self.accounts.get(role)),
        }
    }
}

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

fn verify_network(ctx: &mut TreasuryContext<'_, '_>) -> Result<StepOutcome> {
    ctx.accounts
        .require(&ctx.network, &[Role::Deployer, Role::Dao])?;
    let actual = network::verify_chain_id(ctx.chain, &ctx.network, ctx.expected_chain_id)?;
    ctx.chain_id = Some(actual);
    Ok(StepOutcome::Done(format!("connected to chain {actual}")))
}

fn resolve_dependencies(ctx: &mut TreasuryContext<'_, '_>) -> Result<StepOutcome> {
    ctx.resolved = resolver::resolve(ctx.registry, PREREQUISITES)?;
    Ok(StepOutcome::Done(format!(
        "resolved {} contracts",
        ctx.resolved.len()
    )))
}

fn apply(ctx: &mut TreasuryContext<'_, '_>, entry: &PermissionEntry) -> Result<StepOutcome> {
    let treasury = Treasury::at(ctx.resolved.address(contract::TREASURY)?, ctx.chain);
    let target = ctx.target_address(entry.target)?;
    let code = entry.category.code();

    if ctx.skip_granted && treasury.is_granted(entry.category, target)? == Some(true) {
        return Ok(StepOutcome::Skipped(format!(
            "{} already holds {}",
            entry.target, entry.category
        )));
    }

    let from = ctx.accounts.deployer;
    let receipt = match ctx.action {
        TreasuryAction::Toggle => treasury.toggle(from, entry.category, target, Address::ZERO)?,
        TreasuryAction::Queue => treasury.queue(from, entry.category, target)?,
    };
    Ok(StepOutcome::Done(format!(
        "{}({code}, {} {target}) mined in tx {}",
        ctx.action.as_str(),
        entry.target,
        receipt.transaction_hash
    )))
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

pub fn pipeline<'a, 'r: 'a, 'c: 'a>(
    action: TreasuryAction,
) -> Result<Pipeline<'a, TreasuryContext<'r, 'c>>> {
    let mut steps = vec![
        Step::new(VERIFY_NETWORK, &[], verify_network),
        Step::new(RESOLVE, &[VERIFY_NETWORK], resolve_dependencies),
    ];
    for entry in PERMISSIONS {
        steps.push(Step::new(
            action.step_id(entry),
            &[RESOLVE],
            move |ctx: &mut TreasuryContext<'r, 'c>| apply(ctx, entry),
        ));
    }
    Pipeline::new(action.workflow(), Policy::Continue, steps)
}

pub fn plan(action: TreasuryAction) -> Result<Vec<PlannedStep>> {
    Ok(pipeline(action)?.plan())
}

pub fn run(ctx: &mut TreasuryContext<'_, '_>) -> Result<RunReport> {
    let mut report = pipeline(ctx.action)?.run(ctx);
    report.network = Some(ctx.network.clone());
    report.chain_id = ctx.chain_id;
    Ok(report)
}
