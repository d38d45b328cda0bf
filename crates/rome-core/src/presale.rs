//! Presale deployment and wiring workflow.
//!
//! Deploys `ClaimHelper` and `DaiRomePresale`, registers the presale with
//! the helper and finally hands the helper to the DAO. Every failure stops
//! the run; contracts already deployed stay deployed.

use crate::abi::Token;
use crate::chain::Chain;
use crate::config::StableAssetConfig;
use crate::contracts::ClaimHelper;
use crate::error::{Result, RomeError};
use crate::network::{self, AssetSource, NetworkContext};
use crate::pipeline::{Pipeline, PlannedStep, Policy, Step, StepOutcome};
use crate::registry::{DeployOutcome, DeployRequest, Deployment, DeploymentRegistry};
use crate::report::RunReport;
use crate::resolver::{self, Resolved};
use crate::types::{contract, NamedAccounts, Role};

pub const WORKFLOW: &str = "deploy-presale";

pub const VERIFY_NETWORK: &str = "verify-network";
pub const RESOLVE: &str = "resolve-dependencies";
pub const SELECT_STABLE: &str = "select-stable-asset";
pub const DEPLOY_CLAIM_HELPER: &str = "deploy-claim-helper";
pub const DEPLOY_PRESALE: &str = "deploy-presale";
pub const REGISTER_PRESALE: &str = "register-presale";
pub const TRANSFER_OWNERSHIP: &str = "transfer-ownership";

/// Contracts that must already be deployed.
pub const PREREQUISITES: &[&str] = &[contract::ROME, contract::AROME];

// ---------------------------------------------------------------------------
// PresaleContext
// ---------------------------------------------------------------------------

pub struct PresaleContext<'r, 'c> {
    pub network: String,
    /// Chain id the config expects; `None` accepts whatever the node reports.
    pub expected_chain_id: Option<u64>,
    pub accounts: NamedAccounts,
    pub stable_asset: StableAssetConfig,
    registry: &'r mut dyn DeploymentRegistry,
    chain: &'c dyn Chain,

    chain_id: Option<u64>,
    resolved: Resolved,
    context: Option<NetworkContext>,
    claim_helper: Option<Deployment>,
    presale: Option<Deployment>,
    presale_reused: bool,
    already_wired: bool,
}

impl<'r, 'c> PresaleContext<'r, 'c> {
    pub fn new(
        network: impl Into<String>,
        accounts: NamedAccounts,
        stable_asset: StableAssetConfig,
        registry: &'r mut dyn DeploymentRegistry,
        chain: &'c dyn Chain,
    ) -> Self {
        Self {
            network: network.into(),
            expected_chain_id: None,
            accounts,
            stable_asset,
            registry,
            chain,
            chain_id: None,
            resolved: Resolved::default(),
            context: None,
            claim_helper: None,
            presale: None,
            presale_reused: false,
            already_wired: false,
        }
    }

    pub fn expect_chain_id(mut self, chain_id: u64) -> Self {
        self.expected_chain_id = Some(chain_id);
        self
    }

    pub fn claim_helper(&self) -> Option<&Deployment> {
        self.claim_helper.as_ref()
    }

    pub fn presale(&self) -> Option<&Deployment> {
        self.presale.as_ref()
    }
}

fn output<'a, T>(value: &'a Option<T>, step: &str) -> Result<&'a T> {
    value
        .as_ref()
        .ok_or_else(|| RomeError::InvalidPipeline(format!("output of '{step}' is not available")))
}

fn describe(outcome: &DeployOutcome, label: &str) -> StepOutcome {
    let address = outcome.deployment.address;
    if outcome.reused {
        StepOutcome::Skipped(format!("{label} Address: {address} (already deployed)"))
    } else {
        StepOutcome::Done(format!("{label} Address: {address}"))
    }
}

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

fn verify_network(ctx: &mut PresaleContext<'_, '_>) -> Result<StepOutcome> {
    ctx.accounts.require(&ctx.network, Role::all())?;
    let actual = network::verify_chain_id(ctx.chain, &ctx.network, ctx.expected_chain_id)?;
    ctx.chain_id = Some(actual);
    Ok(StepOutcome::Done(format!("connected to chain {actual}")))
}

fn resolve_dependencies(ctx: &mut PresaleContext<'_, '_>) -> Result<StepOutcome> {
    ctx.resolved = resolver::resolve(&*ctx.registry, PREREQUISITES)?;
    let found: Vec<String> = ctx
        .resolved
        .iter()
        .map(|(name, address)| format!("{name}={address}"))
        .collect();
    Ok(StepOutcome::Done(format!("resolved {}", found.join(" "))))
}

fn select_stable_asset(ctx: &mut PresaleContext<'_, '_>) -> Result<StepOutcome> {
    let chain_id = *output(&ctx.chain_id, VERIFY_NETWORK)?;
    let selected = network::select(chain_id, &ctx.stable_asset, &*ctx.registry)?;
    let detail = match selected.source {
        AssetSource::Canonical => format!("stable asset {} (canonical)", selected.stable_asset),
        AssetSource::Mock => format!(
            "stable asset {} ({})",
            selected.stable_asset, ctx.stable_asset.mock_name
        ),
    };
    ctx.context = Some(selected);
    Ok(StepOutcome::Done(detail))
}

fn deploy_claim_helper(ctx: &mut PresaleContext<'_, '_>) -> Result<StepOutcome> {
    let request = DeployRequest {
        from: ctx.accounts.deployer,
        args: vec![
            Token::Address(ctx.resolved.address(contract::ROME)?),
            Token::Address(ctx.accounts.dao),
        ],
    };
    let outcome = ctx.registry.deploy(contract::CLAIM_HELPER, &request)?;
    let result = describe(&outcome, "ClaimHelper");
    ctx.claim_helper = Some(outcome.deployment);
    Ok(result)
}

fn deploy_presale(ctx: &mut PresaleContext<'_, '_>) -> Result<StepOutcome> {
    let stable = output(&ctx.context, SELECT_STABLE)?.stable_asset;
    let helper = output(&ctx.claim_helper, DEPLOY_CLAIM_HELPER)?.address;
    let request = DeployRequest {
        from: ctx.accounts.deployer,
        args: vec![
            Token::Address(ctx.resolved.address(contract::AROME)?),
            Token::Address(ctx.resolved.address(contract::ROME)?),
            Token::Address(stable),
            Token::Address(ctx.accounts.dao),
            Token::Address(ctx.accounts.warchest),
            Token::Address(helper),
        ],
    };
    let outcome = ctx.registry.deploy(contract::DAI_PRESALE, &request)?;
    let result = describe(&outcome, "DAI Presale");
    ctx.presale_reused = outcome.reused;
    ctx.presale = Some(outcome.deployment);
    Ok(result)
}

fn register_presale(ctx: &mut PresaleContext<'_, '_>) -> Result<StepOutcome> {
    let helper = ClaimHelper::at(output(&ctx.claim_helper, DEPLOY_CLAIM_HELPER)?.address, ctx.chain);
    let presale = output(&ctx.presale, DEPLOY_PRESALE)?.address;

    // Once the DAO owns the helper the deployer can no longer register.
    if helper.owner()? == ctx.accounts.dao {
        if !ctx.presale_reused {
            return Err(RomeError::ConfigurationMismatch(format!(
                "ClaimHelper {} is owned by the DAO but DaiRomePresale {presale} is a new \
                 deployment; the DAO must call setPresale({presale})",
                helper.address
            )));
        }
        ctx.already_wired = true;
        return Ok(StepOutcome::Skipped(
            "ClaimHelper is already owned by the DAO".to_string(),
        ));
    }

    let receipt = helper.set_presale(ctx.accounts.deployer, presale)?;
    Ok(StepOutcome::Done(format!(
        "setPresale({presale}) mined in tx {}",
        receipt.transaction_hash
    )))
}

fn transfer_ownership(ctx: &mut PresaleContext<'_, '_>) -> Result<StepOutcome> {
    if ctx.already_wired {
        return Ok(StepOutcome::Skipped(
            "ownership was transferred by a previous run".to_string(),
        ));
    }
    let helper = ClaimHelper::at(output(&ctx.claim_helper, DEPLOY_CLAIM_HELPER)?.address, ctx.chain);
    let dao = ctx.accounts.dao;
    let receipt = helper.transfer_ownership(ctx.accounts.deployer, dao)?;
    Ok(StepOutcome::Done(format!(
        "transferOwnership({dao}) mined in tx {}",
        receipt.transaction_hash
    )))
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

pub fn pipeline<'a, 'r: 'a, 'c: 'a>() -> Result<Pipeline<'a, PresaleContext<'r, 'c>>> {
    Pipeline::new(
        WORKFLOW,
        Policy::FailFast,
        vec![
            Step::new(VERIFY_NETWORK, &[], verify_network),
            Step::new(RESOLVE, &[VERIFY_NETWORK], resolve_dependencies),
            Step::new(SELECT_STABLE, &[VERIFY_NETWORK], select_stable_asset),
            Step::new(DEPLOY_CLAIM_HELPER, &[RESOLVE, SELECT_STABLE], deploy_claim_helper),
            Step::new(
                DEPLOY_PRESALE,
                &[RESOLVE, SELECT_STABLE, DEPLOY_CLAIM_HELPER],
                deploy_presale,
            ),
            Step::new(
                REGISTER_PRESALE,
                &[DEPLOY_CLAIM_HELPER, DEPLOY_PRESALE],
                register_presale,
            ),
            Step::new(TRANSFER_OWNERSHIP, &[REGISTER_PRESALE], transfer_ownership),
        ],
    )
}

pub fn plan() -> Result<Vec<PlannedStep>> {
    Ok(pipeline()?.plan())
}

/// Run the whole workflow. `Err` only for a malformed pipeline; step
/// failures are in the report.
pub fn run(ctx: &mut PresaleContext<'_, '_>) -> Result<RunReport> {
    let mut report = pipeline()?.run(ctx);
    report.network = Some(ctx.network.clone());
    report.chain_id = ctx.chain_id;
    Ok(report)
}
