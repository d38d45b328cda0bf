use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use rome_core::config::{Config, WarnLevel};
use std::path::Path;

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Validate rome.yaml for common mistakes
    Validate,

    /// Show the resolved configuration for the selected network
    Show,
}

pub fn run(
    root: &Path,
    network: Option<&str>,
    subcmd: ConfigSubcommand,
    json: bool,
) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Validate => validate(root, json),
        ConfigSubcommand::Show => show(root, network, json),
    }
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn validate(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let warnings = config.validate();

    if json {
        let value = serde_json::json!({
            "warnings": warnings,
        });
        print_json(&value)?;
    } else if warnings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("config validation found errors");
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn show(root: &Path, network: Option<&str>, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let (name, net) = config.network(network)?;

    if json {
        let value = serde_json::json!({
            "project": config.project.name,
            "network": name,
            "rpc_url": net.rpc_url,
            "chain_id": net.chain_id,
            "accounts": net.accounts,
            "poll_interval_ms": net.poll_interval_ms,
            "paths": config.paths,
            "stable_asset": config.stable_asset,
        });
        return print_json(&value);
    }

    let stable = if net.chain_id == config.stable_asset.production_chain_id {
        match config.stable_asset.production_address {
            Some(addr) => format!("{addr} (canonical)"),
            None => "unset (canonical address required)".to_string(),
        }
    } else {
        format!("deployment '{}'", config.stable_asset.mock_name)
    };

    println!("Project:      {}", config.project.name);
    println!("Network:      {name}");
    println!("RPC URL:      {}", net.rpc_url);
    println!("Chain ID:     {}", net.chain_id);
    println!("Deployer:     {}", net.accounts.deployer);
    println!("DAO:          {}", net.accounts.dao);
    println!("WARCHEST:     {}", net.accounts.warchest);
    println!("Stable asset: {stable}");
    println!("Deployments:  {}", config.paths.deployments);
    println!("Artifacts:    {}", config.paths.artifacts);
    Ok(())
}
