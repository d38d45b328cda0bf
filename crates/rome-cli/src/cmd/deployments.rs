use crate::output::{print_json, print_table};
use crate::session::Session;
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum DeploymentsSubcommand {
    /// List every deployment recorded for the network
    List,

    /// Show one deployment record
    Show {
        /// Contract name, e.g. DaiRomePresale
        name: String,
    },
}

pub fn run(
    root: &Path,
    network: Option<&str>,
    subcmd: DeploymentsSubcommand,
    json: bool,
) -> anyhow::Result<()> {
    let session = Session::open(root, network)?;
    match subcmd {
        DeploymentsSubcommand::List => list(&session, json),
        DeploymentsSubcommand::Show { name } => show(&session, &name, json),
    }
}

fn list(session: &Session, json: bool) -> anyhow::Result<()> {
    let deployments = session.store().list()?;

    if json {
        return print_json(&deployments);
    }

    if deployments.is_empty() {
        println!("No deployments recorded for {}.", session.network);
        return Ok(());
    }

    let rows = deployments
        .iter()
        .map(|d| {
            vec![
                d.name.clone(),
                d.address.to_string(),
                d.deployed_at
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ]
        })
        .collect();
    print_table(&["NAME", "ADDRESS", "DEPLOYED"], rows);
    Ok(())
}

fn show(session: &Session, name: &str, json: bool) -> anyhow::Result<()> {
    rome_core::paths::validate_name(name)?;
    let Some(d) = session.store().find(name)? else {
        anyhow::bail!(
            "no deployment named '{name}' on {} ({})",
            session.network,
            session.store().dir().display()
        );
    };

    if json {
        return print_json(&d);
    }

    println!("Name:     {}", d.name);
    println!("Address:  {}", d.address);
    if let Some(hash) = d.transaction_hash {
        println!("Tx:       {hash}");
    }
    if let Some(deployer) = d.deployer {
        println!("Deployer: {deployer}");
    }
    if let Some(at) = d.deployed_at {
        println!("Deployed: {}", at.to_rfc3339());
    }
    if !d.args.is_empty() {
        println!("Args:");
        for arg in &d.args {
            println!("  {arg}");
        }
    }
    Ok(())
}
