mod cmd;
mod output;
mod root;
mod session;

use clap::{Parser, Subcommand};
use cmd::{
    config::ConfigSubcommand, deployments::DeploymentsSubcommand, plan::PlanTarget,
    treasury::TreasurySubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "rome",
    about = "Deploy and wire the Rome presale, and sequence treasury permissions",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from rome.yaml or .git/)
    #[arg(long, global = true, env = "ROME_ROOT")]
    root: Option<PathBuf>,

    /// Network from rome.yaml (default: default_network)
    #[arg(long, short = 'n', global = true, env = "ROME_NETWORK")]
    network: Option<String>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default rome.yaml in the project root
    Init,

    /// Deploy ClaimHelper and the DAI presale, then wire them to the DAO
    Deploy,

    /// Grant treasury permissions to the bond depositories and distributor
    Treasury {
        #[command(subcommand)]
        subcommand: TreasurySubcommand,
    },

    /// Print the ordered steps of a workflow without running it
    Plan {
        #[arg(value_enum)]
        workflow: PlanTarget,
    },

    /// Inspect recorded deployments for the selected network
    Deployments {
        #[command(subcommand)]
        subcommand: DeploymentsSubcommand,
    },

    /// Validate or print rome.yaml
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Deploy | Commands::Treasury { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());
    let network = cli.network.as_deref();

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Deploy => cmd::deploy::run(&root, network, cli.json),
        Commands::Treasury { subcommand } => {
            cmd::treasury::run(&root, network, subcommand, cli.json)
        }
        Commands::Plan { workflow } => cmd::plan::run(workflow, cli.json),
        Commands::Deployments { subcommand } => {
            cmd::deployments::run(&root, network, subcommand, cli.json)
        }
        Commands::Config { subcommand } => cmd::config::run(&root, network, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
