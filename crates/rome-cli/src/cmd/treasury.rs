use crate::output::finish_run;
use crate::session::Session;
use clap::Subcommand;
use rome_core::registry::FileRegistry;
use rome_core::treasury::{self, TreasuryAction, TreasuryContext};
use std::path::Path;

#[derive(Subcommand)]
pub enum TreasurySubcommand {
    /// Toggle each permission in the table
    Toggle {
        /// Read the permission flag first and skip entries already granted
        #[arg(long)]
        skip_granted: bool,
    },

    /// Queue each permission in the table (timelocked treasuries)
    Queue,
}

pub fn run(
    root: &Path,
    network: Option<&str>,
    subcmd: TreasurySubcommand,
    json: bool,
) -> anyhow::Result<()> {
    let (action, skip_granted) = match subcmd {
        TreasurySubcommand::Toggle { skip_granted } => (TreasuryAction::Toggle, skip_granted),
        TreasurySubcommand::Queue => (TreasuryAction::Queue, false),
    };

    let session = Session::open(root, network)?;
    let net = session.net()?;
    let chain = session.rpc()?;
    let registry = FileRegistry::new(
        root,
        session.store(),
        session.config.paths.artifacts.clone(),
        &chain,
    );

    let mut ctx = TreasuryContext::new(
        session.network.clone(),
        net.accounts,
        action,
        &registry,
        &chain,
    )
    .expect_chain_id(net.chain_id)
    .skip_granted(skip_granted);
    let report = treasury::run(&mut ctx)?;
    finish_run(&report, json)
}
