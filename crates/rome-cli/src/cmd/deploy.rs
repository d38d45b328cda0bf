use crate::output::finish_run;
use crate::session::Session;
use rome_core::presale::{self, PresaleContext};
use rome_core::registry::FileRegistry;
use std::path::Path;

pub fn run(root: &Path, network: Option<&str>, json: bool) -> anyhow::Result<()> {
    let session = Session::open(root, network)?;
    let net = session.net()?;
    let chain = session.rpc()?;
    let mut registry = FileRegistry::new(
        root,
        session.store(),
        session.config.paths.artifacts.clone(),
        &chain,
    );

    let mut ctx = PresaleContext::new(
        session.network.clone(),
        net.accounts,
        session.config.stable_asset.clone(),
        &mut registry,
        &chain,
    )
    .expect_chain_id(net.chain_id);
    let report = presale::run(&mut ctx)?;

    if !json {
        if let Some(helper) = ctx.claim_helper() {
            println!("ClaimHelper Address: {}", helper.address);
        }
        if let Some(sale) = ctx.presale() {
            println!("DAI Presale Address: {}", sale.address);
        }
    }
    finish_run(&report, json)
}
