use anyhow::Context;
use rome_core::{config::Config, io, paths};
use std::path::Path;

pub fn run(root: &Path) -> anyhow::Result<()> {
    let project_name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "rome".to_string());

    println!("Initializing rome in: {}", root.display());

    let config = if paths::config_path(root).exists() {
        println!("  exists:  {}", paths::CONFIG_FILE);
        Config::load(root).context("failed to load existing rome.yaml")?
    } else {
        let cfg = Config::new(&project_name);
        cfg.save(root)
            .with_context(|| format!("failed to write {}", paths::CONFIG_FILE))?;
        println!("  created: {}", paths::CONFIG_FILE);
        cfg
    };

    for dir in [&config.paths.deployments, &config.paths.artifacts] {
        let p = root.join(dir);
        io::ensure_dir(&p).with_context(|| format!("failed to create {}", p.display()))?;
    }

    if config.stable_asset.production_address.is_none() {
        println!(
            "  note:    before deploying to the production chain, {}",
            config.stable_asset.missing_address_hint()
        );
    }

    println!("\nNext: set networks.<name>.accounts in rome.yaml, then run `rome plan deploy`.");
    Ok(())
}
