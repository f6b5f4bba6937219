use anyhow::Result;

use livecheck::config::Config;

pub fn init(config: &Config) -> Result<()> {
    config.ensure_layout()?;

    println!("Folders and files are ready.");
    println!("  Results: {}", config.paths.results_dir.display());
    println!("  Catalog: {}", config.paths.catalog.display());
    println!("  Whitelist: {}", config.paths.whitelist.display());
    println!("  Blacklist: {}", config.paths.blacklist.display());

    Ok(())
}
