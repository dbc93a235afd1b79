pub mod completion;
pub mod gather;
pub mod list;

use anyhow::{Context, Result};
use recon_core::ReconConfig;
use std::env;

use crate::cli_args::ConfigOpts;

/// Home and project config as selected by the command-line flags.
pub fn load_config(opts: &ConfigOpts) -> Result<ReconConfig> {
    if opts.no_config {
        log::debug!("Config loading disabled by --no-config");
        return Ok(ReconConfig::default());
    }
    let cwd = env::current_dir().context("Failed to determine current directory")?;
    let home = dirs::home_dir();
    let config = ReconConfig::load(&cwd, home.as_deref(), opts.config.as_deref())
        .context("Failed to load configuration")?;
    Ok(config)
}
