//! Config subcommands.

use anyhow::Result;
use botdeck_core::config::{Config, paths};

pub fn path() -> Result<()> {
    println!("{}", paths::config_path().display());
    Ok(())
}

pub fn init() -> Result<()> {
    let path = paths::config_path();
    if Config::init_default()? {
        println!("Created config at {}", path.display());
        Ok(())
    } else {
        anyhow::bail!("Config file already exists at {}", path.display())
    }
}
