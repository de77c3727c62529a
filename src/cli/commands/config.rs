//! Config Command
//!
//! Inspect codesurface configuration.
//!
//! Usage:
//!   codesurface config show [-f toml|json]
//!   codesurface config path

use crate::cli::CommandContext;
use crate::cli::ui::OutputFormat;
use crate::config::{ConfigLoader, ENV_PREFIX};
use crate::types::{Result, SurfaceError};

/// Show the merged effective configuration
pub fn show(ctx: &CommandContext, format: OutputFormat) -> Result<()> {
    let as_json = match format {
        OutputFormat::Toml => false,
        OutputFormat::Json => true,
        other => {
            return Err(SurfaceError::Config(format!(
                "config show supports toml or json, not {:?}",
                other
            )));
        }
    };
    println!("{}", ConfigLoader::render(&ctx.config, as_json)?);
    Ok(())
}

/// Show configuration file locations
pub fn path(ctx: &CommandContext) -> Result<()> {
    match ConfigLoader::global_config_path() {
        Some(global) => {
            let state = if global.exists() { "" } else { " (not found)" };
            println!("Global:     {}{}", global.display(), state);
        }
        None => println!("Global:     (cannot determine config directory)"),
    }

    let project = ConfigLoader::project_config_path(&ctx.root);
    let state = if project.exists() { "" } else { " (not found)" };
    println!("Repository: {}{}", project.display(), state);
    println!("Env prefix: {}", ENV_PREFIX);
    Ok(())
}
