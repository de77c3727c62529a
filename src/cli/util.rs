//! CLI Common Utilities
//!
//! Shared repository/config resolution for command handlers.

use std::path::{Path, PathBuf};

use crate::config::{Config, ConfigLoader};
use crate::types::Result;

/// Command execution context
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Repository root being analyzed
    pub root: PathBuf,
    /// Effective configuration
    pub config: Config,
}

impl CommandContext {
    /// Resolve the repository root (default `.`) and its configuration.
    ///
    /// An explicit `config_file` replaces the global/repository lookup.
    pub fn load(path: Option<PathBuf>, config_file: Option<&Path>) -> Result<Self> {
        let root = path.unwrap_or_else(|| PathBuf::from("."));
        let config = match config_file {
            Some(file) => ConfigLoader::load_from_file(file)?,
            None => ConfigLoader::load(&root)?,
        };
        Ok(Self { root, config })
    }
}
