//! Configuration Management
//!
//! Unified configuration system with hierarchical resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/codesurface/config.toml)
//! 3. Repository config (<repo>/.codesurface.toml)
//! 4. Environment variables (CODESURFACE_*)
//! 5. CLI arguments (highest priority)

mod loader;
mod types;

pub use loader::{ConfigLoader, ENV_PREFIX, PROJECT_CONFIG_FILE};
pub use types::*;
