//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/codesurface/config.toml)
//! 3. Repository config (<repo>/.codesurface.toml)
//! 4. Environment variables (CODESURFACE_* prefix, `__` between sections)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::env;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::types::Config;
use crate::types::{Result, SurfaceError};

/// Repository-local config file name
pub const PROJECT_CONFIG_FILE: &str = ".codesurface.toml";

/// Environment variable prefix
pub const ENV_PREFIX: &str = "CODESURFACE_";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain using Figment:
    /// defaults → global → repository → env vars
    pub fn load(repo_root: &Path) -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(&global_path));
        }

        let project_path = Self::project_config_path(repo_root);
        if project_path.exists() {
            debug!("Loading project config from: {}", project_path.display());
            figment = figment.merge(Toml::file(&project_path));
        }

        // CODESURFACE_EVIDENCE__TOKEN_BUDGET -> evidence.token_budget
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__").lowercase(true));

        Self::extract(figment)
    }

    /// Load configuration from a specific file only (plus env overrides)
    pub fn load_from_file(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Err(SurfaceError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__").lowercase(true));

        Self::extract(figment)
    }

    fn extract(figment: Figment) -> Result<Config> {
        let config: Config = figment
            .extract()
            .map_err(|e| SurfaceError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to global config directory (~/.config/codesurface/)
    pub fn global_dir() -> Option<PathBuf> {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".config"))
            })
            .map(|p| p.join("codesurface"))
    }

    /// Get path to global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    /// Get path to the repository config file
    pub fn project_config_path(repo_root: &Path) -> PathBuf {
        repo_root.join(PROJECT_CONFIG_FILE)
    }

    /// Render configuration for display
    pub fn render(config: &Config, as_json: bool) -> Result<String> {
        if as_json {
            Ok(serde_json::to_string_pretty(config)?)
        } else {
            toml::to_string_pretty(config).map_err(|e| SurfaceError::Config(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("custom.toml");
        fs::write(
            &path,
            r#"
[evidence]
token_budget = 1234

[evidence.priorities]
config_file = 95
"#,
        )
        .unwrap();

        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(config.evidence.token_budget, 1234);
        assert_eq!(config.evidence.chars_per_token, 4);
        assert_eq!(config.evidence.priorities.get("config_file"), Some(&95));
    }

    #[test]
    fn test_load_from_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = ConfigLoader::load_from_file(&temp_dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, SurfaceError::Config(_)));
    }

    #[test]
    fn test_invalid_file_value_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.toml");
        fs::write(&path, "[evidence]\nchars_per_token = 0\n").unwrap();
        assert!(ConfigLoader::load_from_file(&path).is_err());
    }

    #[test]
    fn test_project_config_path() {
        let root = Path::new("/repo");
        assert_eq!(
            ConfigLoader::project_config_path(root),
            PathBuf::from("/repo/.codesurface.toml")
        );
    }

    #[test]
    fn test_render_toml() {
        let rendered = ConfigLoader::render(&Config::default(), false).unwrap();
        assert!(rendered.contains("[evidence]"));
        assert!(rendered.contains("token_budget"));
    }
}
