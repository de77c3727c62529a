//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/codesurface/) and per-repository (.codesurface.toml) configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::constants::{evidence as evidence_constants, scan};
use crate::types::{Result, SurfaceError};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Repository walk settings
    pub analysis: AnalysisConfig,

    /// Evidence collection and chunking settings
    pub evidence: EvidenceConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            analysis: AnalysisConfig::default(),
            evidence: EvidenceConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `SurfaceError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if self.evidence.chars_per_token == 0 {
            return Err(SurfaceError::Config(
                "evidence.chars_per_token must be greater than 0".to_string(),
            ));
        }

        if self.evidence.token_budget == 0 {
            return Err(SurfaceError::Config(
                "evidence.token_budget must be greater than 0".to_string(),
            ));
        }

        if self.analysis.max_file_size == 0 {
            return Err(SurfaceError::Config(
                "analysis.max_file_size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// Analysis Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Directory names skipped anywhere in the tree
    pub excluded_dirs: Vec<String>,

    /// Maximum file size in bytes a detector will read
    pub max_file_size: u64,

    /// Honor .gitignore files while walking
    pub respect_gitignore: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            excluded_dirs: scan::DEFAULT_EXCLUDED_DIRS
                .iter()
                .map(|d| d.to_string())
                .collect(),
            max_file_size: scan::DEFAULT_MAX_FILE_SIZE,
            respect_gitignore: true,
        }
    }
}

// =============================================================================
// Evidence Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvidenceConfig {
    /// Token ceiling for a chunking call
    pub token_budget: usize,

    /// Characters per estimated token
    pub chars_per_token: usize,

    /// Remaining budget below which the boundary document is dropped
    pub min_useful_tokens: usize,

    /// Maximum docs/ files collected
    pub max_docs_files: usize,

    /// Per-document content cap (characters)
    pub max_document_chars: usize,

    /// Priority overrides keyed by evidence type name (e.g. `config_file = 60`)
    pub priorities: BTreeMap<String, u32>,
}

impl Default for EvidenceConfig {
    fn default() -> Self {
        Self {
            token_budget: evidence_constants::DEFAULT_TOKEN_BUDGET,
            chars_per_token: evidence_constants::DEFAULT_CHARS_PER_TOKEN,
            min_useful_tokens: evidence_constants::DEFAULT_MIN_USEFUL_TOKENS,
            max_docs_files: evidence_constants::DEFAULT_MAX_DOCS_FILES,
            max_document_chars: evidence_constants::DEFAULT_MAX_DOCUMENT_CHARS,
            priorities: BTreeMap::new(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.evidence.chars_per_token, 4);
        assert!(config.analysis.excluded_dirs.iter().any(|d| d == "node_modules"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_ratio() {
        let mut config = Config::default();
        config.evidence.chars_per_token = 0;
        assert!(matches!(config.validate(), Err(SurfaceError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_budget() {
        let mut config = Config::default();
        config.evidence.token_budget = 0;
        assert!(config.validate().is_err());
    }
}
