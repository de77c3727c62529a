//! codesurface - Static Repository Surface Extraction
//!
//! Walks a source repository and recovers, without executing anything, the
//! user-facing surface of the application it contains, then gathers and
//! budgets the textual evidence a downstream summarizer would read.
//!
//! ## Pipeline
//!
//! 1. **Classifier**: one walk, category-tagged path lists ([`RepositoryIndex`])
//! 2. **Detectors**: navigation, API endpoints, data model, state, events
//! 3. **Tier-1 Aggregator**: assembles the [`TechnicalModel`]
//! 4. **Evidence Collector**: README, docs, package metadata, config files, code summary
//! 5. **Evidence Chunker**: priority-ordered selection under a token budget
//!
//! ## Quick Start
//!
//! ```ignore
//! use codesurface::{EvidenceChunker, EvidenceCollector, Tier1Aggregator};
//!
//! let model = Tier1Aggregator::default().aggregate(&repo)?;
//! let docs = EvidenceCollector::new(&repo).collect(Some(&model));
//! let set = EvidenceChunker::default().chunk(docs, 30_000);
//! ```
//!
//! ## Modules
//!
//! - [`analyzer`]: classification, detectors and aggregation
//! - [`evidence`]: evidence collection, token estimation and chunking
//! - [`config`]: layered configuration
//! - [`types`]: shared model types and errors

pub mod analyzer;
pub mod cli;
pub mod config;
pub mod constants;
pub mod evidence;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{AnalysisConfig, Config, ConfigLoader, EvidenceConfig};

// Error Types
pub use types::error::{Result, SurfaceError};

// Model
pub use types::{EvidenceDocument, EvidenceType, RepositoryIndex, TechnicalModel};

// =============================================================================
// Pipeline Re-exports
// =============================================================================

pub use analyzer::{FileScanner, RepositoryClassifier, Tier1Aggregator, aggregate};
pub use evidence::{ChunkedEvidenceSet, EvidenceChunker, EvidenceCollector, TokenBudget, TokenCounter};
