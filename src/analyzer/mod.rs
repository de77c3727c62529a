//! Code Analyzer Module
//!
//! Static, text-only extraction of a repository's user-facing surface:
//! - File classification by path convention
//! - Five pattern detectors (navigation, API, data model, state, events)
//! - Tier-1 aggregation into one technical model

pub mod aggregator;
pub mod detectors;
pub mod scanner;

pub use aggregator::{Tier1Aggregator, aggregate};
pub use detectors::{Detector, SourceReader};
pub use scanner::{FileScanner, RepositoryClassifier};
