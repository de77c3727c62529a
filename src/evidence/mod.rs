//! Evidence Module
//!
//! Auxiliary free-text context for downstream summarization:
//! - [`collector`]: gathers typed evidence documents from a repository
//! - [`chunker`]: ranks and fits them into a token budget
//! - [`tokenizer`]: character-ratio token estimation

pub mod chunker;
pub mod collector;
pub mod tokenizer;

pub use chunker::{ChunkedEvidenceSet, EvidenceChunker, PriorityTable, truncation_marker};
pub use collector::{EvidenceCollector, code_summary};
pub use tokenizer::{TokenBudget, TokenCounter};
