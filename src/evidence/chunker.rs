//! Evidence Prioritizer / Chunker
//!
//! Fits an evidence list into a token budget:
//!
//! 1. Rank each document by its type's priority (unknown types rank 0)
//! 2. Stable-sort descending, so equal priorities keep input order
//! 3. Greedily accept whole documents while they fit
//! 4. At the first document that overflows, truncate it to the remaining
//!    budget (or drop it when the remainder is below the usefulness threshold)
//!    and stop. Later documents are never considered.
//!
//! The result is always a prefix of the priority-sorted input.

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BTreeMap;
use tracing::{debug, info};

use super::tokenizer::{TokenBudget, TokenCounter};
use crate::config::EvidenceConfig;
use crate::constants::evidence::{DEFAULT_MIN_USEFUL_TOKENS, priority};
use crate::types::{EvidenceDocument, EvidenceType, Result};

/// Marker appended to a truncated document
pub fn truncation_marker(cut_chars: usize) -> String {
    format!("\n\n[... truncated {} characters to fit the token budget]", cut_chars)
}

// =============================================================================
// Priority Table
// =============================================================================

/// Evidence type → integer priority. Types absent from the table rank 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityTable {
    entries: BTreeMap<EvidenceType, u32>,
}

impl Default for PriorityTable {
    fn default() -> Self {
        Self::from_entries([
            (EvidenceType::UploadedBrief, priority::UPLOADED_BRIEF),
            (EvidenceType::RepoReadme, priority::REPO_README),
            (EvidenceType::DocsFile, priority::DOCS_FILE),
            (EvidenceType::PackageMetadata, priority::PACKAGE_METADATA),
            (EvidenceType::CodeSummary, priority::CODE_SUMMARY),
            (EvidenceType::ConfigFile, priority::CONFIG_FILE),
            (EvidenceType::TestFile, priority::TEST_FILE),
        ])
    }
}

impl PriorityTable {
    /// A caller-supplied table; every type it omits ranks 0
    pub fn from_entries(entries: impl IntoIterator<Item = (EvidenceType, u32)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Apply name-keyed overrides (`config_file = 60`); unknown names are ignored
    pub fn with_overrides(mut self, overrides: &BTreeMap<String, u32>) -> Self {
        for (name, value) in overrides {
            match name.parse::<EvidenceType>() {
                Ok(doc_type) => {
                    self.entries.insert(doc_type, *value);
                }
                Err(e) => debug!("Ignoring priority override: {}", e),
            }
        }
        self
    }

    pub fn priority(&self, doc_type: EvidenceType) -> u32 {
        self.entries.get(&doc_type).copied().unwrap_or(0)
    }
}

// =============================================================================
// Chunked Set
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkedEvidenceSet {
    pub documents: Vec<EvidenceDocument>,
    pub estimated_tokens: usize,
    pub token_budget: usize,
    pub total_documents: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncated_id: Option<String>,
}

impl ChunkedEvidenceSet {
    pub fn kept(&self) -> usize {
        self.documents.len()
    }

    pub fn dropped(&self) -> usize {
        self.total_documents - self.documents.len()
    }
}

// =============================================================================
// Chunker
// =============================================================================

pub struct EvidenceChunker {
    priorities: PriorityTable,
    counter: TokenCounter,
    min_useful_tokens: usize,
}

impl Default for EvidenceChunker {
    fn default() -> Self {
        Self {
            priorities: PriorityTable::default(),
            counter: TokenCounter::default(),
            min_useful_tokens: DEFAULT_MIN_USEFUL_TOKENS,
        }
    }
}

impl EvidenceChunker {
    pub fn new(chars_per_token: usize) -> Result<Self> {
        Ok(Self {
            counter: TokenCounter::new(chars_per_token)?,
            ..Self::default()
        })
    }

    pub fn from_config(config: &EvidenceConfig) -> Result<Self> {
        Ok(Self {
            priorities: PriorityTable::default().with_overrides(&config.priorities),
            counter: TokenCounter::new(config.chars_per_token)?,
            min_useful_tokens: config.min_useful_tokens,
        })
    }

    pub fn with_priorities(mut self, priorities: PriorityTable) -> Self {
        self.priorities = priorities;
        self
    }

    pub fn with_min_useful_tokens(mut self, tokens: usize) -> Self {
        self.min_useful_tokens = tokens;
        self
    }

    pub fn counter(&self) -> &TokenCounter {
        &self.counter
    }

    /// Documents in chunking order (stable, priority descending)
    pub fn prioritize(&self, mut documents: Vec<EvidenceDocument>) -> Vec<EvidenceDocument> {
        documents.sort_by_key(|doc| Reverse(self.priorities.priority(doc.doc_type)));
        documents
    }

    pub fn chunk(&self, documents: Vec<EvidenceDocument>, token_budget: usize) -> ChunkedEvidenceSet {
        let total_documents = documents.len();
        let mut budget = TokenBudget::new(token_budget);
        let mut kept = Vec::new();
        let mut truncated_id = None;

        for doc in self.prioritize(documents) {
            let cost = self.counter.count(&doc.content);
            if budget.try_add(cost) {
                kept.push(doc);
                continue;
            }

            // First overflow: truncate or drop, then stop
            if budget.has_room(self.min_useful_tokens)
                && let Some(truncated) = self.truncate(&doc, budget.remaining())
            {
                let added = budget.try_add(self.counter.count(&truncated.content));
                debug_assert!(added);
                truncated_id = Some(truncated.id.clone());
                kept.push(truncated);
            } else {
                debug!("Dropping '{}' ({} tokens, {} remaining)", doc.id, cost, budget.remaining());
            }
            break;
        }

        info!(
            "Evidence chunking kept {}/{} documents, ~{} tokens (limit {})",
            kept.len(),
            total_documents,
            budget.current(),
            token_budget
        );

        ChunkedEvidenceSet {
            documents: kept,
            estimated_tokens: budget.current(),
            token_budget,
            total_documents,
            truncated_id,
        }
    }

    /// Cut `doc` so content plus marker fits in `remaining_tokens`.
    ///
    /// `None` when not even the marker fits.
    fn truncate(&self, doc: &EvidenceDocument, remaining_tokens: usize) -> Option<EvidenceDocument> {
        let capacity = self.counter.char_capacity(remaining_tokens);
        let total_chars = doc.char_len();

        // The marker's number never has more digits than the total length
        let marker_upper = truncation_marker(total_chars).chars().count();
        if capacity <= marker_upper {
            return None;
        }
        let keep = (capacity - marker_upper).min(total_chars);
        let cut = total_chars - keep;

        let byte_end = doc
            .content
            .char_indices()
            .nth(keep)
            .map_or(doc.content.len(), |(i, _)| i);

        let mut content = String::with_capacity(byte_end + marker_upper);
        content.push_str(&doc.content[..byte_end]);
        content.push_str(&truncation_marker(cut));

        Some(EvidenceDocument {
            content,
            ..doc.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn doc(id: &str, doc_type: EvidenceType, len: usize) -> EvidenceDocument {
        EvidenceDocument::new(id, doc_type, id, "x".repeat(len))
    }

    fn ids(set: &ChunkedEvidenceSet) -> Vec<&str> {
        set.documents.iter().map(|d| d.id.as_str()).collect()
    }

    #[test]
    fn test_budget_for_two_documents_keeps_top_two() {
        let docs = vec![
            doc("test", EvidenceType::TestFile, 1000),
            doc("brief", EvidenceType::UploadedBrief, 1000),
            doc("readme", EvidenceType::RepoReadme, 1000),
            doc("config", EvidenceType::ConfigFile, 1000),
        ];
        let set = EvidenceChunker::default().chunk(docs, 500);

        assert_eq!(ids(&set), vec!["brief", "readme"]);
        assert_eq!(set.estimated_tokens, 500);
        assert_eq!(set.total_documents, 4);
        assert_eq!(set.dropped(), 2);
        assert!(set.truncated_id.is_none());
    }

    #[test]
    fn test_boundary_document_truncated() {
        let docs = vec![
            doc("readme", EvidenceType::RepoReadme, 1000),
            doc("docs", EvidenceType::DocsFile, 2000),
            doc("tiny", EvidenceType::TestFile, 4),
        ];
        let set = EvidenceChunker::default().chunk(docs, 400);

        assert_eq!(ids(&set), vec!["readme", "docs"]);
        assert_eq!(set.truncated_id.as_deref(), Some("docs"));
        assert!(set.estimated_tokens <= 400);

        let truncated = &set.documents[1].content;
        assert!(truncated.ends_with("to fit the token budget]"));
        let marker_start = truncated.find("\n\n[... truncated").unwrap();
        let kept = &truncated[..marker_start];
        assert!(kept.chars().all(|c| c == 'x'));
        assert_eq!(truncated, &format!("{}{}", kept, truncation_marker(2000 - kept.len())));
        assert!(kept.len() <= 150 * 4);
    }

    #[test]
    fn test_small_remainder_dropped_and_iteration_stops() {
        let docs = vec![
            doc("readme", EvidenceType::RepoReadme, 1800),
            doc("docs", EvidenceType::DocsFile, 1000),
            doc("tiny", EvidenceType::TestFile, 4),
        ];
        // 450 used, 30 left: below the usefulness threshold
        let set = EvidenceChunker::default().chunk(docs, 480);
        assert_eq!(ids(&set), vec!["readme"]);
        assert!(set.truncated_id.is_none());
    }

    #[test]
    fn test_unknown_type_ranks_zero_and_ties_keep_order() {
        let table = PriorityTable::from_entries([(EvidenceType::ConfigFile, 5)]);
        let chunker = EvidenceChunker::default().with_priorities(table);
        let docs = vec![
            doc("a", EvidenceType::RepoReadme, 4),
            doc("b", EvidenceType::ConfigFile, 4),
            doc("c", EvidenceType::UploadedBrief, 4),
        ];
        let ordered: Vec<String> = chunker.prioritize(docs).into_iter().map(|d| d.id).collect();
        assert_eq!(ordered, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_overrides_by_name() {
        let overrides = BTreeMap::from([("config_file".to_string(), 95), ("bogus".to_string(), 1)]);
        let table = PriorityTable::default().with_overrides(&overrides);
        assert_eq!(table.priority(EvidenceType::ConfigFile), 95);
        assert_eq!(table.priority(EvidenceType::RepoReadme), 90);
    }

    #[test]
    fn test_from_config_rejects_zero_ratio() {
        let config = EvidenceConfig {
            chars_per_token: 0,
            ..EvidenceConfig::default()
        };
        assert!(EvidenceChunker::from_config(&config).is_err());
    }

    #[test]
    fn test_empty_input() {
        let set = EvidenceChunker::default().chunk(Vec::new(), 100);
        assert_eq!(set.kept(), 0);
        assert_eq!(set.estimated_tokens, 0);
    }

    fn arb_doc() -> impl Strategy<Value = EvidenceDocument> {
        (0usize..7, "[a-zé ]{0,600}").prop_map(|(t, content)| {
            EvidenceDocument::new("", EvidenceType::ALL[t], "doc", content)
        })
    }

    proptest! {
        #[test]
        fn prop_budget_and_prefix_invariants(
            docs in prop::collection::vec(arb_doc(), 0..12),
            budget in 0usize..800,
            ratio in 1usize..8,
            min_useful in 0usize..60,
        ) {
            let docs: Vec<EvidenceDocument> = docs
                .into_iter()
                .enumerate()
                .map(|(i, d)| EvidenceDocument { id: format!("d{}", i), ..d })
                .collect();
            let chunker = EvidenceChunker::new(ratio).unwrap().with_min_useful_tokens(min_useful);
            let sorted = chunker.prioritize(docs.clone());
            let set = chunker.chunk(docs, budget);

            let counted: usize = set.documents.iter().map(|d| chunker.counter().count(&d.content)).sum();
            prop_assert_eq!(counted, set.estimated_tokens);
            prop_assert!(set.estimated_tokens <= budget);

            // Prefix of the sorted input; only the last may be truncated
            for (i, kept) in set.documents.iter().enumerate() {
                prop_assert_eq!(&kept.id, &sorted[i].id);
                if set.truncated_id.as_deref() == Some(kept.id.as_str()) {
                    prop_assert_eq!(i, set.documents.len() - 1);
                    let used_before: usize = set.documents[..i]
                        .iter()
                        .map(|d| chunker.counter().count(&d.content))
                        .sum();
                    let remaining = budget - used_before;
                    let marker_start = kept.content.rfind("\n\n[... truncated").unwrap();
                    let body_chars = kept.content[..marker_start].chars().count();
                    prop_assert!(body_chars <= remaining * ratio);
                } else {
                    prop_assert_eq!(&kept.content, &sorted[i].content);
                }
            }
        }
    }
}
