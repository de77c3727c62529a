//! Evidence documents fed to the chunker

use serde::{Deserialize, Serialize};
use std::fmt;

/// Source type of an evidence document; drives chunking priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceType {
    UploadedBrief,
    RepoReadme,
    DocsFile,
    PackageMetadata,
    CodeSummary,
    ConfigFile,
    TestFile,
}

impl EvidenceType {
    pub const ALL: [EvidenceType; 7] = [
        Self::UploadedBrief,
        Self::RepoReadme,
        Self::DocsFile,
        Self::PackageMetadata,
        Self::CodeSummary,
        Self::ConfigFile,
        Self::TestFile,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UploadedBrief => "uploaded_brief",
            Self::RepoReadme => "repo_readme",
            Self::DocsFile => "docs_file",
            Self::PackageMetadata => "package_metadata",
            Self::CodeSummary => "code_summary",
            Self::ConfigFile => "config_file",
            Self::TestFile => "test_file",
        }
    }
}

impl fmt::Display for EvidenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for EvidenceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Unknown evidence type: {}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceDocument {
    pub id: String,
    #[serde(rename = "type")]
    pub doc_type: EvidenceType,
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl EvidenceDocument {
    pub fn new(
        id: impl Into<String>,
        doc_type: EvidenceType,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            doc_type,
            title: title.into(),
            content: content.into(),
            path: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Content length in characters (not bytes)
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evidence_type_names_parse() {
        for t in EvidenceType::ALL {
            assert_eq!(t.as_str().parse::<EvidenceType>().unwrap(), t);
        }
        assert!("screenshot".parse::<EvidenceType>().is_err());
    }

    #[test]
    fn test_char_len_counts_chars() {
        let doc = EvidenceDocument::new("d", EvidenceType::DocsFile, "D", "héllo");
        assert_eq!(doc.char_len(), 5);
        assert_eq!(doc.content.len(), 6);
    }
}
