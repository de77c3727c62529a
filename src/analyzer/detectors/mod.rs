//! Pattern Detectors
//!
//! Five independent, stateless detectors. Each one is a pure function of the
//! repository index and file contents, tolerant of per-file failure: a file
//! that cannot be read is skipped and never reduces findings from other files.
//!
//! - [`navigation`]: routes from file-based routing, nav markup, router configs
//! - [`api`]: server routes plus client call sites
//! - [`data_model`]: interfaces, type aliases, schema builders, Prisma blocks
//! - [`state`]: six state-management idioms
//! - [`events`]: UI event bindings over a bounded sample of files

pub mod api;
pub mod data_model;
pub mod events;
pub mod navigation;
pub mod state;

pub use api::ApiDetector;
pub use data_model::DataModelDetector;
pub use events::EventDetector;
pub use navigation::NavigationDetector;
pub use state::StateDetector;

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants::scan;
use crate::types::RepositoryIndex;

/// Common contract for all pattern detectors
pub trait Detector {
    type Finding;

    fn name(&self) -> &'static str;

    /// Side-effect free; unreadable files are skipped
    fn detect(&self, source: &SourceReader, index: &RepositoryIndex) -> Vec<Self::Finding>;
}

// =============================================================================
// Source Reader
// =============================================================================

/// Reads repository files by relative path, turning every failure into `None`.
pub struct SourceReader {
    root: PathBuf,
    max_file_size: u64,
}

impl SourceReader {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            max_file_size: scan::DEFAULT_MAX_FILE_SIZE,
        }
    }

    pub fn with_max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn read(&self, rel_path: &str) -> Option<String> {
        let path = self.root.join(rel_path);

        match fs::metadata(&path) {
            Ok(meta) if meta.len() > self.max_file_size => {
                debug!("Skipping oversized file {} ({} bytes)", rel_path, meta.len());
                return None;
            }
            Err(e) => {
                debug!("Skipping unreadable file {}: {}", rel_path, e);
                return None;
            }
            _ => {}
        }

        match fs::read_to_string(&path) {
            Ok(content) => Some(content),
            Err(e) => {
                debug!("Skipping unreadable file {}: {}", rel_path, e);
                None
            }
        }
    }
}

// =============================================================================
// Text Helpers
// =============================================================================

/// Body of the brace block opened at byte `open` (exclusive of the braces).
///
/// Braces inside string literals are not special-cased; this is a heuristic.
pub(crate) fn brace_block(content: &str, open: usize) -> Option<&str> {
    let bytes = content.as_bytes();
    if bytes.get(open) != Some(&b'{') {
        return None;
    }

    let mut depth = 0usize;
    for (i, &b) in bytes.iter().enumerate().skip(open) {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&content[open + 1..i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split a block body on top-level commas/newlines (nested `{}`, `[]`, `()`, `<>` kept intact).
///
/// `//` and `/* */` comments are dropped. Quoted strings are copied verbatim and
/// never affect nesting. Depth never goes below zero, so a stray `>` is inert.
pub(crate) fn split_top_level(body: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0u32;
    let mut prev = '\0';
    let mut chars = body.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '/' if chars.peek() == Some(&'/') => {
                while chars.next_if(|&c| c != '\n').is_some() {}
                continue;
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut last = '\0';
                for c in chars.by_ref() {
                    if last == '*' && c == '/' {
                        break;
                    }
                    last = c;
                }
                current.push(' ');
                continue;
            }
            '"' | '\'' | '`' => {
                current.push(ch);
                let mut escaped = false;
                for c in chars.by_ref() {
                    current.push(c);
                    if escaped {
                        escaped = false;
                    } else if c == '\\' {
                        escaped = true;
                    } else if c == ch {
                        break;
                    }
                }
                prev = ch;
                continue;
            }
            // arrow in a function type, not a closing generic
            '>' if prev == '=' => {}
            '{' | '[' | '(' | '<' => depth += 1,
            '}' | ']' | ')' | '>' => depth = depth.saturating_sub(1),
            ',' | ';' | '\n' if depth == 0 => {
                push_part(&mut parts, &mut current);
                prev = ch;
                continue;
            }
            _ => {}
        }
        current.push(ch);
        prev = ch;
    }

    push_part(&mut parts, &mut current);
    parts
}

fn push_part(parts: &mut Vec<String>, current: &mut String) {
    let part = current.trim();
    if !part.is_empty() {
        parts.push(part.to_string());
    }
    current.clear();
}

/// Push `value` unless already present (order-preserving dedup)
pub(crate) fn push_unique(list: &mut Vec<String>, value: impl Into<String>) {
    let value = value.into();
    if !list.contains(&value) {
        list.push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_brace_block_nested() {
        let src = "interface A { b: { c: string }; d: number }";
        let open = src.find('{').unwrap();
        assert_eq!(brace_block(src, open), Some(" b: { c: string }; d: number "));
        assert_eq!(brace_block("{ unclosed", 0), None);
        assert_eq!(brace_block("x", 0), None);
    }

    #[test]
    fn test_split_top_level() {
        let parts = split_top_level("a: String, b: { type: Number, required: true },\n c: [Tag]");
        assert_eq!(parts, vec!["a: String", "b: { type: Number, required: true }", "c: [Tag]"]);

        let parts = split_top_level("onClick: () => void; items: Map<string, Item>");
        assert_eq!(parts, vec!["onClick: () => void", "items: Map<string, Item>"]);
    }

    #[test]
    fn test_split_ignores_comments_and_strings() {
        let parts = split_top_level("// age must be < 150\n id: string;\n age: number;");
        assert_eq!(parts, vec!["id: string", "age: number"]);

        let parts = split_top_level("/* a, b > c */ id: string, label: \"x, <y>\"\n");
        assert_eq!(parts, vec!["id: string", "label: \"x, <y>\""]);
    }

    #[test]
    fn test_split_stray_close_does_not_go_negative() {
        let parts = split_top_level("a > b, items: Map<string, Item>");
        assert_eq!(parts, vec!["a > b", "items: Map<string, Item>"]);
    }

    #[test]
    fn test_reader_skips_missing_and_binary() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("ok.ts"), "const a = 1;").unwrap();
        fs::write(temp.path().join("bin.ts"), [0xff, 0xfe, 0x00, 0x80]).unwrap();

        let reader = SourceReader::new(temp.path());
        assert_eq!(reader.read("ok.ts").as_deref(), Some("const a = 1;"));
        assert!(reader.read("bin.ts").is_none());
        assert!(reader.read("missing.ts").is_none());
    }

    #[test]
    fn test_reader_respects_size_cap() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("big.ts"), "x".repeat(64)).unwrap();
        let reader = SourceReader::new(temp.path()).with_max_file_size(10);
        assert!(reader.read("big.ts").is_none());
    }
}
