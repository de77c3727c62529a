//! State-Pattern Detector
//!
//! One [`StateRecognizer`] per state-management idiom. A recognizer only runs
//! its structural patterns when the file mentions the idiom's import or
//! keyword, and reports nothing when no store name is found.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

use super::{Detector, SourceReader, brace_block, push_unique};
use crate::analyzer::scanner::paths::{SCRIPT_EXTENSIONS, has_extension, is_test_file};
use crate::types::{RepositoryIndex, StateKind, StatePattern};

// ---------------------------------------------------------------------------
// Regex patterns (compiled once via LazyLock)
// ---------------------------------------------------------------------------

static REDUX_SLICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"createSlice\(\s*\{\s*name\s*:\s*["'`]([\w\-/]+)["'`]"#).expect("valid regex literal")
});

static ZUSTAND_STORE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:const|let)\s+(use\w+)\s*=\s*create(?:<[^>]*>)?\(").expect("valid regex literal")
});

static CONTEXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:const|let)\s+(\w+)\s*=\s*(?:React\.)?createContext\b").expect("valid regex literal")
});

static CLASS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"class\s+(\w+)[^{]*\{").expect("valid regex literal")
});

static MOBX_OBJECT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:const|let)\s+(\w+)\s*=\s*observable\(").expect("valid regex literal")
});

static QUERY_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:queryKey\s*:\s*|use(?:Infinite)?Query\(\s*)\[\s*["'`]([\w\-/]+)["'`]"#)
        .expect("valid regex literal")
});

static ATOM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:const|let)\s+(\w+)\s*=\s*(?:atom|atomFamily|atomWithStorage|selector)(?:<[^>]*>)?\(")
        .expect("valid regex literal")
});

const MOBX_MARKERS: &[&str] = &["makeAutoObservable", "makeObservable", "@observable", "observable."];

/// One state-management idiom
pub trait StateRecognizer: Send + Sync {
    fn kind(&self) -> StateKind;

    /// Cheap keyword check run before any structural pattern
    fn applies(&self, content: &str) -> bool;

    /// Named stores/slices/atoms declared in the file
    fn stores(&self, content: &str) -> Vec<String>;

    fn recognize(&self, location: &str, content: &str) -> Option<StatePattern> {
        if !self.applies(content) {
            return None;
        }
        let stores = self.stores(content);
        if stores.is_empty() {
            return None;
        }
        Some(StatePattern {
            kind: self.kind(),
            stores,
            location: location.to_string(),
        })
    }
}

fn captures(re: &Regex, content: &str) -> Vec<String> {
    let mut names = Vec::new();
    for cap in re.captures_iter(content) {
        push_unique(&mut names, &cap[1]);
    }
    names
}

pub struct ReduxRecognizer;

impl StateRecognizer for ReduxRecognizer {
    fn kind(&self) -> StateKind {
        StateKind::Redux
    }

    fn applies(&self, content: &str) -> bool {
        content.contains("createSlice") || content.contains("@reduxjs/toolkit")
    }

    fn stores(&self, content: &str) -> Vec<String> {
        captures(&REDUX_SLICE_RE, content)
    }
}

pub struct ZustandRecognizer;

impl StateRecognizer for ZustandRecognizer {
    fn kind(&self) -> StateKind {
        StateKind::Zustand
    }

    fn applies(&self, content: &str) -> bool {
        content.contains("zustand")
    }

    fn stores(&self, content: &str) -> Vec<String> {
        captures(&ZUSTAND_STORE_RE, content)
    }
}

pub struct ContextRecognizer;

impl StateRecognizer for ContextRecognizer {
    fn kind(&self) -> StateKind {
        StateKind::Context
    }

    fn applies(&self, content: &str) -> bool {
        content.contains("createContext")
    }

    fn stores(&self, content: &str) -> Vec<String> {
        captures(&CONTEXT_RE, content)
    }
}

/// Observable classes plus `observable({...})` objects
pub struct MobxRecognizer;

impl StateRecognizer for MobxRecognizer {
    fn kind(&self) -> StateKind {
        StateKind::Mobx
    }

    fn applies(&self, content: &str) -> bool {
        content.contains("mobx")
    }

    fn stores(&self, content: &str) -> Vec<String> {
        let mut names = Vec::new();
        for cap in CLASS_RE.captures_iter(content) {
            let open = cap.get(0).map_or(0, |m| m.end() - 1);
            let observable = brace_block(content, open)
                .is_some_and(|body| MOBX_MARKERS.iter().any(|m| body.contains(m)));
            if observable {
                push_unique(&mut names, &cap[1]);
            }
        }
        for name in captures(&MOBX_OBJECT_RE, content) {
            push_unique(&mut names, name);
        }
        names
    }
}

pub struct ReactQueryRecognizer;

impl StateRecognizer for ReactQueryRecognizer {
    fn kind(&self) -> StateKind {
        StateKind::ReactQuery
    }

    fn applies(&self, content: &str) -> bool {
        content.contains("react-query") || content.contains("@tanstack/")
    }

    fn stores(&self, content: &str) -> Vec<String> {
        captures(&QUERY_KEY_RE, content)
    }
}

/// Recoil and Jotai atoms
pub struct AtomRecognizer;

impl StateRecognizer for AtomRecognizer {
    fn kind(&self) -> StateKind {
        StateKind::Atom
    }

    fn applies(&self, content: &str) -> bool {
        content.contains("recoil") || content.contains("jotai")
    }

    fn stores(&self, content: &str) -> Vec<String> {
        captures(&ATOM_RE, content)
    }
}

// =============================================================================
// Detector
// =============================================================================

pub struct StateDetector {
    recognizers: Vec<Box<dyn StateRecognizer>>,
}

impl Default for StateDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl StateDetector {
    pub fn new() -> Self {
        Self {
            recognizers: vec![
                Box::new(ReduxRecognizer),
                Box::new(ZustandRecognizer),
                Box::new(ContextRecognizer),
                Box::new(MobxRecognizer),
                Box::new(ReactQueryRecognizer),
                Box::new(AtomRecognizer),
            ],
        }
    }

    pub fn scan(&self, location: &str, content: &str) -> Vec<StatePattern> {
        self.recognizers
            .iter()
            .filter_map(|r| r.recognize(location, content))
            .collect()
    }

    /// Keep the first pattern per `(type, location)`
    pub fn dedup_by_location(patterns: Vec<StatePattern>) -> Vec<StatePattern> {
        let mut seen = HashSet::new();
        patterns
            .into_iter()
            .filter(|p| seen.insert((p.kind, p.location.clone())))
            .collect()
    }
}

impl Detector for StateDetector {
    type Finding = StatePattern;

    fn name(&self) -> &'static str {
        "state"
    }

    fn detect(&self, source: &SourceReader, index: &RepositoryIndex) -> Vec<StatePattern> {
        let mut patterns = Vec::new();

        for path in &index.all_files {
            if is_test_file(path) || !has_extension(path, SCRIPT_EXTENSIONS) {
                continue;
            }
            if let Some(content) = source.read(path) {
                patterns.extend(self.scan(path, &content));
            }
        }

        debug!("State detector: {} patterns", patterns.len());
        Self::dedup_by_location(patterns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::scanner::classify_paths;
    use std::fs;
    use tempfile::TempDir;

    fn kinds(patterns: &[StatePattern]) -> Vec<StateKind> {
        patterns.iter().map(|p| p.kind).collect()
    }

    #[test]
    fn test_redux_slice() {
        let content = r#"const cartSlice = createSlice({name: "cart", initialState, reducers: {}});"#;
        let found = StateDetector::new().scan("src/store/cart.ts", content);
        assert_eq!(
            found,
            vec![StatePattern {
                kind: StateKind::Redux,
                stores: vec!["cart".to_string()],
                location: "src/store/cart.ts".to_string(),
            }]
        );
    }

    #[test]
    fn test_no_keyword_no_patterns() {
        let content = "const useThing = create(() => ({}));\nconst [items, setItems] = useState([]);";
        assert!(StateDetector::new().scan("src/hooks.ts", content).is_empty());
    }

    #[test]
    fn test_zustand_and_context() {
        let content = r#"
import { create } from "zustand";
import { createContext } from "react";
export const useCartStore = create<CartState>()((set) => ({ items: [] }));
export const ThemeContext = React.createContext("light");
"#;
        let found = StateDetector::new().scan("src/state.ts", content);
        assert_eq!(kinds(&found), vec![StateKind::Zustand, StateKind::Context]);
        assert_eq!(found[0].stores, vec!["useCartStore"]);
        assert_eq!(found[1].stores, vec!["ThemeContext"]);
    }

    #[test]
    fn test_mobx_query_and_atoms() {
        let mobx = r#"
import { makeAutoObservable } from "mobx";
class TodoStore { todos = []; constructor() { makeAutoObservable(this); } }
class Helper { run() {} }
"#;
        let found = StateDetector::new().scan("src/todo.ts", mobx);
        assert_eq!(found[0].kind, StateKind::Mobx);
        assert_eq!(found[0].stores, vec!["TodoStore"]);

        let query = r#"import { useQuery } from "@tanstack/react-query";
const q = useQuery({ queryKey: ["orders", page], queryFn });"#;
        let found = StateDetector::new().scan("src/orders.ts", query);
        assert_eq!(found[0].kind, StateKind::ReactQuery);
        assert_eq!(found[0].stores, vec!["orders"]);

        let atoms = r#"import { atom } from "jotai";
export const countAtom = atom(0);"#;
        let found = StateDetector::new().scan("src/atoms.ts", atoms);
        assert_eq!(found[0].kind, StateKind::Atom);
        assert_eq!(found[0].stores, vec!["countAtom"]);
    }

    #[test]
    fn test_dedup_by_type_and_location() {
        let p = |kind, loc: &str| StatePattern {
            kind,
            stores: vec!["x".into()],
            location: loc.into(),
        };
        let deduped = StateDetector::dedup_by_location(vec![
            p(StateKind::Redux, "a.ts"),
            p(StateKind::Redux, "a.ts"),
            p(StateKind::Redux, "b.ts"),
            p(StateKind::Context, "a.ts"),
        ]);
        assert_eq!(deduped.len(), 3);
    }

    #[test]
    fn test_detect_over_repository() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("src")).unwrap();
        fs::write(temp.path().join("src/cart.ts"), r#"createSlice({ name: 'cart' })"#).unwrap();
        fs::write(temp.path().join("src/user.ts"), r#"createSlice({ name: 'user' })"#).unwrap();
        fs::write(temp.path().join("src/cart.test.ts"), r#"createSlice({ name: 'mock' })"#).unwrap();

        let index = classify_paths(vec![
            "src/cart.test.ts".to_string(),
            "src/cart.ts".to_string(),
            "src/missing.ts".to_string(),
            "src/user.ts".to_string(),
        ]);
        let found = StateDetector::new().detect(&SourceReader::new(temp.path()), &index);
        let stores: Vec<&str> = found.iter().map(|p| p.stores[0].as_str()).collect();
        assert_eq!(stores, vec!["cart", "user"]);
    }
}
