//! Repository Classifier
//!
//! One walk of the tree, bucketed by path convention. A file may land in
//! several buckets (e.g. `src/api/types.ts` is both an API file and a
//! data-model file).

use std::path::Path;
use tracing::debug;

use super::file_scanner::FileScanner;
use super::paths::{
    HANDLER_EXTENSIONS, SCHEMA_FILE_NAMES, dir_segments, extension, file_name, has_dir,
    has_extension, is_test_file, stem,
};
use crate::config::AnalysisConfig;
use crate::types::{RepositoryIndex, Result};

const SCREEN_EXTENSIONS: &[&str] = &["tsx", "jsx", "js", "ts", "vue", "svelte", "dart"];
const COMPONENT_EXTENSIONS: &[&str] = &["tsx", "jsx", "vue", "svelte", "dart"];
const MODEL_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "mjs", "cjs", "py", "rb"];

const SCREEN_DIRS: &[&str] = &["screens", "views"];
const API_DIRS: &[&str] = &["api", "routes", "controllers", "handlers", "routers", "endpoints"];
const API_STEM_SUFFIXES: &[&str] = &["controller", "routes", "router", "route", "handler", "api"];
const MODEL_DIRS: &[&str] = &["models", "model", "schemas", "schema", "types", "entities", "interfaces"];
const MODEL_STEM_HINTS: &[&str] = &["model", "schema", "type", "interface", "entity"];

pub struct RepositoryClassifier {
    scanner: FileScanner,
}

impl RepositoryClassifier {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            scanner: FileScanner::new(root),
        }
    }

    pub fn from_config<P: AsRef<Path>>(root: P, config: &AnalysisConfig) -> Self {
        Self {
            scanner: FileScanner::from_config(root, config),
        }
    }

    pub fn classify(&self) -> Result<RepositoryIndex> {
        let paths = self.scanner.paths()?;
        let index = classify_paths(paths);
        debug!(
            "Classified {} files: {} screens, {} API files, {} data-model files",
            index.all_files.len(),
            index.screens.len(),
            index.api_files.len(),
            index.data_model_files.len()
        );
        Ok(index)
    }
}

/// Bucket an already-walked path list, preserving walk order in every bucket
pub fn classify_paths(paths: Vec<String>) -> RepositoryIndex {
    let mut index = RepositoryIndex::default();

    for path in &paths {
        if is_screen(path) {
            index.screens.push(path.clone());
        }
        if is_api_file(path) {
            index.api_files.push(path.clone());
        }
        if is_data_model_file(path) {
            index.data_model_files.push(path.clone());
        }
    }

    index.all_files = paths;
    index
}

pub fn is_screen(path: &str) -> bool {
    if is_test_file(path) || !has_extension(path, SCREEN_EXTENSIONS) {
        return false;
    }

    let stem = stem(path);
    let ext = extension(path).unwrap_or_default();

    // Next.js app router / SvelteKit
    if (stem == "page" && has_dir(path, "app")) || (stem == "+page" && ext == "svelte") {
        return true;
    }

    // Next.js pages router (minus API routes and _app/_document)
    if let Some(rest) = segments_after(path, "pages") {
        let under_api = rest.first().is_some_and(|s| s.eq_ignore_ascii_case("api"));
        if !under_api && !stem.starts_with('_') {
            return true;
        }
    }

    if !has_extension(path, COMPONENT_EXTENSIONS) {
        return false;
    }

    SCREEN_DIRS.iter().any(|d| has_dir(path, d))
        || (stem.len() > 4 && (stem.ends_with("Screen") || stem.ends_with("Page")))
}

pub fn is_api_file(path: &str) -> bool {
    if is_test_file(path) || !has_extension(path, HANDLER_EXTENSIONS) {
        return false;
    }

    if API_DIRS.iter().any(|d| has_dir(path, d)) {
        return true;
    }

    let stem = stem(path).to_ascii_lowercase();
    let stem = stem.trim_start_matches('+');
    API_STEM_SUFFIXES.iter().any(|s| stem.ends_with(s)) || stem == "server"
}

pub fn is_data_model_file(path: &str) -> bool {
    let name = file_name(path).to_ascii_lowercase();
    if SCHEMA_FILE_NAMES.contains(&name.as_str()) || extension(path).as_deref() == Some("prisma") {
        return true;
    }

    if is_test_file(path) || !has_extension(path, MODEL_EXTENSIONS) {
        return false;
    }

    if MODEL_DIRS.iter().any(|d| has_dir(path, d)) {
        return true;
    }

    let stem = stem(path).to_ascii_lowercase();
    MODEL_STEM_HINTS.iter().any(|h| stem.contains(h))
}

/// Directory segments following the last `marker` segment, if present
fn segments_after<'a>(path: &'a str, marker: &str) -> Option<Vec<&'a str>> {
    let segments = dir_segments(path);
    let pos = segments.iter().rposition(|s| s.eq_ignore_ascii_case(marker))?;
    Some(segments[pos + 1..].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn paths(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_screen_conventions() {
        assert!(is_screen("app/page.tsx"));
        assert!(is_screen("src/app/(marketing)/pricing/page.tsx"));
        assert!(is_screen("pages/index.tsx"));
        assert!(is_screen("src/pages/users/[id].jsx"));
        assert!(is_screen("src/routes/about/+page.svelte"));
        assert!(is_screen("src/screens/Home.tsx"));
        assert!(is_screen("src/components/SettingsPage.tsx"));

        assert!(!is_screen("pages/api/users.ts"));
        assert!(!is_screen("pages/_app.tsx"));
        assert!(!is_screen("app/layout.tsx"));
        assert!(!is_screen("src/screens/Home.test.tsx"));
        assert!(!is_screen("src/components/Button.tsx"));
    }

    #[test]
    fn test_api_conventions() {
        assert!(is_api_file("pages/api/users.ts"));
        assert!(is_api_file("app/api/orders/route.ts"));
        assert!(is_api_file("server/controllers/user.js"));
        assert!(is_api_file("src/userController.ts"));
        assert!(is_api_file("src/routes/items/+server.ts"));
        assert!(is_api_file("app/routers/items.py"));

        assert!(!is_api_file("src/components/Api.tsx"));
        assert!(!is_api_file("src/routes/+page.svelte"));
        assert!(!is_api_file("src/utils/format.ts"));
    }

    #[test]
    fn test_data_model_conventions() {
        assert!(is_data_model_file("prisma/schema.prisma"));
        assert!(is_data_model_file("src/models/User.js"));
        assert!(is_data_model_file("src/types.ts"));
        assert!(is_data_model_file("src/user.model.ts"));
        assert!(is_data_model_file("src/interfaces/order.ts"));

        assert!(!is_data_model_file("src/utils/format.ts"));
        assert!(!is_data_model_file("src/models/user.test.ts"));
    }

    #[test]
    fn test_file_in_multiple_buckets() {
        let index = classify_paths(paths(&["src/api/types.ts", "README.md"]));
        assert_eq!(index.api_files, vec!["src/api/types.ts"]);
        assert_eq!(index.data_model_files, vec!["src/api/types.ts"]);
        assert_eq!(index.all_files.len(), 2);
    }

    #[test]
    fn test_classify_walks_root() {
        let temp = TempDir::new().unwrap();
        for rel in ["app/page.tsx", "app/api/health/route.ts", "node_modules/x/page.tsx"] {
            let path = temp.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "export default function X() {}").unwrap();
        }

        let index = RepositoryClassifier::new(temp.path()).classify().unwrap();
        assert_eq!(index.screens, vec!["app/page.tsx"]);
        assert_eq!(index.api_files, vec!["app/api/health/route.ts"]);
        assert_eq!(index.all_files.len(), 2);
    }
}
