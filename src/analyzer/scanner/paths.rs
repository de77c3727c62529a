//! Path convention helpers shared by the classifier and detectors.
//!
//! All inputs are repository-relative, `/`-separated paths.

/// Extensions of component files that render UI
pub const UI_EXTENSIONS: &[&str] = &["tsx", "jsx", "vue", "svelte", "html", "dart"];

/// Extensions of script files that may hold logic (JS/TS family)
pub const SCRIPT_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "mjs", "cjs", "vue", "svelte"];

/// Extensions of server-side handler files
pub const HANDLER_EXTENSIONS: &[&str] = &[
    "ts", "js", "mjs", "cjs", "py", "rb", "go", "java", "kt", "php",
];

/// Single-file declarative schema names
pub const SCHEMA_FILE_NAMES: &[&str] = &["schema.prisma", "schema.graphql", "schema.gql"];

pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Lowercased extension without the dot
pub fn extension(path: &str) -> Option<String> {
    let name = file_name(path);
    name.rsplit_once('.')
        .filter(|(stem, _)| !stem.is_empty())
        .map(|(_, ext)| ext.to_ascii_lowercase())
}

/// File name without its final extension
pub fn stem(path: &str) -> &str {
    let name = file_name(path);
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    }
}

pub fn has_extension(path: &str, allowed: &[&str]) -> bool {
    extension(path)
        .map(|ext| allowed.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Directory segments of a path (file name excluded)
pub fn dir_segments(path: &str) -> Vec<&str> {
    let mut segments: Vec<&str> = path.split('/').collect();
    segments.pop();
    segments
}

/// Whether any directory segment equals `name`
pub fn has_dir(path: &str, name: &str) -> bool {
    dir_segments(path).iter().any(|s| s.eq_ignore_ascii_case(name))
}

pub fn is_test_file(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    lower.contains(".test.")
        || lower.contains(".spec.")
        || lower.contains("__tests__/")
        || lower.starts_with("test/")
        || lower.starts_with("tests/")
        || lower.contains("/test/")
        || lower.contains("/tests/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_and_stem() {
        assert_eq!(extension("app/page.tsx").as_deref(), Some("tsx"));
        assert_eq!(extension("Makefile"), None);
        assert_eq!(extension(".env"), None);
        assert_eq!(stem("src/routes/+page.svelte"), "+page");
        assert_eq!(stem("types.d.ts"), "types.d");
    }

    #[test]
    fn test_dir_segments() {
        assert_eq!(dir_segments("a/b/c.ts"), vec!["a", "b"]);
        assert!(dir_segments("c.ts").is_empty());
        assert!(has_dir("src/pages/index.tsx", "pages"));
        assert!(!has_dir("src/pages.tsx", "pages"));
    }

    #[test]
    fn test_is_test_file() {
        assert!(is_test_file("src/app.test.tsx"));
        assert!(is_test_file("src/__tests__/x.ts"));
        assert!(!is_test_file("src/contest/page.tsx"));
    }
}
