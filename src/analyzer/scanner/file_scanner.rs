use ignore::{Walk, WalkBuilder};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::AnalysisConfig;
use crate::constants::scan;
use crate::types::{Result, SurfaceError};

/// Walks a repository once and lists every file outside dependency/build directories.
pub struct FileScanner {
    root: PathBuf,
    excluded_dirs: Vec<String>,
    respect_gitignore: bool,
}

impl FileScanner {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            excluded_dirs: scan::DEFAULT_EXCLUDED_DIRS
                .iter()
                .map(|d| d.to_string())
                .collect(),
            respect_gitignore: true,
        }
    }

    pub fn from_config<P: AsRef<Path>>(root: P, config: &AnalysisConfig) -> Self {
        Self::new(root)
            .with_excluded_dirs(config.excluded_dirs.clone())
            .with_gitignore(config.respect_gitignore)
    }

    pub fn with_excluded_dirs(mut self, dirs: Vec<String>) -> Self {
        self.excluded_dirs = dirs;
        self
    }

    pub fn with_gitignore(mut self, respect: bool) -> Self {
        self.respect_gitignore = respect;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Repository-relative paths (`/`-separated) in deterministic walk order.
    ///
    /// Unreadable subtrees are skipped. Only an unreadable root is an error.
    pub fn paths(&self) -> Result<Vec<String>> {
        fs::read_dir(&self.root).map_err(|e| SurfaceError::root_unreadable(&self.root, e))?;

        let mut files = Vec::new();
        for entry in self.walker() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }

            if let Some(rel) = relative_path(&self.root, entry.path()) {
                files.push(rel);
            }
        }

        Ok(files)
    }

    /// Sorted walk that never descends into excluded directories
    fn walker(&self) -> Walk {
        let root = self.root.clone();
        let excluded_dirs = self.excluded_dirs.clone();

        WalkBuilder::new(&self.root)
            .hidden(false)
            .git_ignore(self.respect_gitignore)
            .git_global(self.respect_gitignore)
            .git_exclude(self.respect_gitignore)
            .ignore(false)
            .follow_links(false) // Security: prevent symlink traversal attacks
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                if !entry.file_type().is_some_and(|t| t.is_dir()) {
                    return true;
                }
                match relative_path(&root, entry.path()) {
                    Some(rel) => !is_excluded_path(&excluded_dirs, &format!("{}/", rel)),
                    None => true,
                }
            })
            .build()
    }

    /// Substring match of `/<dir>/` against the slash-wrapped relative path
    pub fn is_excluded(&self, rel_path: &str) -> bool {
        is_excluded_path(&self.excluded_dirs, rel_path)
    }
}

fn relative_path(root: &Path, path: &Path) -> Option<String> {
    path.strip_prefix(root)
        .ok()
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .filter(|p| !p.is_empty())
}

fn is_excluded_path(excluded_dirs: &[String], rel_path: &str) -> bool {
    let wrapped = format!("/{}", rel_path);
    excluded_dirs
        .iter()
        .any(|dir| wrapped.contains(&format!("/{}/", dir)))
}
