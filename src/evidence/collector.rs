//! Evidence Collector
//!
//! Gathers free-text documents about a repository, in source order:
//! uploaded brief, README, docs folder, package metadata, root config files,
//! and a generated code summary. Any absent or unreadable source is omitted;
//! collection itself never fails.

use ignore::WalkBuilder;
use serde_json::Value;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::analyzer::scanner::paths::{extension, file_name};
use crate::config::EvidenceConfig;
use crate::constants::evidence::{DEFAULT_MAX_DOCS_FILES, DEFAULT_MAX_DOCUMENT_CHARS};
use crate::types::{EvidenceDocument, EvidenceType, TechnicalModel, stable_id};

const README_NAMES: &[&str] = &[
    "README.md",
    "readme.md",
    "Readme.md",
    "README.markdown",
    "README.rst",
    "README.txt",
    "README",
];

const DOCS_DIRS: &[&str] = &["docs", "doc"];
const DOC_EXTENSIONS: &[&str] = &["md", "mdx", "markdown", "txt", "rst", "adoc"];

const CONFIG_FILE_NAMES: &[&str] = &[
    "tsconfig.json",
    "app.json",
    ".env.example",
    "Dockerfile",
    "docker-compose.yml",
    "docker-compose.yaml",
];
const CONFIG_FILE_PREFIXES: &[&str] = &[
    "next.config.",
    "vite.config.",
    "nuxt.config.",
    "svelte.config.",
    "tailwind.config.",
    "astro.config.",
];

/// Entries listed per section of the code summary
const SUMMARY_SECTION_LIMIT: usize = 40;

pub struct EvidenceCollector {
    root: PathBuf,
    brief: Option<PathBuf>,
    max_docs_files: usize,
    max_document_chars: usize,
}

impl EvidenceCollector {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            brief: None,
            max_docs_files: DEFAULT_MAX_DOCS_FILES,
            max_document_chars: DEFAULT_MAX_DOCUMENT_CHARS,
        }
    }

    pub fn from_config<P: AsRef<Path>>(root: P, config: &EvidenceConfig) -> Self {
        Self {
            max_docs_files: config.max_docs_files,
            max_document_chars: config.max_document_chars,
            ..Self::new(root)
        }
    }

    /// Caller-supplied brief, read from any path
    pub fn with_brief<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.brief = Some(path.as_ref().to_path_buf());
        self
    }

    /// All available evidence; `model` adds the code summary document
    pub fn collect(&self, model: Option<&TechnicalModel>) -> Vec<EvidenceDocument> {
        let mut docs = Vec::new();

        docs.extend(self.brief());
        docs.extend(self.readme());
        docs.extend(self.docs_files());
        docs.extend(self.package_metadata());
        docs.extend(self.config_files());
        if let Some(model) = model {
            docs.push(self.cap(EvidenceDocument::new(
                "code_summary",
                EvidenceType::CodeSummary,
                format!("Code summary: {}", model.project_name),
                code_summary(model),
            )));
        }

        debug!("Collected {} evidence documents", docs.len());
        docs
    }

    fn brief(&self) -> Option<EvidenceDocument> {
        let path = self.brief.as_ref()?;
        match fs::read_to_string(path) {
            Ok(content) if !content.trim().is_empty() => Some(
                self.cap(EvidenceDocument::new("uploaded_brief", EvidenceType::UploadedBrief, "Uploaded brief", content))
                    .with_path(path.display().to_string()),
            ),
            Ok(_) => None,
            Err(e) => {
                warn!("Skipping brief {}: {}", path.display(), e);
                None
            }
        }
    }

    fn readme(&self) -> Option<EvidenceDocument> {
        README_NAMES.iter().find_map(|name| {
            let content = self.read(name)?;
            Some(self.document(EvidenceType::RepoReadme, name, "README", content))
        })
    }

    fn docs_files(&self) -> Vec<EvidenceDocument> {
        let mut paths: Vec<String> = Vec::new();

        for dir in DOCS_DIRS {
            let dir_path = self.root.join(dir);
            if !dir_path.is_dir() {
                continue;
            }
            let walker = WalkBuilder::new(&dir_path)
                .hidden(true)
                .follow_links(false)
                .sort_by_file_name(|a, b| a.cmp(b))
                .build();

            for entry in walker.flatten() {
                if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                    continue;
                }
                let Ok(rel) = entry.path().strip_prefix(&self.root) else {
                    continue;
                };
                let rel = rel.to_string_lossy().replace('\\', "/");
                if extension(&rel).is_some_and(|ext| DOC_EXTENSIONS.contains(&ext.as_str())) {
                    paths.push(rel);
                }
            }
        }

        paths.sort();
        paths
            .into_iter()
            .take(self.max_docs_files)
            .filter_map(|rel| {
                let content = self.read(&rel)?;
                let title = markdown_title(&content).unwrap_or_else(|| file_name(&rel).to_string());
                Some(self.document(EvidenceType::DocsFile, &rel, &title, content))
            })
            .collect()
    }

    fn package_metadata(&self) -> Vec<EvidenceDocument> {
        let manifests: [(&str, fn(&str) -> Option<String>); 3] = [
            ("package.json", summarize_package_json),
            ("Cargo.toml", summarize_cargo_toml),
            ("pyproject.toml", summarize_pyproject),
        ];

        manifests
            .into_iter()
            .filter_map(|(name, summarize)| {
                let raw = self.read(name)?;
                let Some(summary) = summarize(&raw) else {
                    debug!("Skipping malformed manifest {}", name);
                    return None;
                };
                Some(self.document(EvidenceType::PackageMetadata, name, name, summary))
            })
            .collect()
    }

    fn config_files(&self) -> Vec<EvidenceDocument> {
        let Ok(entries) = fs::read_dir(&self.root) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .flatten()
            .filter(|e| e.file_type().is_ok_and(|ft| ft.is_file()))
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|name| {
                CONFIG_FILE_NAMES.contains(&name.as_str())
                    || CONFIG_FILE_PREFIXES.iter().any(|p| name.starts_with(p))
            })
            .collect();
        names.sort();

        names
            .into_iter()
            .filter_map(|name| {
                let content = self.read(&name)?;
                Some(self.document(EvidenceType::ConfigFile, &name, &name, content))
            })
            .collect()
    }

    /// Non-empty file content relative to the root
    fn read(&self, rel: &str) -> Option<String> {
        match fs::read_to_string(self.root.join(rel)) {
            Ok(content) if !content.trim().is_empty() => Some(content),
            Ok(_) => None,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    debug!("Skipping unreadable evidence {}: {}", rel, e);
                }
                None
            }
        }
    }

    fn document(&self, doc_type: EvidenceType, rel: &str, title: &str, content: String) -> EvidenceDocument {
        self.cap(EvidenceDocument::new(stable_id(doc_type.as_str(), rel), doc_type, title, content))
            .with_path(rel)
    }

    fn cap(&self, mut doc: EvidenceDocument) -> EvidenceDocument {
        if let Some((byte_end, _)) = doc.content.char_indices().nth(self.max_document_chars) {
            doc.content.truncate(byte_end);
        }
        doc
    }
}

fn markdown_title(content: &str) -> Option<String> {
    content
        .lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix("# "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

// =============================================================================
// Package Metadata
// =============================================================================

fn push_field(out: &mut String, label: &str, value: Option<&str>) {
    if let Some(v) = value.filter(|v| !v.is_empty()) {
        let _ = writeln!(out, "{}: {}", label, v);
    }
}

fn push_list<'a>(out: &mut String, label: &str, items: impl Iterator<Item = &'a str>) {
    let items: Vec<&str> = items.collect();
    if !items.is_empty() {
        let _ = writeln!(out, "{}: {}", label, items.join(", "));
    }
}

pub fn summarize_package_json(raw: &str) -> Option<String> {
    let json: Value = serde_json::from_str(raw).ok()?;
    let obj = json.as_object()?;
    let keys = |field: &str| {
        obj.get(field)
            .and_then(Value::as_object)
            .map(|m| m.keys().map(String::as_str).collect::<Vec<_>>())
            .unwrap_or_default()
    };

    let mut out = String::new();
    push_field(&mut out, "Name", obj.get("name").and_then(Value::as_str));
    push_field(&mut out, "Version", obj.get("version").and_then(Value::as_str));
    push_field(&mut out, "Description", obj.get("description").and_then(Value::as_str));
    push_list(&mut out, "Scripts", keys("scripts").into_iter());
    push_list(&mut out, "Dependencies", keys("dependencies").into_iter());
    push_list(&mut out, "Dev dependencies", keys("devDependencies").into_iter());
    Some(out)
}

pub fn summarize_cargo_toml(raw: &str) -> Option<String> {
    let table: toml::Table = toml::from_str(raw).ok()?;
    let package = table.get("package").and_then(toml::Value::as_table);
    let get = |field: &str| package.and_then(|p| p.get(field)).and_then(toml::Value::as_str);

    let mut out = String::new();
    push_field(&mut out, "Name", get("name"));
    push_field(&mut out, "Version", get("version"));
    push_field(&mut out, "Description", get("description"));
    if let Some(deps) = table.get("dependencies").and_then(toml::Value::as_table) {
        push_list(&mut out, "Dependencies", deps.keys().map(String::as_str));
    }
    Some(out)
}

pub fn summarize_pyproject(raw: &str) -> Option<String> {
    let table: toml::Table = toml::from_str(raw).ok()?;
    let project = table.get("project").and_then(toml::Value::as_table).or_else(|| {
        table
            .get("tool")
            .and_then(|t| t.get("poetry"))
            .and_then(toml::Value::as_table)
    });
    let get = |field: &str| project.and_then(|p| p.get(field)).and_then(toml::Value::as_str);

    let mut out = String::new();
    push_field(&mut out, "Name", get("name"));
    push_field(&mut out, "Version", get("version"));
    push_field(&mut out, "Description", get("description"));
    match project.and_then(|p| p.get("dependencies")) {
        Some(toml::Value::Array(list)) => push_list(&mut out, "Dependencies", list.iter().filter_map(toml::Value::as_str)),
        Some(toml::Value::Table(map)) => push_list(&mut out, "Dependencies", map.keys().map(String::as_str)),
        _ => {}
    }
    Some(out)
}

// =============================================================================
// Code Summary
// =============================================================================

fn section<T>(out: &mut String, title: &str, items: &[T], line: impl Fn(&T) -> String) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n{} ({}):", title, items.len());
    for item in items.iter().take(SUMMARY_SECTION_LIMIT) {
        let _ = writeln!(out, "- {}", line(item));
    }
    if items.len() > SUMMARY_SECTION_LIMIT {
        let _ = writeln!(out, "- ... and {} more", items.len() - SUMMARY_SECTION_LIMIT);
    }
}

/// Plain-text digest of a technical model
pub fn code_summary(model: &TechnicalModel) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Project: {}", model.project_name);
    let _ = writeln!(out, "Files scanned: {}", model.file_count);
    if !model.stack_detected.is_empty() {
        let _ = writeln!(out, "Stack: {}", model.stack_detected.join(", "));
    }

    section(&mut out, "Screens", &model.screens, |s| {
        format!("{} [{}]: {}", s.name, s.path, s.purpose)
    });
    section(&mut out, "Navigation", &model.navigation, |n| match &n.condition {
        Some(cond) => format!("{} -> {} ({})", n.label, n.path, cond),
        None => format!("{} -> {}", n.label, n.path),
    });
    section(&mut out, "API endpoints", &model.api_endpoints, |e| {
        let auth = if e.auth_required == Some(true) { ", auth" } else { "" };
        format!("{} ({}{})", e.name, e.handler, auth)
    });

    let entities: Vec<(&String, _)> = model.data_model.iter().collect();
    section(&mut out, "Data model", &entities, |(name, entity)| {
        let fields: Vec<String> = entity
            .fields
            .iter()
            .map(|(f, d)| format!("{}{}: {}", f, if d.required { "" } else { "?" }, d.field_type))
            .collect();
        format!("{} {{ {} }}", name, fields.join(", "))
    });

    section(&mut out, "State management", &model.state_patterns, |p| {
        format!("{}: {} ({})", p.kind, p.stores.join(", "), p.location)
    });
    section(&mut out, "Events", &model.events, |e| {
        format!("{} in {}", e.trigger, e.location)
    });

    let _ = writeln!(out, "\nNotes: {}", model.extraction_notes);
    out
}
