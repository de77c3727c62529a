//! Tier-1 Aggregator
//!
//! Runs the classifier and all five detectors against one repository root and
//! assembles a [`TechnicalModel`]. Deterministic for identical file contents:
//! the walk is sorted, every detector keeps walk order, and the data model is
//! an ordered map.

use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

use super::detectors::navigation::{label_for_route, route_for_screen};
use super::detectors::{
    ApiDetector, DataModelDetector, Detector, EventDetector, NavigationDetector, SourceReader,
    StateDetector,
};
use super::scanner::RepositoryClassifier;
use super::scanner::paths::{extension, file_name, has_dir, stem};
use crate::config::AnalysisConfig;
use crate::constants::detect::EVENT_SAMPLE_LIMIT;
use crate::types::{DataModel, RepositoryIndex, Result, Screen, TechnicalModel};

// =============================================================================
// Screen Metadata
// =============================================================================

/// Ordered keyword table; the first matching row decides the purpose
const PURPOSE_TABLE: &[(&[&str], &str)] = &[
    (&["login", "signin", "sign-in", "auth"], "User authentication"),
    (&["register", "signup", "sign-up"], "User registration"),
    (&["dashboard", "overview"], "Dashboard overview"),
    (&["settings", "preferences"], "Settings management"),
    (&["profile", "account"], "User profile"),
    (&["checkout", "payment", "billing"], "Checkout and payment"),
    (&["cart", "basket"], "Shopping cart"),
    (&["search"], "Search"),
    (&["product", "catalog", "shop", "store"], "Product catalog"),
    (&["admin"], "Administration"),
    (&["order"], "Order management"),
    (&["notification", "alert"], "Notifications"),
    (&["message", "chat", "inbox"], "Messaging"),
    (&["analytics", "report", "stats"], "Analytics and reporting"),
    (&["onboarding", "welcome", "getting-started"], "Onboarding"),
    (&["404", "500", "error", "not-found"], "Error page"),
    (&["about"], "About page"),
    (&["contact", "support", "help"], "Contact and support"),
];

pub fn purpose_for_route(route: &str) -> &'static str {
    if route == "/" {
        return "Landing page";
    }
    let lower = route.to_ascii_lowercase();
    PURPOSE_TABLE
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map_or("General screen", |(_, purpose)| purpose)
}

pub fn framework_for_screen(path: &str) -> Option<&'static str> {
    let ext = extension(path).unwrap_or_default();
    let stem = stem(path);

    let framework = match ext.as_str() {
        _ if stem == "page" && has_dir(path, "app") => "nextjs-app-router",
        "svelte" if stem == "+page" => "sveltekit",
        "svelte" => "svelte",
        _ if has_dir(path, "pages") && ext != "vue" => "nextjs-pages",
        "vue" => "vue",
        "dart" => "flutter",
        "tsx" | "jsx" | "js" if has_dir(path, "screens") => "react-native",
        "tsx" | "jsx" => "react",
        _ => return None,
    };
    Some(framework)
}

pub fn build_screens(index: &RepositoryIndex) -> Vec<Screen> {
    index
        .screens
        .iter()
        .map(|path| {
            let route = route_for_screen(path);
            Screen {
                id: Screen::id_for_path(path),
                name: label_for_route(&route),
                path: path.clone(),
                purpose: purpose_for_route(&route).to_string(),
                framework: framework_for_screen(path).map(str::to_string),
            }
        })
        .collect()
}

// =============================================================================
// Stack Detection
// =============================================================================

/// `(label, matches file path)`; a label is reported once, in table order
const STACK_RULES: &[(&str, fn(&str) -> bool)] = &[
    ("Next.js", |p| {
        file_name(p).starts_with("next.config.") || (stem(p) == "page" && has_dir(p, "app"))
    }),
    ("Nuxt", |p| file_name(p).starts_with("nuxt.config.")),
    ("SvelteKit", |p| file_name(p).starts_with("svelte.config.")),
    ("Svelte", |p| extension(p).as_deref() == Some("svelte")),
    ("Vue", |p| extension(p).as_deref() == Some("vue")),
    ("React Native", |p| file_name(p).starts_with("metro.config.")),
    ("React", |p| matches!(extension(p).as_deref(), Some("tsx" | "jsx"))),
    ("Flutter", |p| file_name(p) == "pubspec.yaml" || extension(p).as_deref() == Some("dart")),
    ("TypeScript", |p| {
        file_name(p) == "tsconfig.json" || matches!(extension(p).as_deref(), Some("ts" | "tsx"))
    }),
    ("Prisma", |p| extension(p).as_deref() == Some("prisma")),
    ("Tailwind CSS", |p| file_name(p).starts_with("tailwind.config.")),
    ("Vite", |p| file_name(p).starts_with("vite.config.")),
    ("Python", |p| {
        matches!(file_name(p), "pyproject.toml" | "requirements.txt") || extension(p).as_deref() == Some("py")
    }),
    ("Go", |p| file_name(p) == "go.mod"),
    ("Rust", |p| file_name(p) == "Cargo.toml"),
    ("Ruby", |p| file_name(p) == "Gemfile"),
    ("Docker", |p| file_name(p) == "Dockerfile" || file_name(p).starts_with("docker-compose")),
];

pub fn detect_stack(files: &[String]) -> Vec<String> {
    STACK_RULES
        .iter()
        .filter(|(_, matches)| files.iter().any(|f| matches(f)))
        .map(|(label, _)| label.to_string())
        .collect()
}

// =============================================================================
// Aggregator
// =============================================================================

pub struct Tier1Aggregator {
    config: AnalysisConfig,
    navigation: NavigationDetector,
    api: ApiDetector,
    data_model: DataModelDetector,
    state: StateDetector,
    events: EventDetector,
}

impl Default for Tier1Aggregator {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

impl Tier1Aggregator {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            navigation: NavigationDetector::new(),
            api: ApiDetector::new(),
            data_model: DataModelDetector::new(),
            state: StateDetector::new(),
            events: EventDetector::new(),
        }
    }

    pub fn aggregate(&self, root: &Path) -> Result<TechnicalModel> {
        let start = Instant::now();

        let index = RepositoryClassifier::from_config(root, &self.config).classify()?;
        let source = SourceReader::new(root).with_max_file_size(self.config.max_file_size);

        let screens = build_screens(&index);
        let navigation = run(&self.navigation, &source, &index);
        let api_endpoints = run(&self.api, &source, &index);
        let data_model: DataModel = run(&self.data_model, &source, &index).into_iter().collect();
        let state_patterns = run(&self.state, &source, &index);
        let events = run(&self.events, &source, &index);
        let stack_detected = detect_stack(&index.all_files);

        let mut model = TechnicalModel {
            project_name: project_name(root),
            file_count: index.all_files.len(),
            screens,
            navigation,
            api_endpoints,
            data_model,
            state_patterns,
            events,
            stack_detected,
            extraction_notes: String::new(),
        };
        let sampled = self.events.sample(&index).len();
        model.extraction_notes = extraction_notes(&model, sampled);

        info!(
            "Analyzed {} files in {:.2}s: {} screens, {} endpoints, {} entities",
            model.file_count,
            start.elapsed().as_secs_f64(),
            model.screens.len(),
            model.api_endpoints.len(),
            model.data_model.len()
        );
        Ok(model)
    }
}

fn run<D: Detector>(detector: &D, source: &SourceReader, index: &RepositoryIndex) -> Vec<D::Finding> {
    let findings = detector.detect(source, index);
    debug!("{} detector: {} findings", detector.name(), findings.len());
    findings
}

fn project_name(root: &Path) -> String {
    root.canonicalize()
        .ok()
        .as_deref()
        .unwrap_or(root)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "repository".to_string())
}

/// Semicolon-joined human summary of the model's counts
pub fn extraction_notes(model: &TechnicalModel, sampled_ui_files: usize) -> String {
    let mut notes = vec![
        format!("Scanned {} files", model.file_count),
        format!("found {} screens", model.screens.len()),
        format!("{} navigation routes", model.navigation.len()),
        format!("{} API endpoints", model.api_endpoints.len()),
        format!("{} data entities", model.data_model.len()),
        format!("{} state patterns", model.state_patterns.len()),
        format!("{} event handlers", model.events.len()),
    ];
    if sampled_ui_files >= EVENT_SAMPLE_LIMIT {
        notes.push(format!("event scan limited to the first {} UI files", EVENT_SAMPLE_LIMIT));
    }
    if !model.stack_detected.is_empty() {
        notes.push(format!("stack: {}", model.stack_detected.join(", ")));
    }
    notes.join("; ")
}

/// Analyze `root` with default settings
pub fn aggregate(root: &Path) -> Result<TechnicalModel> {
    Tier1Aggregator::default().aggregate(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SurfaceError;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &[u8]) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn sample_repo() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "package.json", br#"{"name": "shop"}"#);
        write(root, "next.config.js", b"module.exports = {};");
        write(root, "app/page.tsx", b"export default function Home() { return <a href=\"/cart\">Cart</a>; }");
        write(root, "app/cart/page.tsx", b"export default function Cart() { return <button onClick={checkout}>Pay</button>; }");
        write(
            root,
            "app/api/cart/route.ts",
            b"export async function POST(req) { const { sku } = await req.json(); return NextResponse.json({ ok }); }",
        );
        write(root, "src/store/cart.ts", b"export const cart = createSlice({ name: \"cart\", initialState: [] });");
        write(root, "src/types/item.ts", b"export interface Item { sku: string; qty?: number }");
        temp
    }

    #[test]
    fn test_aggregate_sample_repo() {
        let temp = sample_repo();
        let model = aggregate(temp.path()).unwrap();

        assert_eq!(model.file_count, 7);
        let routes: Vec<(&str, &str)> = model.screens.iter().map(|s| (s.name.as_str(), s.purpose.as_str())).collect();
        assert_eq!(routes, vec![("Cart", "Shopping cart"), ("Home", "Landing page")]);
        assert_eq!(model.screens[0].framework.as_deref(), Some("nextjs-app-router"));
        assert_eq!(model.api_endpoints.len(), 1);
        assert_eq!(model.state_patterns[0].stores, vec!["cart"]);
        assert!(model.data_model.contains_key("Item"));
        assert_eq!(model.events.len(), 1);
        assert_eq!(model.stack_detected, vec!["Next.js", "React", "TypeScript"]);
        assert!(model.extraction_notes.starts_with("Scanned 7 files; found 2 screens;"));
        assert!(model.extraction_notes.ends_with("stack: Next.js, React, TypeScript"));
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let temp = sample_repo();
        let first = serde_json::to_string(&aggregate(temp.path()).unwrap()).unwrap();
        let second = serde_json::to_string(&aggregate(temp.path()).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_malformed_files_do_not_reduce_other_findings() {
        let temp = sample_repo();
        let before = aggregate(temp.path()).unwrap();

        write(temp.path(), "src/store/broken.ts", &[0xff, 0xfe, 0xfd]);
        write(temp.path(), "app/api/broken/route.ts", &[0xc3, 0x28]);
        write(temp.path(), "src/types/broken.ts", &[0x80]);
        let after = aggregate(temp.path()).unwrap();

        assert_eq!(after.file_count, before.file_count + 3);
        assert_eq!(after.api_endpoints, before.api_endpoints);
        assert_eq!(after.state_patterns, before.state_patterns);
        assert_eq!(after.data_model, before.data_model);
        assert_eq!(after.events, before.events);
    }

    #[test]
    fn test_unreadable_root_is_fatal() {
        let temp = TempDir::new().unwrap();
        let err = aggregate(&temp.path().join("missing")).unwrap_err();
        assert!(matches!(err, SurfaceError::RootUnreadable { .. }));
    }

    #[test]
    fn test_purpose_and_framework() {
        assert_eq!(purpose_for_route("/"), "Landing page");
        assert_eq!(purpose_for_route("/login"), "User authentication");
        assert_eq!(purpose_for_route("/orders/:id"), "Order management");
        assert_eq!(purpose_for_route("/team"), "General screen");

        assert_eq!(framework_for_screen("pages/index.tsx"), Some("nextjs-pages"));
        assert_eq!(framework_for_screen("src/routes/+page.svelte"), Some("sveltekit"));
        assert_eq!(framework_for_screen("src/views/Home.vue"), Some("vue"));
        assert_eq!(framework_for_screen("src/screens/Home.tsx"), Some("react-native"));
        assert_eq!(framework_for_screen("lib/screens/home.dart"), Some("flutter"));
    }
}
