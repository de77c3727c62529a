//! Navigation Detector
//!
//! Three strategies over disjoint inputs:
//! 1. File-based routing: screen paths → routes (authoritative)
//! 2. Nav markup: links and nav-item arrays in layout/navigation files
//! 3. Router configs: declarative route definitions in router-looking files
//!
//! Results are concatenated in that order and deduplicated by `path`, first wins.

use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;
use tracing::debug;

use super::{Detector, SourceReader};
use crate::analyzer::scanner::paths::{SCRIPT_EXTENSIONS, dir_segments, extension, has_extension, stem};
use crate::types::{NavigationEdge, RepositoryIndex, Screen, humanize, kebab_case};

// ---------------------------------------------------------------------------
// Regex patterns (compiled once via LazyLock)
// ---------------------------------------------------------------------------

static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"<(?:Link|NavLink|NuxtLink|RouterLink|router-link|a)\b[^>]*?\b(?:href|to)\s*=\s*\{?\s*["'`](/[^"'`]*)["'`]\s*\}?[^>]*>\s*([^<{]*)"#,
    )
    .expect("valid regex literal")
});

static NAV_ITEM_LABEL_FIRST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\b(?:label|name|title|text)\s*:\s*["'`]([^"'`]+)["'`]\s*,\s*(?:href|path|to|url|route)\s*:\s*["'`](/[^"'`]*)["'`]"#,
    )
    .expect("valid regex literal")
});

static NAV_ITEM_PATH_FIRST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\b(?:href|path|to|url|route)\s*:\s*["'`](/[^"'`]*)["'`]\s*,\s*(?:label|name|title|text)\s*:\s*["'`]([^"'`]+)["'`]"#,
    )
    .expect("valid regex literal")
});

static ROUTE_ELEMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<Route\b[^>]*?\bpath\s*=\s*\{?\s*["'`]([^"'`]*)["'`]"#).expect("valid regex literal")
});

static ROUTE_OBJECT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bpath\s*:\s*["'`]([^"'`]*)["'`]"#).expect("valid regex literal")
});

static SCREEN_DECL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<\w+\.Screen\b[^>]*?\bname\s*=\s*["']([^"']+)["']"#).expect("valid regex literal")
});

/// Conventional layout/navigation file stems (lowercased)
const NAV_FILE_STEMS: &[&str] = &[
    "layout", "+layout", "_app", "navbar", "nav", "navigation", "navmenu", "sidebar", "header",
    "menu", "topbar", "tabbar", "bottomnav", "footer",
];

const ROUTER_STEM_HINTS: &[&str] = &["router", "routes", "routing", "navigator"];

const ROUTER_CONTENT_MARKERS: &[&str] = &[
    "<Routes",
    "<Route ",
    "createBrowserRouter",
    "createRouter(",
    "RouterModule",
    "createStackNavigator",
    "createNativeStackNavigator",
    "createBottomTabNavigator",
];

const AUTH_GUARD_HINTS: &[&str] = &[
    "requireauth",
    "requiresauth",
    "protected",
    "privateroute",
    "authguard",
    "canactivate",
    "isauthenticated",
    "beforeenter",
];

pub const AUTH_CONDITION: &str = "requires authentication";

// =============================================================================
// Route Conventions
// =============================================================================

/// Route implied by a screen's file path.
///
/// `app/dashboard/page.tsx` → `/dashboard`, `pages/users/[id].tsx` → `/users/:id`,
/// `src/screens/OrderHistoryScreen.tsx` → `/order-history`.
pub fn route_for_screen(path: &str) -> String {
    let dirs = dir_segments(path);
    let stem = stem(path);
    let ext = extension(path).unwrap_or_default();

    let marker = if stem == "page" && dirs.iter().any(|d| *d == "app") {
        Some("app")
    } else if stem == "+page" && ext == "svelte" {
        Some("routes")
    } else if dirs.iter().any(|d| d.eq_ignore_ascii_case("pages")) {
        Some("pages")
    } else {
        None
    };

    let Some(marker) = marker else {
        // Component-style screen: route from the file name
        let base = stem
            .strip_suffix("Screen")
            .or_else(|| stem.strip_suffix("Page"))
            .filter(|s| !s.is_empty())
            .unwrap_or(stem);
        let slug = kebab_case(base);
        return if slug == "index" {
            "/".to_string()
        } else {
            format!("/{}", slug)
        };
    };

    let start = dirs
        .iter()
        .rposition(|d| d.eq_ignore_ascii_case(marker))
        .map(|p| p + 1)
        .unwrap_or(0);

    let mut segments: Vec<String> = dirs[start..]
        .iter()
        .filter(|s| !is_route_group(s))
        .map(|s| dynamic_segment(s))
        .collect();

    if !matches!(stem, "page" | "+page" | "index") {
        segments.push(dynamic_segment(stem));
    }

    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}

/// Human label for a route: `/` → `Home`, `/user-settings` → `User Settings`,
/// `/users/:id` → `Users Detail`.
pub fn label_for_route(route: &str) -> String {
    let segments: Vec<&str> = route.split('/').filter(|s| !s.is_empty()).collect();
    let Some(last) = segments.last() else {
        return "Home".to_string();
    };

    if let Some(param) = last.strip_prefix(':') {
        return match segments.len().checked_sub(2).and_then(|i| segments.get(i)) {
            Some(prev) if !prev.starts_with(':') => format!("{} Detail", humanize(prev)),
            _ => humanize(param.trim_end_matches('*')),
        };
    }

    humanize(last)
}

/// `(marketing)` route groups and `@modal` parallel slots don't contribute to the URL
fn is_route_group(segment: &str) -> bool {
    (segment.starts_with('(') && segment.ends_with(')')) || segment.starts_with('@')
}

/// `[id]` → `:id`, `[...slug]` / `[[...slug]]` → `:slug*`
fn dynamic_segment(segment: &str) -> String {
    let inner = segment
        .strip_prefix("[[")
        .and_then(|s| s.strip_suffix("]]"))
        .or_else(|| segment.strip_prefix('[').and_then(|s| s.strip_suffix(']')));

    match inner {
        Some(name) => match name.strip_prefix("...") {
            Some(rest) => format!(":{}*", rest),
            None => format!(":{}", name),
        },
        None => segment.to_string(),
    }
}

/// Leading slash, no query/hash, no trailing slash (except root)
fn normalize_route(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.starts_with("http://") || raw.starts_with("https://") || raw.starts_with("//") {
        return None;
    }
    let raw = raw.split(['?', '#']).next().unwrap_or("");
    let trimmed = raw.trim_matches('/');
    if trimmed.is_empty() {
        return Some("/".to_string());
    }
    Some(format!("/{}", trimmed))
}

fn line_around(content: &str, offset: usize) -> &str {
    let start = content[..offset].rfind('\n').map(|p| p + 1).unwrap_or(0);
    let end = content[offset..]
        .find('\n')
        .map(|p| offset + p)
        .unwrap_or(content.len());
    &content[start..end]
}

fn is_nav_file(path: &str) -> bool {
    has_extension(path, SCRIPT_EXTENSIONS) && NAV_FILE_STEMS.contains(&stem(path).to_ascii_lowercase().as_str())
}

fn is_router_named(path: &str) -> bool {
    let stem = stem(path).to_ascii_lowercase();
    ROUTER_STEM_HINTS.iter().any(|h| stem.contains(h))
}

// =============================================================================
// Strategies
// =============================================================================

pub trait NavigationStrategy {
    fn name(&self) -> &'static str;
    fn edges(&self, source: &SourceReader, index: &RepositoryIndex) -> Vec<NavigationEdge>;
}

/// Strategy 1: routes inferred from screen file paths
pub struct FileRouteStrategy;

impl NavigationStrategy for FileRouteStrategy {
    fn name(&self) -> &'static str {
        "file-routes"
    }

    fn edges(&self, _source: &SourceReader, index: &RepositoryIndex) -> Vec<NavigationEdge> {
        index
            .screens
            .iter()
            .map(|path| {
                let route = route_for_screen(path);
                NavigationEdge::new(label_for_route(&route), route)
                    .with_to_screen(Screen::id_for_path(path))
            })
            .collect()
    }
}

/// Strategy 2: link markup and nav-item arrays in layout/navigation files
pub struct NavMarkupStrategy;

impl NavMarkupStrategy {
    fn scan(content: &str) -> Vec<NavigationEdge> {
        let mut found: Vec<(usize, NavigationEdge)> = Vec::new();

        for cap in LINK_RE.captures_iter(content) {
            let Some(route) = normalize_route(&cap[1]) else {
                continue;
            };
            let text = cap[2].trim();
            let label = if text.is_empty() {
                label_for_route(&route)
            } else {
                text.to_string()
            };
            found.push((cap.get(0).map_or(0, |m| m.start()), NavigationEdge::new(label, route)));
        }

        for cap in NAV_ITEM_LABEL_FIRST_RE.captures_iter(content) {
            if let Some(route) = normalize_route(&cap[2]) {
                found.push((cap.get(0).map_or(0, |m| m.start()), NavigationEdge::new(cap[1].trim(), route)));
            }
        }

        for cap in NAV_ITEM_PATH_FIRST_RE.captures_iter(content) {
            if let Some(route) = normalize_route(&cap[1]) {
                found.push((cap.get(0).map_or(0, |m| m.start()), NavigationEdge::new(cap[2].trim(), route)));
            }
        }

        found.sort_by_key(|(offset, _)| *offset);
        found.into_iter().map(|(_, edge)| edge).collect()
    }
}

impl NavigationStrategy for NavMarkupStrategy {
    fn name(&self) -> &'static str {
        "nav-markup"
    }

    fn edges(&self, source: &SourceReader, index: &RepositoryIndex) -> Vec<NavigationEdge> {
        index
            .all_files
            .iter()
            .filter(|p| is_nav_file(p))
            .filter_map(|p| source.read(p))
            .flat_map(|content| Self::scan(&content))
            .collect()
    }
}

/// Strategy 3: declarative route definitions in router-looking files
pub struct RouterConfigStrategy;

impl RouterConfigStrategy {
    fn scan(content: &str) -> Vec<NavigationEdge> {
        let mut found: Vec<(usize, NavigationEdge)> = Vec::new();

        let mut push = |offset: usize, route: String, label: String| {
            let line = line_around(content, offset).to_ascii_lowercase();
            let mut edge = NavigationEdge::new(label, route);
            if AUTH_GUARD_HINTS.iter().any(|h| line.contains(h)) {
                edge = edge.with_condition(AUTH_CONDITION);
            }
            found.push((offset, edge));
        };

        for cap in ROUTE_ELEMENT_RE.captures_iter(content) {
            if let Some(route) = normalize_route(&cap[1]) {
                let label = label_for_route(&route);
                push(cap.get(0).map_or(0, |m| m.start()), route, label);
            }
        }

        for cap in ROUTE_OBJECT_RE.captures_iter(content) {
            if let Some(route) = normalize_route(&cap[1]) {
                let label = label_for_route(&route);
                push(cap.get(0).map_or(0, |m| m.start()), route, label);
            }
        }

        for cap in SCREEN_DECL_RE.captures_iter(content) {
            let name = &cap[1];
            push(
                cap.get(0).map_or(0, |m| m.start()),
                format!("/{}", kebab_case(name)),
                humanize(name),
            );
        }

        found.sort_by_key(|(offset, _)| *offset);
        found.into_iter().map(|(_, edge)| edge).collect()
    }
}

impl NavigationStrategy for RouterConfigStrategy {
    fn name(&self) -> &'static str {
        "router-config"
    }

    fn edges(&self, source: &SourceReader, index: &RepositoryIndex) -> Vec<NavigationEdge> {
        let screens: HashSet<&str> = index.screens.iter().map(String::as_str).collect();
        let mut edges = Vec::new();

        for path in &index.all_files {
            if !has_extension(path, SCRIPT_EXTENSIONS) || is_nav_file(path) || screens.contains(path.as_str()) {
                continue;
            }
            let named = is_router_named(path);
            let Some(content) = source.read(path) else {
                continue;
            };
            if !named && !ROUTER_CONTENT_MARKERS.iter().any(|m| content.contains(m)) {
                continue;
            }
            edges.extend(Self::scan(&content));
        }

        edges
    }
}

// =============================================================================
// Detector
// =============================================================================

pub struct NavigationDetector {
    strategies: Vec<Box<dyn NavigationStrategy + Send + Sync>>,
}

impl Default for NavigationDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl NavigationDetector {
    pub fn new() -> Self {
        Self {
            strategies: vec![
                Box::new(FileRouteStrategy),
                Box::new(NavMarkupStrategy),
                Box::new(RouterConfigStrategy),
            ],
        }
    }

    /// Keep the first edge for each path
    pub fn dedup_by_path(edges: Vec<NavigationEdge>) -> Vec<NavigationEdge> {
        let mut seen = HashSet::new();
        edges
            .into_iter()
            .filter(|edge| seen.insert(edge.path.clone()))
            .collect()
    }
}

impl Detector for NavigationDetector {
    type Finding = NavigationEdge;

    fn name(&self) -> &'static str {
        "navigation"
    }

    fn detect(&self, source: &SourceReader, index: &RepositoryIndex) -> Vec<NavigationEdge> {
        let routes: HashMap<String, String> = index
            .screens
            .iter()
            .map(|p| (route_for_screen(p), Screen::id_for_path(p)))
            .collect();

        let mut edges = Vec::new();
        for strategy in &self.strategies {
            let found = strategy.edges(source, index);
            debug!("Navigation strategy {} found {} edges", strategy.name(), found.len());
            edges.extend(found);
        }

        let mut edges = Self::dedup_by_path(edges);
        for edge in &mut edges {
            if edge.to_screen_id.is_none()
                && let Some(id) = routes.get(&edge.path)
            {
                edge.to_screen_id = Some(id.clone());
            }
        }
        edges
    }
}
