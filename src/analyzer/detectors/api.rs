//! API Endpoint Detector
//!
//! Server side: API-bucket files classified by path convention, refined by
//! in-file route registrations (Next.js verb exports, Express/Fastify calls,
//! Flask/FastAPI decorators). Client side: `fetch`/`axios`-style call sites
//! anywhere else, to catch endpoints that only appear as calls.
//!
//! Deduplicated by `(method, endpoint)`, first wins; server endpoints come first.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

use super::{Detector, SourceReader, brace_block, push_unique, split_top_level};
use crate::analyzer::scanner::paths::{SCRIPT_EXTENSIONS, dir_segments, has_extension, is_test_file, stem};
use crate::constants::detect::FETCH_OPTIONS_WINDOW;
use crate::types::{ApiEndpoint, HttpMethod, RepositoryIndex, kebab_case};

// ---------------------------------------------------------------------------
// Regex patterns (compiled once via LazyLock)
// ---------------------------------------------------------------------------

static NEXT_VERB_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"export\s+(?:async\s+)?(?:function|const)\s+(GET|POST|PUT|PATCH|DELETE)\b")
        .expect("valid regex literal")
});

static EXPRESS_ROUTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\b(app|router|routes|server|api|fastify)\.(get|post|put|patch|delete)\(\s*["'`]([^"'`]+)["'`]"#,
    )
    .expect("valid regex literal")
});

static PY_DECORATOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"@\w+\.(get|post|put|patch|delete|route)\(\s*["']([^"']+)["']([^)]*)\)"#)
        .expect("valid regex literal")
});

static METHODS_LIST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"methods\s*=\s*\[([^\]]*)\]").expect("valid regex literal")
});

static QUOTED_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"["'](\w+)["']"#).expect("valid regex literal"));

static REQ_METHOD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"req\.method\s*===?\s*["'](\w+)["']"#).expect("valid regex literal")
});

static BODY_FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:req|request)\.body\.(\w+)").expect("valid regex literal")
});

static BODY_DESTRUCTURE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([^{}]*)\}\s*=\s*(?:await\s+)?(?:req|request)\.(?:body|json\(\))")
        .expect("valid regex literal")
});

static PY_BODY_FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"request\.(?:json|form)(?:\.get\(|\[)\s*["'](\w+)["']"#).expect("valid regex literal")
});

static RESPONSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:\bres(?:\.status\(\s*\d+\s*\))?\.(?:json|send)|\b(?:NextResponse|Response)\.json|\bjsonify)\(\s*\{",
    )
    .expect("valid regex literal")
});

static FETCH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bfetch\(\s*["'`](/[^"'`?]*)"#).expect("valid regex literal")
});

static FETCH_METHOD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"method\s*:\s*["'](\w+)["']"#).expect("valid regex literal")
});

static CLIENT_VERB_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\b(?:axios|api|http|client|apiClient|\$http)\.(get|post|put|patch|delete)\(\s*["'`](/[^"'`?]*)"#,
    )
    .expect("valid regex literal")
});

static TEMPLATE_PARAM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{\s*(?:[\w.]*\.)?(\w+)\s*\}").expect("valid regex literal")
});

const ROUTE_DIRS: &[&str] = &["routes", "controllers", "handlers", "routers", "endpoints"];
const ROUTE_STEM_SUFFIXES: &[&str] = &["Controller", "Routes", "Router", "Route", "Handler"];
const IMPLICIT_STEMS: &[&str] = &["index", "route", "+server", "server"];

const AUTH_HINTS: &[&str] = &[
    "getserversession",
    "requireauth",
    "isauthenticated",
    "verifytoken",
    "jwt.verify",
    "authenticate",
    "authorization",
    "get_current_user",
    "login_required",
    "currentuser",
    "auth()",
    "withauth",
];

pub const CLIENT_CALL_FRAMEWORK: &str = "client-call";

// =============================================================================
// Path Conventions
// =============================================================================

/// Endpoint implied by a handler file's path.
///
/// `pages/api/users/[id].ts` → `/api/users/:id`, `app/api/orders/route.ts` →
/// `/api/orders`, `server/routes/users.js` → `/users`, `src/userController.ts` → `/user`.
pub fn endpoint_for_path(path: &str) -> String {
    let dirs = dir_segments(path);
    let stem = stem(path);

    let mut segments: Vec<String> = if let Some(pos) = dirs.iter().rposition(|d| d.eq_ignore_ascii_case("api")) {
        dirs[pos..].iter().map(|s| param_segment(s)).collect()
    } else if let Some(pos) = dirs
        .iter()
        .rposition(|d| ROUTE_DIRS.iter().any(|r| d.eq_ignore_ascii_case(r)))
    {
        dirs[pos + 1..]
            .iter()
            .filter(|s| !(s.starts_with('(') && s.ends_with(')')))
            .map(|s| param_segment(s))
            .collect()
    } else {
        Vec::new()
    };

    if !IMPLICIT_STEMS.contains(&stem) {
        let base = ROUTE_STEM_SUFFIXES
            .iter()
            .find_map(|suffix| stem.strip_suffix(suffix).filter(|s| !s.is_empty()))
            .unwrap_or(stem);
        let base = base.trim_end_matches(['.', '_', '-']);
        segments.push(if base.starts_with('[') {
            param_segment(base)
        } else {
            kebab_case(base)
        });
    }

    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}

/// Method implied by a handler's file name, `None` when nothing matches
pub fn method_for_filename(path: &str) -> Option<HttpMethod> {
    let stem = stem(path).to_ascii_lowercase();
    let starts = |prefixes: &[&str]| prefixes.iter().any(|p| stem.starts_with(p));

    if starts(&["create", "add", "post", "submit"]) {
        Some(HttpMethod::Post)
    } else if starts(&["update", "edit", "put"]) {
        Some(HttpMethod::Put)
    } else if starts(&["patch"]) {
        Some(HttpMethod::Patch)
    } else if starts(&["delete", "remove", "destroy"]) {
        Some(HttpMethod::Delete)
    } else if starts(&["get", "list", "fetch", "find"]) {
        Some(HttpMethod::Get)
    } else {
        None
    }
}

fn param_segment(segment: &str) -> String {
    match segment.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        Some(inner) => format!(":{}", inner.trim_start_matches("...")),
        None => segment.to_string(),
    }
}

fn normalize_endpoint(raw: &str) -> String {
    let replaced = TEMPLATE_PARAM_RE.replace_all(raw.trim(), ":$1");
    let trimmed = replaced.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

// =============================================================================
// Field Heuristics
// =============================================================================

pub fn payload_fields(content: &str) -> Vec<String> {
    let mut fields = Vec::new();

    for cap in BODY_FIELD_RE.captures_iter(content) {
        push_unique(&mut fields, &cap[1]);
    }
    for cap in BODY_DESTRUCTURE_RE.captures_iter(content) {
        for part in cap[1].split(',') {
            let name = part.split([':', '=']).next().unwrap_or("").trim();
            if !name.is_empty() && !name.starts_with("...") && name.chars().all(|c| c.is_alphanumeric() || c == '_') {
                push_unique(&mut fields, name);
            }
        }
    }
    for cap in PY_BODY_FIELD_RE.captures_iter(content) {
        push_unique(&mut fields, &cap[1]);
    }

    fields
}

pub fn response_fields(content: &str) -> Vec<String> {
    let mut fields = Vec::new();

    for m in RESPONSE_RE.find_iter(content) {
        let open = m.end() - 1;
        let Some(body) = brace_block(content, open) else {
            continue;
        };
        for entry in split_top_level(body) {
            if entry.starts_with("...") {
                continue;
            }
            let key = entry
                .split(':')
                .next()
                .unwrap_or("")
                .trim()
                .trim_matches(|c| c == '"' || c == '\'');
            if !key.is_empty() && key.chars().all(|c| c.is_alphanumeric() || c == '_') {
                push_unique(&mut fields, key);
            }
        }
    }

    fields
}

fn requires_auth(content: &str) -> bool {
    let lower = content.to_ascii_lowercase();
    AUTH_HINTS.iter().any(|h| lower.contains(h))
}

// =============================================================================
// Detector
// =============================================================================

pub struct ApiDetector;

impl Default for ApiDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiDetector {
    pub fn new() -> Self {
        Self
    }

    /// Endpoints declared by one server-side file
    pub fn server_endpoints(path: &str, content: &str) -> Vec<ApiEndpoint> {
        let mut endpoints = Vec::new();
        let is_sveltekit = stem(path) == "+server";

        // Next.js app router / SvelteKit: one exported function per verb
        for cap in NEXT_VERB_RE.captures_iter(content) {
            if let Some(method) = HttpMethod::parse(&cap[1]) {
                let framework = if is_sveltekit { "sveltekit" } else { "nextjs" };
                endpoints.push(ApiEndpoint::new(endpoint_for_path(path), method, path).with_framework(framework));
            }
        }

        if endpoints.is_empty() {
            for cap in EXPRESS_ROUTE_RE.captures_iter(content) {
                // `@router.get(...)` is a Python decorator, handled below
                let start = cap.get(0).map_or(0, |m| m.start());
                if content[..start].ends_with('@') {
                    continue;
                }
                let Some(method) = HttpMethod::parse(&cap[2]) else {
                    continue;
                };
                let framework = if &cap[1] == "fastify" { "fastify" } else { "express" };
                endpoints.push(ApiEndpoint::new(normalize_endpoint(&cap[3]), method, path).with_framework(framework));
            }

            for cap in PY_DECORATOR_RE.captures_iter(content) {
                let route = normalize_endpoint(&cap[2]);
                if &cap[1] == "route" {
                    let mut methods: Vec<HttpMethod> = METHODS_LIST_RE
                        .captures(&cap[3])
                        .map(|list| {
                            QUOTED_WORD_RE
                                .captures_iter(&list[1])
                                .filter_map(|w| HttpMethod::parse(&w[1]))
                                .collect()
                        })
                        .unwrap_or_default();
                    if methods.is_empty() {
                        methods.push(HttpMethod::default());
                    }
                    for method in methods {
                        endpoints.push(ApiEndpoint::new(route.clone(), method, path).with_framework("flask"));
                    }
                } else if let Some(method) = HttpMethod::parse(&cap[1]) {
                    endpoints.push(ApiEndpoint::new(route, method, path).with_framework("fastapi"));
                }
            }
        }

        if endpoints.is_empty() {
            let endpoint = endpoint_for_path(path);
            let under_pages_api = path.split('/').collect::<Vec<_>>().windows(2).any(|w| w == ["pages", "api"]);

            let mut methods: Vec<HttpMethod> = Vec::new();
            if under_pages_api {
                for cap in REQ_METHOD_RE.captures_iter(content) {
                    if let Some(method) = HttpMethod::parse(&cap[1])
                        && !methods.contains(&method)
                    {
                        methods.push(method);
                    }
                }
            }
            if methods.is_empty() {
                methods.push(method_for_filename(path).unwrap_or_default());
            }

            for method in methods {
                let mut ep = ApiEndpoint::new(endpoint.clone(), method, path);
                if under_pages_api {
                    ep = ep.with_framework("nextjs");
                }
                endpoints.push(ep);
            }
        }

        let payload = payload_fields(content);
        let response = response_fields(content);
        let auth = requires_auth(content);
        for ep in &mut endpoints {
            if !payload.is_empty() && ep.method != HttpMethod::Get {
                ep.payload_fields = Some(payload.clone());
            }
            if !response.is_empty() {
                ep.response_fields = Some(response.clone());
            }
            if auth {
                ep.auth_required = Some(true);
            }
        }

        endpoints
    }

    /// Endpoints referenced by client-side calls in one file
    pub fn client_calls(path: &str, content: &str) -> Vec<ApiEndpoint> {
        let mut found: Vec<(usize, ApiEndpoint)> = Vec::new();

        for cap in FETCH_RE.captures_iter(content) {
            let whole = cap.get(0).map_or(0..0, |m| m.range());
            let rest = &content[whole.end..];
            let window_end = rest
                .find("fetch(")
                .unwrap_or(rest.len())
                .min(FETCH_OPTIONS_WINDOW)
                .min(rest.len());
            let window_end = (0..=window_end).rev().find(|i| rest.is_char_boundary(*i)).unwrap_or(0);
            let method = FETCH_METHOD_RE
                .captures(&rest[..window_end])
                .and_then(|m| HttpMethod::parse(&m[1]))
                .unwrap_or_default();
            found.push((
                whole.start,
                ApiEndpoint::new(normalize_endpoint(&cap[1]), method, path).with_framework(CLIENT_CALL_FRAMEWORK),
            ));
        }

        for cap in CLIENT_VERB_RE.captures_iter(content) {
            if let Some(method) = HttpMethod::parse(&cap[1]) {
                found.push((
                    cap.get(0).map_or(0, |m| m.start()),
                    ApiEndpoint::new(normalize_endpoint(&cap[2]), method, path).with_framework(CLIENT_CALL_FRAMEWORK),
                ));
            }
        }

        found.sort_by_key(|(offset, _)| *offset);
        found.into_iter().map(|(_, ep)| ep).collect()
    }

    /// Keep the first endpoint per `(method, endpoint)`
    pub fn dedup_by_route(endpoints: Vec<ApiEndpoint>) -> Vec<ApiEndpoint> {
        let mut seen = HashSet::new();
        endpoints
            .into_iter()
            .filter(|ep| seen.insert((ep.method, ep.endpoint.clone())))
            .collect()
    }
}

impl Detector for ApiDetector {
    type Finding = ApiEndpoint;

    fn name(&self) -> &'static str {
        "api"
    }

    fn detect(&self, source: &SourceReader, index: &RepositoryIndex) -> Vec<ApiEndpoint> {
        let mut endpoints = Vec::new();

        for path in &index.api_files {
            if let Some(content) = source.read(path) {
                endpoints.extend(Self::server_endpoints(path, &content));
            }
        }
        let server_count = endpoints.len();

        let api_files: HashSet<&str> = index.api_files.iter().map(String::as_str).collect();
        for path in &index.all_files {
            if api_files.contains(path.as_str()) || is_test_file(path) || !has_extension(path, SCRIPT_EXTENSIONS) {
                continue;
            }
            if let Some(content) = source.read(path) {
                endpoints.extend(Self::client_calls(path, &content));
            }
        }

        debug!(
            "API detector: {} server endpoints, {} client call sites",
            server_count,
            endpoints.len() - server_count
        );
        Self::dedup_by_route(endpoints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::scanner::classify_paths;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_endpoint_for_path() {
        assert_eq!(endpoint_for_path("pages/api/users/[id].ts"), "/api/users/:id");
        assert_eq!(endpoint_for_path("pages/api/index.ts"), "/api");
        assert_eq!(endpoint_for_path("app/api/orders/route.ts"), "/api/orders");
        assert_eq!(endpoint_for_path("server/routes/users.js"), "/users");
        assert_eq!(endpoint_for_path("src/userController.ts"), "/user");
        assert_eq!(endpoint_for_path("src/routes/items/+server.ts"), "/items");
    }

    #[test]
    fn test_method_for_filename() {
        assert_eq!(method_for_filename("api/createOrder.ts"), Some(HttpMethod::Post));
        assert_eq!(method_for_filename("api/deleteUser.ts"), Some(HttpMethod::Delete));
        assert_eq!(method_for_filename("api/users.ts"), None);
    }

    #[test]
    fn test_next_app_router_verbs() {
        let content = r#"
import { NextResponse } from "next/server";
export async function GET() { return NextResponse.json({ orders, total }); }
export async function POST(request: Request) {
  const { item, quantity } = await request.json();
  return NextResponse.json({ id: 1, ...rest });
}
"#;
        let eps = ApiDetector::server_endpoints("app/api/orders/route.ts", content);
        assert_eq!(eps.len(), 2);
        assert_eq!(eps[0].name, "GET /api/orders");
        assert_eq!(eps[1].method, HttpMethod::Post);
        assert_eq!(eps[1].framework.as_deref(), Some("nextjs"));
        assert_eq!(eps[1].payload_fields, Some(vec!["item".to_string(), "quantity".to_string()]));
        assert!(eps[0].payload_fields.is_none());
        assert_eq!(
            eps[0].response_fields,
            Some(vec!["orders".to_string(), "total".to_string(), "id".to_string()])
        );
        assert_eq!(eps[0].auth_required, None);
    }

    #[test]
    fn test_express_routes_with_auth() {
        let content = r#"
router.get("/users", requireAuth, list);
router.post('/users', requireAuth, (req, res) => {
  const email = req.body.email;
  res.status(201).json({ id: user.id });
});
"#;
        let eps = ApiDetector::server_endpoints("server/routes/users.js", content);
        let routes: Vec<(HttpMethod, &str)> = eps.iter().map(|e| (e.method, e.endpoint.as_str())).collect();
        assert_eq!(routes, vec![(HttpMethod::Get, "/users"), (HttpMethod::Post, "/users")]);
        assert!(eps.iter().all(|e| e.framework.as_deref() == Some("express")));
        assert!(eps.iter().all(|e| e.auth_required == Some(true)));
        assert_eq!(eps[1].payload_fields, Some(vec!["email".to_string()]));
    }

    #[test]
    fn test_python_decorators() {
        let content = r#"
@app.route("/login", methods=["GET", "POST"])
def login(): ...

@router.delete("/items/{item_id}")
def remove(item_id: int): ...
"#;
        let eps = ApiDetector::server_endpoints("app/routers/items.py", content);
        let routes: Vec<(HttpMethod, &str, Option<&str>)> = eps
            .iter()
            .map(|e| (e.method, e.endpoint.as_str(), e.framework.as_deref()))
            .collect();
        assert_eq!(
            routes,
            vec![
                (HttpMethod::Get, "/login", Some("flask")),
                (HttpMethod::Post, "/login", Some("flask")),
                (HttpMethod::Delete, "/items/{item_id}", Some("fastapi")),
            ]
        );
    }

    #[test]
    fn test_pages_api_method_checks_and_default() {
        let content = r#"export default function handler(req, res) {
  if (req.method === "POST") { return create(req, res); }
  if (req.method === 'DELETE') { return remove(req, res); }
}"#;
        let eps = ApiDetector::server_endpoints("pages/api/users/[id].ts", content);
        let methods: Vec<HttpMethod> = eps.iter().map(|e| e.method).collect();
        assert_eq!(methods, vec![HttpMethod::Post, HttpMethod::Delete]);
        assert_eq!(eps[0].endpoint, "/api/users/:id");

        let plain = ApiDetector::server_endpoints("src/api/users.ts", "export const x = 1;");
        assert_eq!(plain.len(), 1);
        assert_eq!(plain[0].method, HttpMethod::Get);
        assert_eq!(plain[0].endpoint, "/api/users");
        assert!(plain[0].framework.is_none());
    }

    #[test]
    fn test_client_calls() {
        let content = r#"
const a = await fetch("/api/cart", { method: "POST", body });
const b = await fetch(`/api/users/${user.id}`);
axios.delete('/api/sessions/current');
fetch("https://example.com/x");
"#;
        let eps = ApiDetector::client_calls("src/hooks/useCart.ts", content);
        let routes: Vec<(HttpMethod, &str)> = eps.iter().map(|e| (e.method, e.endpoint.as_str())).collect();
        assert_eq!(
            routes,
            vec![
                (HttpMethod::Post, "/api/cart"),
                (HttpMethod::Get, "/api/users/:id"),
                (HttpMethod::Delete, "/api/sessions/current"),
            ]
        );
        assert_eq!(eps[0].framework.as_deref(), Some(CLIENT_CALL_FRAMEWORK));
        assert_eq!(eps[0].handler, "src/hooks/useCart.ts");
    }

    #[test]
    fn test_detect_prefers_server_and_dedups() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "app/api/cart/route.ts", "export async function POST() {}");
        write(
            temp.path(),
            "src/components/Cart.tsx",
            r#"fetch("/api/cart", { method: "POST" }); fetch("/api/wishlist");"#,
        );
        let index = classify_paths(vec![
            "app/api/cart/route.ts".to_string(),
            "src/components/Cart.tsx".to_string(),
            "src/components/Broken.tsx".to_string(),
        ]);

        let eps = ApiDetector::new().detect(&SourceReader::new(temp.path()), &index);
        assert_eq!(eps.len(), 2);
        assert_eq!(eps[0].framework.as_deref(), Some("nextjs"));
        assert_eq!(eps[1].endpoint, "/api/wishlist");
        assert_eq!(eps[1].method, HttpMethod::Get);
    }
}
