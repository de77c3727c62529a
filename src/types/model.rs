//! Tier-1 technical model types
//!
//! Everything the detectors produce and the aggregator assembles. All types are
//! created once per run and never mutated afterward.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::stable_id;

// =============================================================================
// Repository Index
// =============================================================================

/// Category-tagged path lists produced by one walk of the repository.
///
/// Paths are repository-relative with `/` separators. A path may appear in
/// more than one bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryIndex {
    pub screens: Vec<String>,
    pub api_files: Vec<String>,
    pub data_model_files: Vec<String>,
    pub all_files: Vec<String>,
}

// =============================================================================
// Screens & Navigation
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Screen {
    pub id: String,
    pub name: String,
    pub path: String,
    pub purpose: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,
}

impl Screen {
    /// Stable identifier derived from the screen's file path
    pub fn id_for_path(path: &str) -> String {
        stable_id("screen", path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationEdge {
    pub label: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_screen_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_screen_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

impl NavigationEdge {
    pub fn new(label: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
            from_screen_id: None,
            to_screen_id: None,
            condition: None,
        }
    }

    pub fn with_to_screen(mut self, screen_id: impl Into<String>) -> Self {
        self.to_screen_id = Some(screen_id.into());
        self
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }
}

// =============================================================================
// API Endpoints
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    /// Parse a verb case-insensitively; `None` for anything unrecognized
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "PATCH" => Some(Self::Patch),
            "DELETE" | "DEL" => Some(Self::Delete),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEndpoint {
    pub name: String,
    pub endpoint: String,
    pub method: HttpMethod,
    pub handler: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_fields: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_fields: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_required: Option<bool>,
}

impl ApiEndpoint {
    pub fn new(endpoint: impl Into<String>, method: HttpMethod, handler: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        Self {
            name: format!("{} {}", method, endpoint),
            endpoint,
            method,
            handler: handler.into(),
            framework: None,
            payload_fields: None,
            response_fields: None,
            auth_required: None,
        }
    }

    pub fn with_framework(mut self, framework: impl Into<String>) -> Self {
        self.framework = Some(framework.into());
        self
    }
}

// =============================================================================
// Data Model
// =============================================================================

/// Entity name → entity. Ordered so serialized output is stable.
pub type DataModel = BTreeMap<String, DataModelEntity>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataModelEntity {
    pub fields: BTreeMap<String, DataField>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relationships: Vec<Relationship>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataField {
    #[serde(rename = "type")]
    pub field_type: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique: Option<bool>,
}

impl DataField {
    pub fn new(field_type: impl Into<String>, required: bool) -> Self {
        Self {
            field_type: field_type.into(),
            required,
            unique: None,
        }
    }

    pub fn with_unique(mut self, unique: bool) -> Self {
        self.unique = Some(unique);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    One,
    Many,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub field: String,
    pub target: String,
    pub cardinality: Cardinality,
}

// =============================================================================
// State Patterns
// =============================================================================

/// Recognized state-management idioms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StateKind {
    Redux,
    Zustand,
    Context,
    Mobx,
    ReactQuery,
    Atom,
}

impl StateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Redux => "redux",
            Self::Zustand => "zustand",
            Self::Context => "context",
            Self::Mobx => "mobx",
            Self::ReactQuery => "react-query",
            Self::Atom => "atom",
        }
    }
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatePattern {
    #[serde(rename = "type")]
    pub kind: StateKind,
    pub stores: Vec<String>,
    pub location: String,
}

// =============================================================================
// Events
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Element attribute binding (`onChange={...}`, `@input="..."`)
    UiBinding,
    /// `addEventListener("...", ...)`
    Listener,
    /// `emit` / `dispatch` / `trigger`
    CustomEvent,
    FormSubmit,
    ButtonClick,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFinding {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub trigger: String,
    pub outputs: Vec<String>,
    pub location: String,
}

impl EventFinding {
    pub fn new(
        kind: EventKind,
        trigger: impl Into<String>,
        handler: Option<String>,
        location: impl Into<String>,
    ) -> Self {
        let trigger = trigger.into();
        let location = location.into();
        Self {
            id: stable_id("event", &format!("{}:{}", trigger, location)),
            kind,
            trigger,
            outputs: handler.into_iter().collect(),
            location,
        }
    }
}

// =============================================================================
// Technical Model
// =============================================================================

/// The unified, purely code-derived model of a repository's user-facing surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalModel {
    pub project_name: String,
    pub file_count: usize,
    pub screens: Vec<Screen>,
    pub navigation: Vec<NavigationEdge>,
    pub api_endpoints: Vec<ApiEndpoint>,
    pub data_model: DataModel,
    pub state_patterns: Vec<StatePattern>,
    pub events: Vec<EventFinding>,
    pub stack_detected: Vec<String>,
    pub extraction_notes: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_id_is_stable() {
        let a = Screen::id_for_path("app/dashboard/page.tsx");
        let b = Screen::id_for_path("app/dashboard/page.tsx");
        let c = Screen::id_for_path("app/page.tsx");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("screen_"));
    }

    #[test]
    fn test_http_method_parse() {
        assert_eq!(HttpMethod::parse("post"), Some(HttpMethod::Post));
        assert_eq!(HttpMethod::parse("Delete"), Some(HttpMethod::Delete));
        assert_eq!(HttpMethod::parse("OPTIONS"), None);
        assert_eq!(HttpMethod::default(), HttpMethod::Get);
    }

    #[test]
    fn test_endpoint_name() {
        let ep = ApiEndpoint::new("/api/users", HttpMethod::Post, "pages/api/users.ts");
        assert_eq!(ep.name, "POST /api/users");
    }

    #[test]
    fn test_serialized_field_names() {
        let pattern = StatePattern {
            kind: StateKind::ReactQuery,
            stores: vec!["todos".to_string()],
            location: "src/hooks.ts".to_string(),
        };
        let json = serde_json::to_value(&pattern).unwrap();
        assert_eq!(json["type"], "react-query");

        let edge = NavigationEdge::new("Home", "/").with_to_screen("screen_abc");
        let json = serde_json::to_value(&edge).unwrap();
        assert_eq!(json["toScreenId"], "screen_abc");
        assert!(json.get("fromScreenId").is_none());
    }
}
