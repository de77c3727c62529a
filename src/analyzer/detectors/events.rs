//! Event Detector
//!
//! Scans a bounded sample of UI files (the first [`EVENT_SAMPLE_LIMIT`] in walk
//! order, counting classified screens of any extension) with five pattern families. Findings are deduplicated by trigger
//! within each file, then globally by `trigger:location`. The same trigger in
//! two different files is kept twice.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

use super::{Detector, SourceReader};
use crate::analyzer::scanner::paths::{UI_EXTENSIONS, has_extension, is_test_file};
use crate::constants::detect::EVENT_SAMPLE_LIMIT;
use crate::types::{EventFinding, EventKind, RepositoryIndex};

// ---------------------------------------------------------------------------
// Regex patterns (compiled once via LazyLock)
// ---------------------------------------------------------------------------

static JSX_BINDING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bon([A-Z]\w*)\s*=\s*\{([^}]*)\}").expect("valid regex literal")
});

static VUE_BINDING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:\s@|v-on:)([\w:-]+)(?:\.[\w.]+)?\s*=\s*"([^"]*)""#).expect("valid regex literal")
});

static SVELTE_BINDING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bon:(\w+)(?:\|[\w|]+)?\s*=\s*\{([^}]*)\}").expect("valid regex literal")
});

static LISTENER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"addEventListener\(\s*["'](\w+)["']\s*(?:,\s*([\w.$]+))?"#).expect("valid regex literal")
});

static CUSTOM_EVENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:\b(?:\$?emit|trigger|dispatchEvent)\(|new\s+CustomEvent\()\s*["'`]([\w:.\-]+)["'`]"#)
        .expect("valid regex literal")
});

static FORM_SUBMIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"onSubmit\s*=\s*\{([^}]*)\}|@submit(?:\.[\w.]+)?\s*=\s*"([^"]*)"|on:submit(?:\|[\w|]+)?\s*=\s*\{([^}]*)\}"#,
    )
    .expect("valid regex literal")
});

static BUTTON_CLICK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"on(?:Click|Press)\s*=\s*\{([^}]*)\}|@click(?:\.[\w.]+)?\s*=\s*"([^"]*)"|on:click(?:\|[\w|]+)?\s*=\s*\{([^}]*)\}|onPressed\s*:\s*([\w.]+)"#,
    )
    .expect("valid regex literal")
});

static CALL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z_$][\w.$]*)\s*\(").expect("valid regex literal"));

static REF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_$][\w.$]*$").expect("valid regex literal"));

/// Bindings covered by the dedicated submit/click families
const DEDICATED_TRIGGERS: &[&str] = &["click", "press", "submit"];

/// `(trigger, handler)` pairs found by one family
type Family = fn(&str) -> Vec<(String, Option<String>)>;

const FAMILIES: &[(EventKind, Family)] = &[
    (EventKind::UiBinding, ui_bindings),
    (EventKind::Listener, listeners),
    (EventKind::CustomEvent, custom_events),
    (EventKind::FormSubmit, form_submits),
    (EventKind::ButtonClick, button_clicks),
];

/// Name of the function a handler expression refers to.
///
/// `handleSave` → `handleSave`, `() => store.add(item)` → `store.add`.
pub fn handler_ref(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if REF_RE.is_match(raw) {
        return Some(raw.to_string());
    }
    let body = raw.rsplit_once("=>").map_or(raw, |(_, body)| body);
    CALL_RE.captures(body).map(|c| c[1].to_string())
}

fn first_group(cap: &regex::Captures<'_>) -> Option<String> {
    cap.iter()
        .skip(1)
        .flatten()
        .next()
        .and_then(|m| handler_ref(m.as_str()))
}

fn ui_bindings(content: &str) -> Vec<(String, Option<String>)> {
    let mut out: Vec<(usize, String, Option<String>)> = Vec::new();

    for re in [&*JSX_BINDING_RE, &*VUE_BINDING_RE, &*SVELTE_BINDING_RE] {
        for cap in re.captures_iter(content) {
            let trigger = cap[1].to_ascii_lowercase();
            if DEDICATED_TRIGGERS.contains(&trigger.as_str()) {
                continue;
            }
            let offset = cap.get(0).map_or(0, |m| m.start());
            out.push((offset, trigger, handler_ref(&cap[2])));
        }
    }

    out.sort_by_key(|(offset, _, _)| *offset);
    out.into_iter().map(|(_, t, h)| (t, h)).collect()
}

fn listeners(content: &str) -> Vec<(String, Option<String>)> {
    LISTENER_RE
        .captures_iter(content)
        .map(|cap| (cap[1].to_string(), cap.get(2).map(|m| m.as_str().to_string())))
        .collect()
}

fn custom_events(content: &str) -> Vec<(String, Option<String>)> {
    CUSTOM_EVENT_RE
        .captures_iter(content)
        .map(|cap| (cap[1].to_string(), None))
        .collect()
}

fn form_submits(content: &str) -> Vec<(String, Option<String>)> {
    FORM_SUBMIT_RE
        .captures_iter(content)
        .map(|cap| ("submit".to_string(), first_group(&cap)))
        .collect()
}

fn button_clicks(content: &str) -> Vec<(String, Option<String>)> {
    BUTTON_CLICK_RE
        .captures_iter(content)
        .map(|cap| ("click".to_string(), first_group(&cap)))
        .collect()
}

pub struct EventDetector {
    sample_limit: usize,
}

impl Default for EventDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl EventDetector {
    pub fn new() -> Self {
        Self {
            sample_limit: EVENT_SAMPLE_LIMIT,
        }
    }

    /// Files eligible for scanning, in walk order, capped at the sample limit.
    ///
    /// Screens count as UI files whatever their extension (`pages/index.js`).
    pub fn sample<'a>(&self, index: &'a RepositoryIndex) -> Vec<&'a str> {
        let screens: HashSet<&str> = index.screens.iter().map(String::as_str).collect();
        index
            .all_files
            .iter()
            .filter(|p| {
                screens.contains(p.as_str()) || (has_extension(p, UI_EXTENSIONS) && !is_test_file(p))
            })
            .take(self.sample_limit)
            .map(String::as_str)
            .collect()
    }

    /// All families over one file, first binding per trigger
    pub fn scan(location: &str, content: &str) -> Vec<EventFinding> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut findings = Vec::new();

        for (kind, family) in FAMILIES {
            for (trigger, handler) in family(content) {
                if seen.insert(trigger.clone()) {
                    findings.push(EventFinding::new(*kind, trigger, handler, location));
                }
            }
        }

        findings
    }

    /// Keep the first finding per `trigger:location`
    pub fn dedup_by_trigger_location(findings: Vec<EventFinding>) -> Vec<EventFinding> {
        let mut seen = HashSet::new();
        findings
            .into_iter()
            .filter(|f| seen.insert(format!("{}:{}", f.trigger, f.location)))
            .collect()
    }
}

impl Detector for EventDetector {
    type Finding = EventFinding;

    fn name(&self) -> &'static str {
        "events"
    }

    fn detect(&self, source: &SourceReader, index: &RepositoryIndex) -> Vec<EventFinding> {
        let sample = self.sample(index);
        let mut findings = Vec::new();

        for path in &sample {
            if let Some(content) = source.read(path) {
                findings.extend(Self::scan(path, &content));
            }
        }

        debug!("Event detector: {} bindings across {} sampled files", findings.len(), sample.len());
        Self::dedup_by_trigger_location(findings)
    }
}
