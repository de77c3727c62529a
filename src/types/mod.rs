pub mod error;
pub mod evidence;
pub mod model;

pub use error::{Result, SurfaceError};
pub use evidence::{EvidenceDocument, EvidenceType};
pub use model::*;

use sha2::{Digest, Sha256};

// =============================================================================
// Identity & Naming Helpers
// =============================================================================

/// Deterministic identifier: `{prefix}_{first 12 hex chars of sha256(input)}`.
///
/// Stable across runs and platforms, so re-running on unchanged input yields
/// identical ids.
pub fn stable_id(prefix: &str, input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    let hex: String = digest.iter().take(6).map(|b| format!("{:02x}", b)).collect();
    format!("{}_{}", prefix, hex)
}

/// Capitalize the first character of a string.
#[inline]
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

/// Turn an identifier-ish segment into a title: `user-settings` → `User Settings`,
/// `orderHistory` → `Order History`.
pub fn humanize(segment: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for ch in segment.chars() {
        if ch == '-' || ch == '_' || ch == ' ' || ch == '.' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        current.push(ch);
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .iter()
        .map(|w| capitalize_first(w))
        .collect::<Vec<_>>()
        .join(" ")
}

/// `OrderHistory` / `order_history` → `order-history`
pub fn kebab_case(segment: &str) -> String {
    humanize(segment).to_lowercase().replace(' ', "-")
}
