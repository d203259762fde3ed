//! Per-table visibility for diagram generation.

use ahash::AHashMap;
use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a table appears in the diagram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisibilityState {
    /// Full table card plus its outgoing relations
    #[default]
    Show,
    /// No card; relations pointing at it still reach it as a bare endpoint
    Link,
    /// No card and no relations pointing at it
    Hide,
}

impl FromStr for VisibilityState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "show" => Ok(VisibilityState::Show),
            "link" => Ok(VisibilityState::Link),
            "hide" => Ok(VisibilityState::Hide),
            _ => Err(format!(
                "Unknown visibility: {}. Valid options: show, link, hide",
                s
            )),
        }
    }
}

impl fmt::Display for VisibilityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VisibilityState::Show => write!(f, "show"),
            VisibilityState::Link => write!(f, "link"),
            VisibilityState::Hide => write!(f, "hide"),
        }
    }
}

/// Table name to visibility; names without an entry are shown
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibilityMap {
    states: AHashMap<String, VisibilityState>,
}

impl VisibilityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `--link`/`--hide` glob patterns against the given table names.
    /// A table matching both lists is hidden.
    pub fn from_patterns<'a, I>(table_names: I, link: &[Pattern], hide: &[Pattern]) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut map = Self::new();
        for name in table_names {
            if hide.iter().any(|p| p.matches(name)) {
                map.set(name, VisibilityState::Hide);
            } else if link.iter().any(|p| p.matches(name)) {
                map.set(name, VisibilityState::Link);
            }
        }
        map
    }

    pub fn with(mut self, table: impl Into<String>, state: VisibilityState) -> Self {
        self.set(table, state);
        self
    }

    pub fn set(&mut self, table: impl Into<String>, state: VisibilityState) {
        self.states.insert(table.into(), state);
    }

    /// State of a table, defaulting to `Show` when it has no entry
    pub fn state_of(&self, table: &str) -> VisibilityState {
        self.states.get(table).copied().unwrap_or_default()
    }

    /// Overlay `other` on top of this map; entries in `other` win
    pub fn merge(&mut self, other: &VisibilityMap) {
        for (name, state) in &other.states {
            self.states.insert(name.clone(), *state);
        }
    }

    /// Number of explicit entries in a given state
    pub fn count(&self, state: VisibilityState) -> usize {
        self.states.values().filter(|s| **s == state).count()
    }
}

impl<K: Into<String>> FromIterator<(K, VisibilityState)> for VisibilityMap {
    fn from_iter<T: IntoIterator<Item = (K, VisibilityState)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (name, state) in iter {
            map.set(name, state);
        }
        map
    }
}

/// Parse comma-separated glob patterns, e.g. `audit_*,logs`
pub fn parse_patterns(list: &str) -> Result<Vec<Pattern>, String> {
    list.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| Pattern::new(p).map_err(|e| format!("Invalid table pattern '{}': {}", p, e)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_table_is_shown() {
        let map = VisibilityMap::new().with("users", VisibilityState::Hide);
        assert_eq!(map.state_of("orders"), VisibilityState::Show);
        assert_eq!(map.state_of("users"), VisibilityState::Hide);
    }

    #[test]
    fn test_tokens() {
        assert_eq!("LINK".parse::<VisibilityState>(), Ok(VisibilityState::Link));
        assert!("invisible".parse::<VisibilityState>().is_err());

        let parsed: AHashMap<String, VisibilityState> =
            serde_json::from_str(r#"{"users": "hide", "orders": "show"}"#).unwrap();
        assert_eq!(parsed["users"], VisibilityState::Hide);
    }

    #[test]
    fn test_from_patterns_hide_wins() {
        let link = parse_patterns("audit_*").unwrap();
        let hide = parse_patterns("audit_log, tmp_*").unwrap();
        let names = ["users", "audit_log", "audit_event", "tmp_x"];
        let map = VisibilityMap::from_patterns(names, &link, &hide);

        assert_eq!(map.state_of("users"), VisibilityState::Show);
        assert_eq!(map.state_of("audit_log"), VisibilityState::Hide);
        assert_eq!(map.state_of("audit_event"), VisibilityState::Link);
        assert_eq!(map.state_of("tmp_x"), VisibilityState::Hide);
        assert_eq!(map.count(VisibilityState::Hide), 2);
    }

    #[test]
    fn test_merge_overrides() {
        let mut base = VisibilityMap::new()
            .with("users", VisibilityState::Hide)
            .with("orders", VisibilityState::Link);
        base.merge(&VisibilityMap::new().with("users", VisibilityState::Show));

        assert_eq!(base.state_of("users"), VisibilityState::Show);
        assert_eq!(base.state_of("orders"), VisibilityState::Link);
    }
}
