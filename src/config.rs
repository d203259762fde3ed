//! Diagram configuration file (YAML or JSON).

use crate::diagram::{DotOptions, Layout, LabelStyle, VisibilityMap, VisibilityState};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Settings for one diagram; every field is optional in the file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramConfig {
    /// Layout direction (lr or tb)
    pub layout: Option<Layout>,

    /// Minimum space between nodes in the same rank
    pub nodesep: Option<String>,

    /// Minimum space between ranks
    pub ranksep: Option<String>,

    /// Schema to inspect
    pub schema: Option<String>,

    /// Per-table visibility
    pub visibility: BTreeMap<String, VisibilityState>,

    /// Card fonts and colors
    pub style: LabelStyle,
}

impl DiagramConfig {
    /// Load configuration, choosing the parser by file extension
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let config = if is_json {
            serde_json::from_str(&content)
                .with_context(|| format!("invalid config file: {}", path.display()))?
        } else {
            serde_yaml_ng::from_str(&content)
                .with_context(|| format!("invalid config file: {}", path.display()))?
        };
        Ok(config)
    }

    pub fn visibility_map(&self) -> VisibilityMap {
        self.visibility
            .iter()
            .map(|(name, state)| (name.clone(), *state))
            .collect()
    }

    /// Graph attributes, falling back to the defaults for unset values
    pub fn dot_options(&self) -> DotOptions {
        let defaults = DotOptions::default();
        DotOptions {
            layout: self.layout.unwrap_or(defaults.layout),
            nodesep: self.nodesep.clone().unwrap_or(defaults.nodesep),
            ranksep: self.ranksep.clone().unwrap_or(defaults.ranksep),
        }
    }
}
