//! Graphviz DOT serialization of assembled diagrams.

use super::assemble::DiagramGraph;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Write;
use std::str::FromStr;

/// Layout direction for diagram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// Left to right
    #[default]
    LR,
    /// Top to bottom
    TB,
}

impl FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lr" | "left-right" | "horizontal" => Ok(Layout::LR),
            "tb" | "td" | "top-bottom" | "top-down" | "vertical" => Ok(Layout::TB),
            _ => Err(format!("Unknown layout: {}. Valid options: lr, tb", s)),
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layout::LR => write!(f, "lr"),
            Layout::TB => write!(f, "tb"),
        }
    }
}

impl Layout {
    fn rankdir(self) -> &'static str {
        match self {
            Layout::LR => "LR",
            Layout::TB => "TB",
        }
    }
}

/// Graph-level attributes written ahead of the declarations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DotOptions {
    pub layout: Layout,
    pub nodesep: String,
    pub ranksep: String,
}

impl Default for DotOptions {
    fn default() -> Self {
        Self {
            layout: Layout::LR,
            nodesep: "0.5".to_string(),
            ranksep: "0.8".to_string(),
        }
    }
}

/// Generate DOT source for a diagram, keeping declaration order
pub fn to_dot(graph: &DiagramGraph, options: &DotOptions) -> String {
    let mut output = String::new();

    output.push_str("digraph ERD {\n");
    let _ = writeln!(
        output,
        "  graph [rankdir={}, nodesep={}, ranksep={}];",
        options.layout.rankdir(),
        escape_dot_id(&options.nodesep),
        escape_dot_id(&options.ranksep)
    );
    output.push_str("  node [shape=plain];\n");

    if !graph.nodes.is_empty() {
        output.push('\n');
    }
    for node in &graph.nodes {
        let _ = writeln!(
            output,
            "  {} [label=<{}>];",
            escape_dot_id(&node.id),
            node.label
        );
    }

    if !graph.edges.is_empty() {
        output.push('\n');
    }
    for edge in &graph.edges {
        let attrs: Vec<String> = edge
            .style
            .attributes()
            .iter()
            .map(|(name, value)| format!("{}={}", name, escape_dot_id(value)))
            .collect();
        let _ = writeln!(
            output,
            "  {} -> {} [{}];",
            endpoint(&edge.tail),
            endpoint(&edge.head),
            attrs.join(", ")
        );
    }

    output.push_str("}\n");
    output
}

/// Write a `table:column` endpoint with each half quoted as needed
fn endpoint(reference: &str) -> String {
    match reference.split_once(':') {
        Some((table, port)) => format!("{}:{}", escape_dot_id(table), escape_dot_id(port)),
        None => escape_dot_id(reference),
    }
}

/// Escape a string for use as a DOT node ID
pub fn escape_dot_id(s: &str) -> String {
    if s.chars().all(|c| c.is_alphanumeric() || c == '_')
        && !s.is_empty()
        && !s.starts_with(|c: char| c.is_ascii_digit())
    {
        s.to_string()
    } else {
        format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::{assemble, LabelStyle, VisibilityMap};
    use crate::schema::{Column, Table};

    fn graph() -> DiagramGraph {
        let tables = vec![
            Table::new("users").with_column(Column::new("id", "INT").primary_key()),
            Table::new("order items")
                .with_column(Column::new("user_id", "INT").foreign_key())
                .with_relation("user_id", "users", "id"),
        ];
        assemble(&tables, &VisibilityMap::new(), &LabelStyle::default())
    }

    #[test]
    fn test_dot_header() {
        let output = to_dot(&graph(), &DotOptions::default());

        assert!(output.starts_with("digraph ERD {\n"));
        assert!(output.contains("  graph [rankdir=LR, nodesep=\"0.5\", ranksep=\"0.8\"];\n"));
        assert!(output.contains("  node [shape=plain];\n"));
        assert!(output.ends_with("}\n"));
    }

    #[test]
    fn test_dot_contains_quoted_nodes_and_edges() {
        let output = to_dot(&graph(), &DotOptions::default());

        assert!(output.contains("  users [label=<<TABLE"));
        assert!(output.contains("  \"order items\" [label=<"));
        assert!(output.contains(
            "  \"order items\":user_id -> users:id [dir=back, arrowtail=crow, arrowhead=none, arrowsize=\"0.6\", penwidth=\"0.8\"];"
        ));
    }

    #[test]
    fn test_layout_tb() {
        let options = DotOptions {
            layout: "vertical".parse().unwrap(),
            ..Default::default()
        };
        assert!(to_dot(&DiagramGraph::default(), &options).contains("rankdir=TB"));
    }

    #[test]
    fn test_escape_dot_id() {
        assert_eq!(escape_dot_id("users"), "users");
        assert_eq!(escape_dot_id("1st"), "\"1st\"");
        assert_eq!(escape_dot_id("a\"b"), "\"a\\\"b\"");
    }
}
