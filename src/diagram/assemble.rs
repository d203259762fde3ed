//! Node and edge declarations for the rendered graph.
//!
//! The assembler applies per-table visibility to a snapshot:
//! - `Show` tables get a node and contribute their relations as edges
//! - `Link` tables get no node, but edges may still end at them; Graphviz
//!   materializes a bare node for the endpoint
//! - `Hide` tables get no node and every edge ending at them is dropped
//!
//! Declaration order follows table order, then relation order, so the same
//! input always produces the same declarations.

use super::label::{build_label, LabelStyle};
use super::visibility::{VisibilityMap, VisibilityState};
use crate::schema::Table;
use ahash::AHashSet;
use tracing::debug;

/// A table card node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDecl {
    /// Node id, the table name
    pub id: String,
    /// Rendered HTML-like label markup
    pub label: String,
}

/// Presentation attributes for relation edges
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeStyle {
    pub dir: &'static str,
    pub arrowtail: &'static str,
    pub arrowhead: &'static str,
    pub arrowsize: &'static str,
    pub penwidth: &'static str,
}

impl EdgeStyle {
    /// Thin crow's foot drawn at the foreign key end (edge direction reversed)
    pub const RELATION: EdgeStyle = EdgeStyle {
        dir: "back",
        arrowtail: "crow",
        arrowhead: "none",
        arrowsize: "0.6",
        penwidth: "0.8",
    };

    /// Attributes as `(name, value)` pairs in output order
    pub fn attributes(&self) -> [(&'static str, &'static str); 5] {
        [
            ("dir", self.dir),
            ("arrowtail", self.arrowtail),
            ("arrowhead", self.arrowhead),
            ("arrowsize", self.arrowsize),
            ("penwidth", self.penwidth),
        ]
    }
}

impl Default for EdgeStyle {
    fn default() -> Self {
        EdgeStyle::RELATION
    }
}

/// A relation edge between two `table:column` ports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeDecl {
    /// Foreign key side, `table:column`
    pub tail: String,
    /// Referenced side, `table:column`
    pub head: String,
    pub style: EdgeStyle,
}

/// Everything handed to the renderer for one diagram
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagramGraph {
    pub nodes: Vec<NodeDecl>,
    pub edges: Vec<EdgeDecl>,
}

impl DiagramGraph {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

/// Build node and edge declarations for `tables` under `visibility`
pub fn assemble(tables: &[Table], visibility: &VisibilityMap, style: &LabelStyle) -> DiagramGraph {
    let nodes: Vec<NodeDecl> = tables
        .iter()
        .filter(|table| visibility.state_of(&table.name) == VisibilityState::Show)
        .map(|table| NodeDecl {
            id: table.name.clone(),
            label: build_label(table, style).render(),
        })
        .collect();

    let known: AHashSet<&str> = tables.iter().map(|t| t.name.as_str()).collect();
    let mut edges = Vec::new();

    for table in tables {
        if visibility.state_of(&table.name) != VisibilityState::Show {
            continue;
        }

        for relation in &table.relations {
            let target = &relation.related_table_name;
            match visibility.state_of(target) {
                VisibilityState::Hide => {
                    debug!(from = %table.name, to = %target, "edge to hidden table suppressed");
                    continue;
                }
                VisibilityState::Link => {
                    debug!(from = %table.name, to = %target, "edge to linked table");
                }
                VisibilityState::Show => {}
            }

            if !known.contains(target.as_str()) {
                debug!(from = %table.name, to = %target, "relation target not in snapshot");
            }

            edges.push(EdgeDecl {
                tail: relation.tail_endpoint(),
                head: relation.head_endpoint(),
                style: EdgeStyle::RELATION,
            });
        }
    }

    DiagramGraph { nodes, edges }
}
