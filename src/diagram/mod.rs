//! ERD (Entity-Relationship Diagram) generation module.
//!
//! This module provides:
//! - Table card labels with key and nullability markers
//! - Per-table visibility (show, link, hide)
//! - Node/edge assembly in snapshot order
//! - Graphviz DOT output

pub mod assemble;
pub mod dot;
pub mod label;
pub mod visibility;

pub use assemble::{assemble, DiagramGraph, EdgeDecl, EdgeStyle, NodeDecl};
pub use dot::{escape_dot_id, to_dot, DotOptions, Layout};
pub use label::{build_label, escape_text, KeyTag, LabelStyle};
pub use visibility::{parse_patterns, VisibilityMap, VisibilityState};
