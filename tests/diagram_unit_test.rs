//! Tests for diagram assembly through the public library API.

use structura::diagram::{
    assemble, to_dot, DiagramGraph, DotOptions, LabelStyle, VisibilityMap, VisibilityState,
};
use structura::schema::{Column, Table};

fn users_orders() -> Vec<Table> {
    vec![
        Table::new("Users")
            .with_column(Column::new("id", "INT").primary_key())
            .with_column(Column::new("name", "TEXT")),
        Table::new("Orders")
            .with_column(Column::new("id", "INT").primary_key())
            .with_column(Column::new("user_id", "INT").foreign_key())
            .with_relation("user_id", "Users", "id"),
    ]
}

fn build(tables: &[Table], visibility: &VisibilityMap) -> DiagramGraph {
    assemble(tables, visibility, &LabelStyle::default())
}

fn node_ids(graph: &DiagramGraph) -> Vec<&str> {
    graph.nodes.iter().map(|n| n.id.as_str()).collect()
}

fn edge_pairs(graph: &DiagramGraph) -> Vec<(&str, &str)> {
    graph
        .edges
        .iter()
        .map(|e| (e.tail.as_str(), e.head.as_str()))
        .collect()
}

#[test]
fn test_all_tables_shown() {
    let graph = build(&users_orders(), &VisibilityMap::new());

    assert_eq!(node_ids(&graph), vec!["Users", "Orders"]);
    assert_eq!(edge_pairs(&graph), vec![("Orders:user_id", "Users:id")]);
}

#[test]
fn test_hidden_target_drops_node_and_edge() {
    let visibility = VisibilityMap::new().with("Users", VisibilityState::Hide);
    let graph = build(&users_orders(), &visibility);

    assert_eq!(node_ids(&graph), vec!["Orders"]);
    assert!(graph.edges.is_empty());
}

#[test]
fn test_linked_target_keeps_edge_without_node() {
    let visibility = VisibilityMap::new().with("Users", VisibilityState::Link);
    let graph = build(&users_orders(), &visibility);

    assert_eq!(node_ids(&graph), vec!["Orders"]);
    assert_eq!(edge_pairs(&graph), vec![("Orders:user_id", "Users:id")]);
}

#[test]
fn test_hidden_source_contributes_no_edges() {
    let visibility = VisibilityMap::new().with("Orders", VisibilityState::Hide);
    let graph = build(&users_orders(), &visibility);

    assert_eq!(node_ids(&graph), vec!["Users"]);
    assert!(graph.edges.is_empty());
}

#[test]
fn test_absent_entry_behaves_as_show() {
    let explicit = VisibilityMap::new()
        .with("Users", VisibilityState::Show)
        .with("Orders", VisibilityState::Show);

    assert_eq!(
        build(&users_orders(), &explicit),
        build(&users_orders(), &VisibilityMap::new())
    );
}

#[test]
fn test_generation_is_idempotent() {
    let tables = users_orders();
    let visibility = VisibilityMap::new().with("Users", VisibilityState::Link);

    let first = build(&tables, &visibility);
    let second = build(&tables, &visibility);
    assert_eq!(first, second);

    let options = DotOptions::default();
    assert_eq!(to_dot(&first, &options), to_dot(&second, &options));
}

#[test]
fn test_table_without_relations_has_no_edges() {
    let tables = vec![Table::new("settings").with_column(Column::new("key", "TEXT"))];
    let graph = build(&tables, &VisibilityMap::new());

    assert_eq!(graph.node_count(), 1);
    assert_eq!(graph.edge_count(), 0);
}

#[test]
fn test_zero_column_table_is_a_header_only_card() {
    let graph = build(&[Table::new("empty")], &VisibilityMap::new());

    assert_eq!(graph.nodes[0].label.matches("<TR>").count(), 1);
    assert!(graph.nodes[0].label.contains(">empty</FONT>"));
}

#[test]
fn test_columns_become_ports_in_order() {
    let graph = build(&users_orders(), &VisibilityMap::new());
    let label = &graph.nodes[1].label;

    let id = label.find(r#"port="id""#).unwrap();
    let user_id = label.find(r#"port="user_id""#).unwrap();
    assert!(id < user_id);
    assert_eq!(label.matches("<TR>").count(), 3);
}

#[test]
fn test_empty_snapshot() {
    let graph = build(&[], &VisibilityMap::new());
    assert!(graph.is_empty());
    assert_eq!(
        to_dot(&graph, &DotOptions::default()),
        "digraph ERD {\n  graph [rankdir=LR, nodesep=\"0.5\", ranksep=\"0.8\"];\n  node [shape=plain];\n}\n"
    );
}
