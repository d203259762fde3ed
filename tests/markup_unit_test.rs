//! Tests for the label markup tree through the public API.

use structura::markup::{join, Cell, Content, Element, GridTable, Row, StyledText};

#[test]
fn test_cell_attributes_in_fixed_order() {
    let cell = Cell::new("x")
        .height("20")
        .bgcolor("white")
        .port("p")
        .align("LEFT");

    assert_eq!(
        Element::from(cell).render(),
        r#"<TD port="p" align="LEFT" bgcolor="white" height="20">x</TD>"#
    );
}

#[test]
fn test_bare_elements_have_no_attributes() {
    assert_eq!(Element::from(Cell::new("x")).render(), "<TD>x</TD>");
    assert_eq!(Element::from(GridTable::new(vec![])).render(), "<TABLE></TABLE>");
    assert_eq!(Element::from(StyledText::new("x")).render(), "<FONT>x</FONT>");
    assert_eq!(Element::LineBreak.render(), "<BR/>");
}

#[test]
fn test_nested_table() {
    let inner = GridTable::new(vec![Row::single(Cell::new("inner"))]).border("1");
    let outer = GridTable::new(vec![Row::new(vec![
        Cell::new(Element::from(inner)),
        Cell::new(Element::italic("note")),
    ])])
    .cellspacing("0")
    .border("0");

    assert_eq!(
        outer.render(),
        r#"<TABLE border="0" cellspacing="0"><TR><TD><TABLE border="1"><TR><TD>inner</TD></TR></TABLE></TD><TD><I>note</I></TD></TR></TABLE>"#
    );
}

#[test]
fn test_sequence_versus_join() {
    let parts = vec![Element::bold("a"), Element::LineBreak, Element::text("b")];

    assert_eq!(
        Element::bold(Content::Sequence(parts.clone())).render(),
        "<B><B>a</B><BR/>b</B>"
    );
    assert_eq!(join(" ", &parts).render(), "<B>a</B> <BR/> b");
}

#[test]
fn test_rendering_is_repeatable() {
    let font = StyledText::new("users").face("Arial").point_size(9).color("blue");
    let element = Element::bold(Element::from(font));
    assert_eq!(element.render(), element.render());
    assert_eq!(
        element.render(),
        r#"<B><FONT face="Arial" point-size="9" color="blue">users</FONT></B>"#
    );
}
