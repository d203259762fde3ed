//! Table card labels built from the markup tree.

use crate::markup::{join, Cell, Element, GridTable, Row, StyledText};
use crate::schema::{Column, Table};
use serde::{Deserialize, Serialize};

/// Fonts and colors used for table cards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelStyle {
    pub font_face: String,
    pub header_point_size: u32,
    pub detail_point_size: u32,
    pub header_bgcolor: String,
    pub primary_key_color: String,
    pub foreign_key_color: String,
    pub unique_color: String,
    pub muted_color: String,
    pub nullable_marker: String,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            font_face: "Arial".to_string(),
            header_point_size: 9,
            detail_point_size: 7,
            header_bgcolor: "lightblue".to_string(),
            primary_key_color: "blue".to_string(),
            foreign_key_color: "green".to_string(),
            unique_color: "purple".to_string(),
            muted_color: "gray".to_string(),
            nullable_marker: "NULL".to_string(),
        }
    }
}

/// Key marker shown next to a column type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTag {
    Primary,
    Foreign,
    Unique,
}

impl KeyTag {
    /// Pick the tag for a column: primary beats foreign beats unique
    pub fn of(column: &Column) -> Option<KeyTag> {
        if column.is_primary_key {
            Some(KeyTag::Primary)
        } else if column.is_foreign_key {
            Some(KeyTag::Foreign)
        } else if column.is_unique {
            Some(KeyTag::Unique)
        } else {
            None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            KeyTag::Primary => "PK",
            KeyTag::Foreign => "FK",
            KeyTag::Unique => "UQ",
        }
    }

    fn color(self, style: &LabelStyle) -> &str {
        match self {
            KeyTag::Primary => &style.primary_key_color,
            KeyTag::Foreign => &style.foreign_key_color,
            KeyTag::Unique => &style.unique_color,
        }
    }
}

/// Build the card for one table: a header row, then one ported row per column
pub fn build_label(table: &Table, style: &LabelStyle) -> GridTable {
    let mut rows = Vec::with_capacity(table.columns.len() + 1);
    rows.push(header_row(&table.name, style));
    rows.extend(table.columns.iter().map(|column| column_row(column, style)));

    GridTable::new(rows)
        .border("0")
        .cellborder("1")
        .cellspacing("0")
}

fn header_row(table_name: &str, style: &LabelStyle) -> Row {
    let title = StyledText::new(escape_text(table_name))
        .face(&style.font_face)
        .point_size(style.header_point_size);

    Row::single(Cell::new(Element::bold(Element::from(title))).bgcolor(&style.header_bgcolor))
}

fn column_row(column: &Column, style: &LabelStyle) -> Row {
    let mut fragments = Vec::with_capacity(5);

    let name = StyledText::new(escape_text(&column.name))
        .face(&style.font_face)
        .point_size(style.header_point_size);
    fragments.push(Element::bold(Element::from(name)));
    fragments.push(Element::LineBreak);

    if let Some(tag) = KeyTag::of(column) {
        let marker = detail_font(tag.as_str(), style).color(tag.color(style));
        fragments.push(Element::bold(Element::from(marker)));
    }

    let data_type = detail_font(&escape_text(&column.data_type), style).color(&style.muted_color);
    fragments.push(Element::italic(Element::from(data_type)));

    if column.is_nullable {
        let marker = detail_font(&style.nullable_marker, style).color(&style.muted_color);
        fragments.push(Element::from(marker));
    }

    Row::single(Cell::new(join(" ", &fragments)).port(escape_text(&column.name)))
}

fn detail_font(text: &str, style: &LabelStyle) -> StyledText {
    StyledText::new(text)
        .face(&style.font_face)
        .point_size(style.detail_point_size)
}

/// Escape a string for use in DOT HTML labels
pub fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_column(pk: bool, fk: bool, uq: bool) -> Column {
        Column {
            name: "c".to_string(),
            data_type: "INT".to_string(),
            is_primary_key: pk,
            is_foreign_key: fk,
            is_unique: uq,
            is_nullable: true,
        }
    }

    #[test]
    fn test_key_tag_precedence() {
        for pk in [false, true] {
            for fk in [false, true] {
                for uq in [false, true] {
                    let expected = if pk {
                        Some("PK")
                    } else if fk {
                        Some("FK")
                    } else if uq {
                        Some("UQ")
                    } else {
                        None
                    };
                    let tag = KeyTag::of(&key_column(pk, fk, uq)).map(KeyTag::as_str);
                    assert_eq!(tag, expected, "pk={} fk={} uq={}", pk, fk, uq);
                }
            }
        }
    }

    #[test]
    fn test_header_row_markup() {
        let label = build_label(&Table::new("users"), &LabelStyle::default());
        assert_eq!(label.rows.len(), 1);
        assert_eq!(
            label.render(),
            r#"<TABLE border="0" cellborder="1" cellspacing="0"><TR><TD bgcolor="lightblue"><B><FONT face="Arial" point-size="9">users</FONT></B></TD></TR></TABLE>"#
        );
    }

    #[test]
    fn test_column_row_markup() {
        let table = Table::new("orders").with_column(Column::new("user_id", "INT").foreign_key());
        let rendered = build_label(&table, &LabelStyle::default()).render();

        assert!(rendered.contains(concat!(
            r#"<TD port="user_id"><B><FONT face="Arial" point-size="9">user_id</FONT></B> <BR/> "#,
            r#"<B><FONT face="Arial" point-size="7" color="green">FK</FONT></B> "#,
            r#"<I><FONT face="Arial" point-size="7" color="gray">INT</FONT></I> "#,
            r#"<FONT face="Arial" point-size="7" color="gray">NULL</FONT></TD>"#
        )));
    }

    #[test]
    fn test_not_null_plain_column_has_type_only() {
        let table = Table::new("t").with_column(Column::new("name", "TEXT").not_null());
        let rendered = build_label(&table, &LabelStyle::default()).render();

        assert!(rendered.contains(
            r#"<BR/> <I><FONT face="Arial" point-size="7" color="gray">TEXT</FONT></I></TD>"#
        ));
        assert!(!rendered.contains("NULL"));
    }

    #[test]
    fn test_user_text_is_escaped() {
        let table = Table::new("a<b").with_column(Column::new("x", "varchar(10) & \"q\""));
        let rendered = build_label(&table, &LabelStyle::default()).render();
        assert!(rendered.contains("a&lt;b"));
        assert!(rendered.contains("varchar(10) &amp; &quot;q&quot;"));
    }
}
