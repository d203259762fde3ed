//! Graphviz HTML-like label markup.
//!
//! A small closed set of elements that render to the nested `<TABLE>`/`<FONT>`
//! markup Graphviz accepts inside `label=<...>`. The tree is schema-agnostic.
//!
//! Rendering rules:
//! - optional attributes are written only when set, never as `attr=""`
//! - attribute order inside a tag is the field order of the element struct
//! - text is written verbatim; callers escape user data before building
//! - `Content::Sequence` concatenates without a separator; [`join`] is the
//!   only place an explicit delimiter is inserted

use std::fmt::{self, Write};

/// One node of the markup tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    /// Raw text, written as-is
    Text(String),
    /// `<BR/>`
    LineBreak,
    /// `<FONT ...>`
    Font(StyledText),
    /// `<I>`
    Italic(Content),
    /// `<B>`
    Bold(Content),
    /// `<TD ...>`
    Cell(Cell),
    /// `<TR>`
    Row(Row),
    /// `<TABLE ...>`
    Table(GridTable),
}

/// Body of a text-bearing element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Single(Box<Element>),
    Sequence(Vec<Element>),
}

/// `<FONT>` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledText {
    pub content: Content,
    pub face: Option<String>,
    pub point_size: Option<u32>,
    pub color: Option<String>,
}

/// `<TD>` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub content: Content,
    pub port: Option<String>,
    pub align: Option<String>,
    pub bgcolor: Option<String>,
    pub border: Option<String>,
    pub cellborder: Option<String>,
    pub cellpadding: Option<String>,
    pub cellspacing: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
}

/// `<TR>` element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    pub cells: Vec<Cell>,
}

/// `<TABLE>` element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridTable {
    pub rows: Vec<Row>,
    pub border: Option<String>,
    pub cellborder: Option<String>,
    pub cellspacing: Option<String>,
    pub cellpadding: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
    pub bgcolor: Option<String>,
    pub color: Option<String>,
    pub port: Option<String>,
    pub sides: Option<String>,
    pub title: Option<String>,
    pub tooltip: Option<String>,
    pub href: Option<String>,
    pub target: Option<String>,
    pub id: Option<String>,
    pub class: Option<String>,
    pub style: Option<String>,
}

impl Element {
    pub fn text(value: impl Into<String>) -> Self {
        Element::Text(value.into())
    }

    pub fn bold(content: impl Into<Content>) -> Self {
        Element::Bold(content.into())
    }

    pub fn italic(content: impl Into<Content>) -> Self {
        Element::Italic(content.into())
    }

    /// Render this element and its children to a markup string
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl Default for Content {
    fn default() -> Self {
        Content::Text(String::new())
    }
}

impl From<&str> for Content {
    fn from(value: &str) -> Self {
        Content::Text(value.to_string())
    }
}

impl From<String> for Content {
    fn from(value: String) -> Self {
        Content::Text(value)
    }
}

impl From<Element> for Content {
    fn from(value: Element) -> Self {
        Content::Single(Box::new(value))
    }
}

impl From<Vec<Element>> for Content {
    fn from(value: Vec<Element>) -> Self {
        Content::Sequence(value)
    }
}

impl From<StyledText> for Element {
    fn from(value: StyledText) -> Self {
        Element::Font(value)
    }
}

impl From<Cell> for Element {
    fn from(value: Cell) -> Self {
        Element::Cell(value)
    }
}

impl From<Row> for Element {
    fn from(value: Row) -> Self {
        Element::Row(value)
    }
}

impl From<GridTable> for Element {
    fn from(value: GridTable) -> Self {
        Element::Table(value)
    }
}

impl StyledText {
    pub fn new(content: impl Into<Content>) -> Self {
        Self {
            content: content.into(),
            face: None,
            point_size: None,
            color: None,
        }
    }

    pub fn face(mut self, face: impl Into<String>) -> Self {
        self.face = Some(face.into());
        self
    }

    pub fn point_size(mut self, size: u32) -> Self {
        self.point_size = Some(size);
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

impl Cell {
    pub fn new(content: impl Into<Content>) -> Self {
        Self {
            content: content.into(),
            port: None,
            align: None,
            bgcolor: None,
            border: None,
            cellborder: None,
            cellpadding: None,
            cellspacing: None,
            width: None,
            height: None,
        }
    }

    pub fn port(mut self, port: impl Into<String>) -> Self {
        self.port = Some(port.into());
        self
    }

    pub fn align(mut self, align: impl Into<String>) -> Self {
        self.align = Some(align.into());
        self
    }

    pub fn bgcolor(mut self, color: impl Into<String>) -> Self {
        self.bgcolor = Some(color.into());
        self
    }

    pub fn border(mut self, border: impl Into<String>) -> Self {
        self.border = Some(border.into());
        self
    }

    pub fn width(mut self, width: impl Into<String>) -> Self {
        self.width = Some(width.into());
        self
    }

    pub fn height(mut self, height: impl Into<String>) -> Self {
        self.height = Some(height.into());
        self
    }
}

impl Row {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    /// Row holding exactly one cell
    pub fn single(cell: Cell) -> Self {
        Self { cells: vec![cell] }
    }
}

impl GridTable {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows,
            ..Default::default()
        }
    }

    pub fn border(mut self, border: impl Into<String>) -> Self {
        self.border = Some(border.into());
        self
    }

    pub fn cellborder(mut self, cellborder: impl Into<String>) -> Self {
        self.cellborder = Some(cellborder.into());
        self
    }

    pub fn cellspacing(mut self, cellspacing: impl Into<String>) -> Self {
        self.cellspacing = Some(cellspacing.into());
        self
    }

    pub fn cellpadding(mut self, cellpadding: impl Into<String>) -> Self {
        self.cellpadding = Some(cellpadding.into());
        self
    }

    pub fn bgcolor(mut self, color: impl Into<String>) -> Self {
        self.bgcolor = Some(color.into());
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

/// Join rendered elements with `delimiter` into a single text element
pub fn join<'a, I>(delimiter: &str, elements: I) -> Element
where
    I: IntoIterator<Item = &'a Element>,
{
    let parts: Vec<String> = elements.into_iter().map(Element::render).collect();
    Element::Text(parts.join(delimiter))
}

/// Write ` name="value"` for every attribute that is set
fn write_attrs(f: &mut fmt::Formatter<'_>, attrs: &[(&str, Option<&str>)]) -> fmt::Result {
    for (name, value) in attrs {
        if let Some(value) = value {
            write!(f, " {}=\"{}\"", name, value)?;
        }
    }
    Ok(())
}

impl fmt::Display for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Content::Text(text) => f.write_str(text),
            Content::Single(element) => write!(f, "{}", element),
            Content::Sequence(elements) => {
                for element in elements {
                    write!(f, "{}", element)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for StyledText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let size = self.point_size.map(|s| s.to_string());
        f.write_str("<FONT")?;
        write_attrs(
            f,
            &[
                ("face", self.face.as_deref()),
                ("point-size", size.as_deref()),
                ("color", self.color.as_deref()),
            ],
        )?;
        write!(f, ">{}</FONT>", self.content)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<TD")?;
        write_attrs(
            f,
            &[
                ("port", self.port.as_deref()),
                ("align", self.align.as_deref()),
                ("bgcolor", self.bgcolor.as_deref()),
                ("border", self.border.as_deref()),
                ("cellborder", self.cellborder.as_deref()),
                ("cellpadding", self.cellpadding.as_deref()),
                ("cellspacing", self.cellspacing.as_deref()),
                ("width", self.width.as_deref()),
                ("height", self.height.as_deref()),
            ],
        )?;
        write!(f, ">{}</TD>", self.content)
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<TR>")?;
        for cell in &self.cells {
            write!(f, "{}", cell)?;
        }
        f.write_str("</TR>")
    }
}

impl fmt::Display for GridTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<TABLE")?;
        write_attrs(
            f,
            &[
                ("border", self.border.as_deref()),
                ("cellborder", self.cellborder.as_deref()),
                ("cellspacing", self.cellspacing.as_deref()),
                ("cellpadding", self.cellpadding.as_deref()),
                ("width", self.width.as_deref()),
                ("height", self.height.as_deref()),
                ("bgcolor", self.bgcolor.as_deref()),
                ("color", self.color.as_deref()),
                ("port", self.port.as_deref()),
                ("sides", self.sides.as_deref()),
                ("title", self.title.as_deref()),
                ("tooltip", self.tooltip.as_deref()),
                ("href", self.href.as_deref()),
                ("target", self.target.as_deref()),
                ("id", self.id.as_deref()),
                ("class", self.class.as_deref()),
                ("style", self.style.as_deref()),
            ],
        )?;
        f.write_char('>')?;
        for row in &self.rows {
            write!(f, "{}", row)?;
        }
        f.write_str("</TABLE>")
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::Text(text) => f.write_str(text),
            Element::LineBreak => f.write_str("<BR/>"),
            Element::Font(font) => write!(f, "{}", font),
            Element::Italic(content) => write!(f, "<I>{}</I>", content),
            Element::Bold(content) => write!(f, "<B>{}</B>", content),
            Element::Cell(cell) => write!(f, "{}", cell),
            Element::Row(row) => write!(f, "{}", row),
            Element::Table(table) => write!(f, "{}", table),
        }
    }
}
