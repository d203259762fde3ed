//! Rendering assembled diagrams through Graphviz.
//!
//! The renderer is an external program: DOT source goes in on stdin and the
//! serialized document comes back on stdout. Failures surface the renderer's
//! own message and leave no output behind.

use crate::diagram::{to_dot, DiagramGraph, DotOptions};
use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::io::Write;
use std::process::{Command, Stdio};
use std::str::FromStr;
use tracing::debug;

/// Root `<svg ...>` start tag
static SVG_ROOT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<svg\b[^>]*>").unwrap());

/// `width="<number><unit>"` inside the root tag
static SVG_WIDTH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\swidth="([\d.]+)([^"]*)""#).unwrap());

/// `height="<number><unit>"` inside the root tag
static SVG_HEIGHT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\sheight="([\d.]+)([^"]*)""#).unwrap());

/// Document formats Graphviz can produce for us
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderFormat {
    #[default]
    Svg,
    Png,
    Pdf,
}

impl FromStr for RenderFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "svg" => Ok(RenderFormat::Svg),
            "png" => Ok(RenderFormat::Png),
            "pdf" => Ok(RenderFormat::Pdf),
            _ => Err(format!(
                "Unknown render format: {}. Valid options: svg, png, pdf",
                s
            )),
        }
    }
}

impl fmt::Display for RenderFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl RenderFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            RenderFormat::Svg => "svg",
            RenderFormat::Png => "png",
            RenderFormat::Pdf => "pdf",
        }
    }

    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        ext.parse().ok()
    }
}

/// A document returned by a renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDiagram {
    pub format: RenderFormat,
    pub bytes: Vec<u8>,
}

impl RenderedDiagram {
    /// SVG text, when the document is SVG
    pub fn as_svg(&self) -> Option<&str> {
        match self.format {
            RenderFormat::Svg => std::str::from_utf8(&self.bytes).ok(),
            _ => None,
        }
    }

    /// Dimensions of the SVG root element, if any
    pub fn size(&self) -> Option<DiagramSize> {
        self.as_svg().and_then(svg_size)
    }
}

/// Render port: turns node/edge declarations into a document
pub trait Renderer {
    fn render(&self, graph: &DiagramGraph) -> Result<RenderedDiagram>;
}

/// Renderer backed by the Graphviz `dot` executable
#[derive(Debug, Clone)]
pub struct GraphvizRenderer {
    program: String,
    format: RenderFormat,
    options: DotOptions,
}

impl Default for GraphvizRenderer {
    fn default() -> Self {
        Self::new(RenderFormat::Svg)
    }
}

impl GraphvizRenderer {
    pub fn new(format: RenderFormat) -> Self {
        Self {
            program: "dot".to_string(),
            format,
            options: DotOptions::default(),
        }
    }

    /// Use another Graphviz executable (path or name on PATH)
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_options(mut self, options: DotOptions) -> Self {
        self.options = options;
        self
    }

    /// Run the renderer on DOT source directly
    pub fn render_source(&self, dot_source: &str) -> Result<RenderedDiagram> {
        let format_arg = format!("-T{}", self.format.extension());
        debug!(program = %self.program, format = %self.format, "spawning renderer");

        let mut child = Command::new(&self.program)
            .arg(&format_arg)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    anyhow::anyhow!(
                        "Graphviz '{}' command not found. Install Graphviz or use --format dot instead.",
                        self.program
                    )
                } else {
                    anyhow::anyhow!("Failed to run {}: {}", self.program, e)
                }
            })?;

        // A renderer that exits early closes its stdin; its own message wins over the pipe error
        let sent = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(dot_source.as_bytes()),
            None => Ok(()),
        };

        let output = child
            .wait_with_output()
            .context("failed to wait for renderer")?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "Graphviz {} command failed with status {}: {}",
                self.program,
                output.status,
                stderr.trim()
            );
        }
        sent.context("failed to send DOT source to renderer")?;

        Ok(RenderedDiagram {
            format: self.format,
            bytes: output.stdout,
        })
    }
}

impl Renderer for GraphvizRenderer {
    fn render(&self, graph: &DiagramGraph) -> Result<RenderedDiagram> {
        self.render_source(&to_dot(graph, &self.options))
    }
}

/// Width and height of a rendered document, with their unit suffixes
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramSize {
    pub width: f64,
    pub height: f64,
    pub width_unit: String,
    pub height_unit: String,
}

impl DiagramSize {
    /// Size scaled by a zoom factor, units unchanged
    pub fn scaled(&self, factor: f64) -> DiagramSize {
        DiagramSize {
            width: self.width * factor,
            height: self.height * factor,
            width_unit: self.width_unit.clone(),
            height_unit: self.height_unit.clone(),
        }
    }
}

impl fmt::Display for DiagramSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{} x {}{}",
            self.width, self.width_unit, self.height, self.height_unit
        )
    }
}

/// Read the root element's `width`/`height`, keeping only the leading number
pub fn svg_size(svg: &str) -> Option<DiagramSize> {
    let root = SVG_ROOT_RE.find(svg)?.as_str();
    let width = SVG_WIDTH_RE.captures(root)?;
    let height = SVG_HEIGHT_RE.captures(root)?;

    Some(DiagramSize {
        width: width[1].parse().ok()?,
        height: height[1].parse().ok()?,
        width_unit: width[2].to_string(),
        height_unit: height[2].to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_svg_size_points() {
        let svg = r#"<?xml version="1.0"?>
<svg width="262pt" height="130.5pt"
 viewBox="0.00 0.00 262.00 130.50" xmlns="http://www.w3.org/2000/svg">
<g id="graph0" class="graph"><polygon width="1" height="2"/></g></svg>"#;
        let size = svg_size(svg).unwrap();
        assert_eq!(size.width, 262.0);
        assert_eq!(size.height, 130.5);
        assert_eq!(size.width_unit, "pt");
    }

    #[test]
    fn test_svg_size_without_unit_or_reordered() {
        let size = svg_size(r#"<svg height="40" width="80px">"#).unwrap();
        assert_eq!(size.width, 80.0);
        assert_eq!(size.width_unit, "px");
        assert_eq!(size.height, 40.0);
        assert_eq!(size.height_unit, "");
    }

    #[test]
    fn test_svg_size_missing() {
        assert!(svg_size("<svg viewBox=\"0 0 1 1\"></svg>").is_none());
        assert!(svg_size("not svg").is_none());
    }

    #[test]
    fn test_scaled() {
        let size = svg_size(r#"<svg width="100pt" height="50pt">"#).unwrap();
        let zoomed = size.scaled(1.2);
        assert!((zoomed.width - 120.0).abs() < 1e-9);
        assert!((zoomed.height - 60.0).abs() < 1e-9);
        assert_eq!(size.scaled(2.0).to_string(), "200pt x 100pt");
    }

    #[test]
    fn test_missing_program_reports_not_found() {
        let renderer = GraphvizRenderer::default().with_program("structura-no-such-dot");
        let err = renderer.render(&DiagramGraph::default()).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[cfg(unix)]
    #[test]
    fn test_early_exit_reports_renderer_stderr() {
        use crate::diagram::{assemble, LabelStyle, VisibilityMap};
        use crate::schema::{Column, Table};
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::TempDir::new().unwrap();
        let script = dir.path().join("failing-dot");
        std::fs::write(
            &script,
            "#!/bin/sh\necho 'Error: syntax error in line 1' >&2\nexit 1\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        // Large enough that the DOT source overflows the pipe buffer
        let tables: Vec<Table> = (0..400)
            .map(|t| {
                (0..10).fold(Table::new(format!("table_{}", t)), |table, c| {
                    table.with_column(Column::new(format!("column_{}", c), "VARCHAR(255)"))
                })
            })
            .collect();
        let graph = assemble(&tables, &VisibilityMap::new(), &LabelStyle::default());

        let renderer = GraphvizRenderer::default().with_program(script.to_str().unwrap());
        let err = renderer.render(&graph).unwrap_err().to_string();
        assert!(err.contains("Error: syntax error in line 1"), "got: {}", err);
        assert!(!err.contains("Broken pipe"));
    }
}
