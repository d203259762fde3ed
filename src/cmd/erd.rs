//! ERD command: inspect a schema, apply visibility, assemble and render.

use crate::config::DiagramConfig;
use crate::diagram::{
    assemble, parse_patterns, to_dot, DiagramGraph, Layout, VisibilityMap, VisibilityState,
};
use crate::inspect::{inspector_for, Dialect, InputFormat};
use crate::render::{GraphvizRenderer, RenderFormat, Renderer};
use crate::schema::Table;
use anyhow::{Context, Result};
use schemars::JsonSchema;
use serde::Serialize;
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;

/// Arguments of the erd command, as parsed by clap
pub struct ErdArgs {
    pub file: PathBuf,
    pub output: Option<PathBuf>,
    pub format: Option<String>,
    pub input_format: Option<String>,
    pub dialect: Option<String>,
    pub schema: Option<String>,
    pub config: Option<PathBuf>,
    pub layout: Option<String>,
    pub hide: Option<String>,
    pub link: Option<String>,
    pub renderer: String,
    pub json: bool,
}

/// What the command writes: DOT source or a document rendered by Graphviz
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Dot,
    Rendered(RenderFormat),
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dot" | "gv" | "graphviz" => Ok(OutputFormat::Dot),
            other => other.parse().map(OutputFormat::Rendered).map_err(|_| {
                format!(
                    "Unknown format: {}. Valid options: dot, svg, png, pdf",
                    s
                )
            }),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Dot => write!(f, "dot"),
            OutputFormat::Rendered(format) => write!(f, "{}", format),
        }
    }
}

impl OutputFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        ext.parse().ok()
    }
}

/// Summary printed with --json
#[derive(Debug, Serialize, JsonSchema)]
pub struct ErdSummary {
    pub input: String,
    pub format: String,
    pub output: Option<String>,
    pub schema: Option<String>,
    /// Tables returned by the inspector
    pub tables: usize,
    pub nodes: usize,
    pub edges: usize,
    pub hidden: usize,
    pub linked: usize,
    /// Rendered SVG dimensions, e.g. "262pt x 130.5pt"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<String>,
}

pub fn run(args: ErdArgs) -> Result<()> {
    let format = if let Some(ref f) = args.format {
        f.parse().map_err(|e| anyhow::anyhow!("{}", e))?
    } else if let Some(ref out) = args.output {
        out.extension()
            .and_then(|e| e.to_str())
            .and_then(OutputFormat::from_extension)
            .unwrap_or(OutputFormat::Dot)
    } else {
        OutputFormat::Dot
    };

    let config = match args.config {
        Some(ref path) => DiagramConfig::load(path)?,
        None => DiagramConfig::default(),
    };

    let mut dot_options = config.dot_options();
    if let Some(ref layout) = args.layout {
        dot_options.layout = layout
            .parse::<Layout>()
            .map_err(|e| anyhow::anyhow!("{}", e))?;
    }

    let input_format = match args.input_format {
        Some(ref f) => f.parse().map_err(|e| anyhow::anyhow!("{}", e))?,
        None => InputFormat::from_path(&args.file),
    };

    // Explicit schema, then config, then the dialect's default
    let dialect: Option<Dialect> = args
        .dialect
        .as_deref()
        .map(str::parse::<Dialect>)
        .transpose()
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    let schema = args
        .schema
        .clone()
        .or_else(|| config.schema.clone())
        .or_else(|| dialect.and_then(|d| d.default_schema()).map(String::from));

    if !args.json {
        match schema {
            Some(ref s) => eprintln!(
                "Generating ERD: {} [{}, schema: {}]",
                args.file.display(),
                input_format,
                s
            ),
            None => eprintln!("Generating ERD: {} [{}]", args.file.display(), input_format),
        }
    }

    let tables = inspector_for(&args.file, input_format).get_tables(schema.as_deref())?;
    if tables.is_empty() && !args.json {
        eprintln!("No tables found in the input.");
    }

    let visibility = resolve_visibility(&config, &tables, args.link.as_deref(), args.hide.as_deref())?;
    let graph = assemble(&tables, &visibility, &config.style);
    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "assembled diagram"
    );

    let (bytes, dimensions) = match format {
        OutputFormat::Dot => (to_dot(&graph, &dot_options).into_bytes(), None),
        OutputFormat::Rendered(render_format) => {
            let renderer = GraphvizRenderer::new(render_format)
                .with_program(args.renderer.clone())
                .with_options(dot_options.clone());
            let rendered = renderer.render(&graph)?;
            let dimensions = rendered.size().map(|size| size.to_string());
            (rendered.bytes, dimensions)
        }
    };

    match args.output {
        Some(ref path) => {
            fs::write(path, &bytes)
                .with_context(|| format!("failed to write {}", path.display()))?;
            if !args.json {
                eprintln!("ERD written to: {}", path.display());
            }
        }
        // stdout carries the summary instead
        None if args.json => {}
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&bytes)?;
            stdout.flush()?;
        }
    }

    let summary = summarize(&args, format, schema, &tables, &visibility, &graph, dimensions);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        eprintln!(
            "\nERD: {} tables, {} cards, {} relationships ({} hidden, {} linked)",
            summary.tables, summary.nodes, summary.edges, summary.hidden, summary.linked
        );
        if let Some(ref dimensions) = summary.dimensions {
            eprintln!("Size: {}", dimensions);
        }
    }

    Ok(())
}

/// Config entries first, then `--link`/`--hide` patterns on top
fn resolve_visibility(
    config: &DiagramConfig,
    tables: &[Table],
    link: Option<&str>,
    hide: Option<&str>,
) -> Result<VisibilityMap> {
    let link = parse_patterns(link.unwrap_or("")).map_err(|e| anyhow::anyhow!("{}", e))?;
    let hide = parse_patterns(hide.unwrap_or("")).map_err(|e| anyhow::anyhow!("{}", e))?;

    // Relation targets count too, so a table missing from a partial dump can still be hidden
    let names = tables.iter().flat_map(|t| {
        std::iter::once(t.name.as_str())
            .chain(t.relations.iter().map(|r| r.related_table_name.as_str()))
    });

    let mut visibility = config.visibility_map();
    let from_cli = VisibilityMap::from_patterns(names, &link, &hide);
    visibility.merge(&from_cli);
    Ok(visibility)
}

fn summarize(
    args: &ErdArgs,
    format: OutputFormat,
    schema: Option<String>,
    tables: &[Table],
    visibility: &VisibilityMap,
    graph: &DiagramGraph,
    dimensions: Option<String>,
) -> ErdSummary {
    let count = |state: VisibilityState| {
        tables
            .iter()
            .filter(|t| visibility.state_of(&t.name) == state)
            .count()
    };

    ErdSummary {
        input: args.file.display().to_string(),
        format: format.to_string(),
        output: args.output.as_ref().map(|p| p.display().to_string()),
        schema,
        tables: tables.len(),
        nodes: graph.node_count(),
        edges: graph.edge_count(),
        hidden: count(VisibilityState::Hide),
        linked: count(VisibilityState::Link),
        dimensions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Column;

    #[test]
    fn test_output_format_parse() {
        assert_eq!("DOT".parse::<OutputFormat>().unwrap(), OutputFormat::Dot);
        assert_eq!(
            "svg".parse::<OutputFormat>().unwrap(),
            OutputFormat::Rendered(RenderFormat::Svg)
        );
        let err = "jpeg".parse::<OutputFormat>().unwrap_err();
        assert!(err.contains("Valid options: dot, svg, png, pdf"));
    }

    #[test]
    fn test_cli_visibility_overrides_config() {
        let mut config = DiagramConfig::default();
        config.visibility.insert("users".into(), VisibilityState::Link);
        config.visibility.insert("orders".into(), VisibilityState::Hide);

        let tables = vec![
            Table::new("users").with_column(Column::new("id", "INT")),
            Table::new("orders"),
            Table::new("audit_log"),
        ];
        let visibility =
            resolve_visibility(&config, &tables, Some("audit_*"), Some("users")).unwrap();

        assert_eq!(visibility.state_of("users"), VisibilityState::Hide);
        assert_eq!(visibility.state_of("orders"), VisibilityState::Hide);
        assert_eq!(visibility.state_of("audit_log"), VisibilityState::Link);
    }

    #[test]
    fn test_patterns_reach_undeclared_relation_targets() {
        let tables = vec![Table::new("order_items")
            .with_column(Column::new("product_id", "INT").foreign_key())
            .with_relation("product_id", "products", "id")];

        let visibility =
            resolve_visibility(&DiagramConfig::default(), &tables, None, Some("prod*")).unwrap();
        assert_eq!(visibility.state_of("products"), VisibilityState::Hide);

        let graph = assemble(&tables, &visibility, &DiagramConfig::default().style);
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn test_invalid_pattern() {
        let err = resolve_visibility(&DiagramConfig::default(), &[], None, Some("[abc")).unwrap_err();
        assert!(err.to_string().contains("Invalid table pattern"));
    }
}
