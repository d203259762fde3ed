mod erd;
mod inspect;
mod schema;

pub use erd::ErdSummary;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "structura")]
#[command(version)]
#[command(about = "Draw entity-relationship diagrams from database schemas", long_about = None)]
pub struct Cli {
    /// Verbose logging (same as RUST_LOG=structura=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate an ERD from a DDL dump or schema snapshot
    #[command(visible_alias = "graph")]
    Erd {
        /// Input DDL script or JSON/YAML snapshot
        /// Supports .gz, .bz2, .xz, .zst compression
        file: PathBuf,

        /// Output file (format detected from extension; stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format: dot, svg, png, pdf
        #[arg(short, long)]
        format: Option<String>,

        /// Input format: ddl or snapshot (detected from extension if not specified)
        #[arg(long)]
        input_format: Option<String>,

        /// Database dialect: postgres, mysql, sqlite (selects the default schema)
        #[arg(short, long)]
        dialect: Option<String>,

        /// Schema to draw (overrides config and dialect default)
        #[arg(short, long)]
        schema: Option<String>,

        /// Diagram config file (YAML or JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Layout direction: lr (left-right) or tb (top-bottom)
        #[arg(long)]
        layout: Option<String>,

        /// Tables to hide entirely (comma-separated, supports globs)
        #[arg(long)]
        hide: Option<String>,

        /// Tables drawn only as relation endpoints (comma-separated, supports globs)
        #[arg(long)]
        link: Option<String>,

        /// Graphviz executable used for svg/png/pdf output
        #[arg(long, default_value = "dot")]
        renderer: String,

        /// Print a JSON summary instead of status lines (the diagram needs -o)
        #[arg(long)]
        json: bool,
    },

    /// Write the normalized schema snapshot as JSON
    Inspect {
        /// Input DDL script or JSON/YAML snapshot
        file: PathBuf,

        /// Schema to inspect
        #[arg(short, long)]
        schema: Option<String>,

        /// Input format: ddl or snapshot (detected from extension if not specified)
        #[arg(long)]
        input_format: Option<String>,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print a JSON Schema: the snapshot format or the erd --json summary
    Schema {
        /// Schema name: snapshot or erd
        #[arg(default_value = "snapshot")]
        name: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Erd {
            file,
            output,
            format,
            input_format,
            dialect,
            schema,
            config,
            layout,
            hide,
            link,
            renderer,
            json,
        } => erd::run(erd::ErdArgs {
            file,
            output,
            format,
            input_format,
            dialect,
            schema,
            config,
            layout,
            hide,
            link,
            renderer,
            json,
        }),
        Commands::Inspect {
            file,
            schema,
            input_format,
            output,
        } => inspect::run(file, schema, input_format, output),
        Commands::Schema { name, output } => schema::run(name, output),
        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "structura", &mut io::stdout());
            Ok(())
        }
    }
}
