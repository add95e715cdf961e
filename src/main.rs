//! igprof-calltree CLI
//!
//! Converts IgProf trace dumps into aggregated call trees.
//! Generates JSON reports, Graphviz graphs and flamegraphs.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use igprof_calltree::commands::{
    display_schema, display_version, execute_convert, validate_args, validate_report_file,
    ConvertArgs,
};
use igprof_calltree::render::FlamegraphConfig;
use igprof_calltree::utils::config::{
    DEFAULT_FLAMEGRAPH_WIDTH, DEFAULT_TOP_PATHS, TRACE_PATH_ENV,
};

/// igprof-calltree - Call tree aggregation for IgProf trace dumps
#[derive(Parser, Debug)]
#[command(name = "igprof-calltree")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Aggregate a trace dump into a call tree
    Convert {
        /// Path to the IgProf trace dump
        #[arg(short, long, env = TRACE_PATH_ENV)]
        input: PathBuf,

        /// Output path for JSON report
        #[arg(short, long, default_value = "report.json")]
        output: PathBuf,

        /// Output path for Graphviz DOT graph (optional)
        #[arg(long)]
        dot: Option<PathBuf>,

        /// Output path for SVG flamegraph (optional)
        #[arg(short, long)]
        flamegraph: Option<PathBuf>,

        /// Output path for collapsed stacks (optional)
        #[arg(long)]
        collapsed: Option<PathBuf>,

        /// Number of top hot paths to include
        #[arg(long, default_value_t = DEFAULT_TOP_PATHS)]
        top_paths: usize,

        /// Flamegraph title
        #[arg(long)]
        title: Option<String>,

        /// Flamegraph width in pixels
        #[arg(long, default_value_t = DEFAULT_FLAMEGRAPH_WIDTH)]
        width: usize,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,
    },

    /// Validate a report JSON file
    Validate {
        /// Path to report JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display schema information
    Schema {
        /// Show full schema details
        #[arg(long)]
        show: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Convert {
            input,
            output,
            dot,
            flamegraph,
            collapsed,
            top_paths,
            title,
            width,
            summary,
        } => {
            let fg_config = flamegraph.as_ref().map(|_| {
                let config = FlamegraphConfig::new().with_width(width);
                match title {
                    Some(title) => config.with_title(title),
                    None => config,
                }
            });

            let args = ConvertArgs {
                input,
                output_json: output,
                output_dot: dot,
                output_svg: flamegraph,
                output_collapsed: collapsed,
                top_paths,
                flamegraph_config: fg_config,
                print_summary: summary,
            };

            // Validate args first
            validate_args(&args)?;

            execute_convert(args)?;
        }

        Commands::Validate { file } => {
            validate_report_file(file)?;
        }

        Commands::Schema { show } => {
            display_schema(show);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
