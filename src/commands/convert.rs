//! Convert command implementation.
//!
//! The convert command:
//! 1. Reads and aggregates the trace dump into a call tree
//! 2. Builds collapsed stacks
//! 3. Calculates hot paths and statistics
//! 4. Renders the requested artifacts (DOT, flamegraph)
//! 5. Writes output files

use crate::aggregator::{build_call_tree, build_collapsed_stacks, calculate_tree_stats};
use crate::output::{write_collapsed, write_dot, write_report, write_svg, Report};
use crate::render::{
    collapsed_text, generate_flamegraph, generate_text_summary, render_dot, FlamegraphConfig,
};
use crate::utils::config::{DEFAULT_TOP_PATHS, MAX_TOP_PATHS};
use anyhow::{Context, Result};
use log::{debug, info};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Instant;

/// Arguments for the convert command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct ConvertArgs {
    /// Path to the IgProf trace dump
    pub input: PathBuf,

    /// Output path for JSON report
    pub output_json: PathBuf,

    /// Output path for Graphviz DOT graph (optional)
    pub output_dot: Option<PathBuf>,

    /// Output path for SVG flamegraph (optional)
    pub output_svg: Option<PathBuf>,

    /// Output path for collapsed stacks (optional)
    pub output_collapsed: Option<PathBuf>,

    /// Number of top hot paths to include in report
    pub top_paths: usize,

    /// Flamegraph configuration
    pub flamegraph_config: Option<FlamegraphConfig>,

    /// Print text summary to stdout
    pub print_summary: bool,
}

impl Default for ConvertArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            output_json: PathBuf::from("report.json"),
            output_dot: None,
            output_svg: None,
            output_collapsed: None,
            top_paths: DEFAULT_TOP_PATHS,
            flamegraph_config: None,
            print_summary: false,
        }
    }
}

/// Execute the convert command
///
/// **Public** - main entry point called from main.rs
///
/// # Arguments
/// * `args` - Convert command arguments
///
/// # Returns
/// The assembled report, after every requested file was written
///
/// # Errors
/// * Trace file cannot be opened
/// * Malformed lines or unresolved references in the trace
/// * Rendering or file write errors
pub fn execute_convert(args: ConvertArgs) -> Result<Report> {
    let start_time = Instant::now();

    info!("Starting conversion of: {}", args.input.display());

    // Step 1: Aggregate the trace
    info!("Step 1/5: Building call tree...");
    let file = File::open(&args.input)
        .with_context(|| format!("Failed to open trace file {}", args.input.display()))?;
    let tree = build_call_tree(BufReader::new(file))
        .with_context(|| format!("Failed to build call tree from {}", args.input.display()))?;

    debug!(
        "Call tree: {} nodes, {} total ticks",
        tree.node_count(),
        tree.count()
    );

    // Step 2: Build collapsed stacks
    info!("Step 2/5: Building collapsed stacks...");
    let stacks = build_collapsed_stacks(&tree);

    debug!("Built {} stacks with self ticks", stacks.len());

    let stats = calculate_tree_stats(&tree);
    info!("Tree statistics: {}", stats.summary());

    // Step 3: Render optional artifacts while the tree is still ours
    info!("Step 3/5: Rendering requested artifacts...");
    let dot = args.output_dot.as_ref().map(|_| render_dot(&tree));

    let svg = match &args.output_svg {
        Some(_) => Some(
            generate_flamegraph(&stacks, args.flamegraph_config.as_ref())
                .context("Failed to generate flamegraph")?,
        ),
        None => None,
    };

    if args.print_summary {
        println!("\n{}", "=".repeat(80));
        println!("CALL TREE SUMMARY");
        println!("{}", "=".repeat(80));
        println!("{}", generate_text_summary(&tree, &stacks, 10));
        println!("{}", "=".repeat(80));
    }

    // Step 4: Assemble the report
    info!("Step 4/5: Calculating top {} hot paths...", args.top_paths);
    let report = Report::from_tree(tree, &stacks, args.top_paths);

    for (i, path) in report.hot_paths.iter().take(3).enumerate() {
        debug!(
            "  {}. {} ticks ({:.1}%): {}",
            i + 1,
            path.ticks,
            path.percentage,
            path.stack
        );
    }

    // Step 5: Write outputs
    info!("Step 5/5: Writing output files...");

    write_report(&report, &args.output_json).context("Failed to write report JSON")?;
    info!("✓ Report written to: {}", args.output_json.display());

    if let (Some(dot), Some(path)) = (dot, &args.output_dot) {
        write_dot(&dot, path).context("Failed to write DOT graph")?;
        info!("✓ DOT graph written to: {}", path.display());
    }

    if let (Some(svg), Some(path)) = (svg, &args.output_svg) {
        write_svg(&svg, path).context("Failed to write flamegraph SVG")?;
        info!("✓ Flamegraph written to: {}", path.display());
    }

    if let Some(path) = &args.output_collapsed {
        write_collapsed(&collapsed_text(&stacks), path)
            .context("Failed to write collapsed stacks")?;
        info!("✓ Collapsed stacks written to: {}", path.display());
    }

    let elapsed = start_time.elapsed();
    info!("Conversion completed in {:.2}s", elapsed.as_secs_f64());

    Ok(report)
}

/// Validate convert arguments
///
/// **Public** - can be called before execute_convert for early validation
///
/// # Arguments
/// * `args` - Arguments to validate
///
/// # Returns
/// Ok if arguments are valid, Err with message if not
pub fn validate_args(args: &ConvertArgs) -> Result<()> {
    if args.input.as_os_str().is_empty() {
        anyhow::bail!("Input trace path cannot be empty");
    }

    if !args.input.is_file() {
        anyhow::bail!("Input trace not found: {}", args.input.display());
    }

    if args.top_paths == 0 {
        anyhow::bail!("top_paths must be greater than 0");
    }

    if args.top_paths > MAX_TOP_PATHS {
        anyhow::bail!("top_paths is too large (max {})", MAX_TOP_PATHS);
    }

    if let Some(config) = &args.flamegraph_config {
        if config.width == 0 {
            anyhow::bail!("Flamegraph width must be greater than 0");
        }
    }

    Ok(())
}
