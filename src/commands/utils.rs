use crate::output::read_report;
use crate::utils::config::SCHEMA_VERSION;
use anyhow::Result;
use std::path::PathBuf;

/// Validate a report JSON file
pub fn validate_report_file(file_path: PathBuf) -> Result<()> {
    println!("Validating report: {}", file_path.display());

    let report = read_report(&file_path)?;

    println!("✓ Valid report JSON");
    println!("  Version: {}", report.version);
    println!("  Program: {}", report.program.as_deref().unwrap_or("-"));
    println!("  Total Ticks: {}", report.total_ticks);
    println!("  Nodes: {}", report.stats.node_count);
    println!("  Max Depth: {}", report.stats.max_depth);
    println!("  Hot Paths: {}", report.hot_paths.len());

    Ok(())
}

/// Display schema information
pub fn display_schema(show_details: bool) {
    println!("IgProf Call Tree Report Schema");
    println!("Current Version: {}", SCHEMA_VERSION);
    println!();

    if show_details {
        println!("Schema Structure:");
        println!("  version: string             - Schema version (e.g., '1.0.0')");
        println!("  program: string?            - Program name from the dump header");
        println!("  sampling_interval: number?  - Seconds per sample");
        println!("  total_ticks: number         - Ticks attributed to the root");
        println!("  stats: object               - Tree statistics");
        println!("    node_count: number        - Nodes excluding the root");
        println!("    leaf_count: number        - Nodes without children");
        println!("    max_depth: number         - Deepest call level");
        println!("    ticks_by_engine: object   - Self ticks per engine");
        println!("  hot_paths: array            - Call paths ranked by self ticks");
        println!("    stack: string             - Collapsed call path");
        println!("    ticks: number             - Self ticks of the last frame");
        println!("    percentage: number        - Percentage of total ticks");
        println!("  tree: object                - Call tree as a flat node list");
        println!("    program: object?          - name / sampling_interval");
        println!("    nodes: array              - Pre-order nodes, root at index 0");
        println!("      identity: object?       - file / function / offset (absent at root)");
        println!("      engine: object          - root, native or named_engine");
        println!("      count: number           - Inclusive ticks");
        println!("      self_count: number      - Ticks of the frame itself");
        println!("      parent: number?         - Index of the parent node");
        println!("      children: array         - Indices of the child nodes");
        println!("  generated_at: string        - ISO 8601 timestamp");
    } else {
        println!("Use --show for detailed schema information");
    }
}

/// Display version information
pub fn display_version() {
    println!("igprof-calltree v{}", env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Aggregates IgProf trace dumps into call trees, DOT graphs and flamegraphs.");
}
