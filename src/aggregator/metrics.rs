//! Calculate hot paths and statistics from an aggregated call tree.
//!
//! Hot paths are the call paths with the most self ticks.
//! These are the primary targets for optimization.

use super::call_tree::{CallTreeNode, EngineTag};
use super::stack_builder::CollapsedStack;
use crate::output::schema::{HotPath, TreeStats};
use log::debug;

/// Calculate hot paths from collapsed stacks
///
/// **Public** - main entry point for metrics calculation
///
/// # Arguments
/// * `stacks` - Collapsed stacks from stack_builder
/// * `total_ticks` - Total ticks of the tree
/// * `top_n` - Number of top paths to return (e.g., 10)
///
/// # Returns
/// Vector of hot paths, sorted by ticks (descending)
pub fn calculate_hot_paths(
    stacks: &[CollapsedStack],
    total_ticks: u64,
    top_n: usize,
) -> Vec<HotPath> {
    debug!("Calculating top {} hot paths from {} stacks", top_n, stacks.len());

    // Stacks are already sorted by weight from stack_builder
    stacks
        .iter()
        .take(top_n)
        .map(|stack| create_hot_path(stack, total_ticks))
        .collect()
}

/// Create a HotPath from a CollapsedStack
pub fn create_hot_path(stack: &CollapsedStack, total_ticks: u64) -> HotPath {
    HotPath {
        stack: stack.stack.clone(),
        ticks: stack.weight,
        percentage: percentage(stack.weight, total_ticks),
    }
}

/// Share of `part` in `total`, in percent (0 when the total is empty)
pub fn percentage(part: u64, total: u64) -> f64 {
    if total > 0 {
        (part as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}

/// Calculate shape and engine statistics for a tree
///
/// **Public** - provides summary statistics
pub fn calculate_tree_stats(tree: &CallTreeNode) -> TreeStats {
    let mut stats = TreeStats::default();

    for (depth, node) in tree.walk() {
        stats.max_depth = stats.max_depth.max(depth);
        if node.is_root() {
            continue;
        }
        stats.node_count += 1;
        if node.children().is_empty() {
            stats.leaf_count += 1;
        }
        if node.self_count() > 0 {
            *stats
                .ticks_by_engine
                .entry(engine_key(node.engine()).to_string())
                .or_insert(0) += node.self_count();
        }
    }

    stats
}

fn engine_key(engine: &EngineTag) -> &str {
    match engine {
        EngineTag::Root => "root",
        EngineTag::Native => "native",
        EngineTag::NamedEngine(name) => name,
    }
}

impl TreeStats {
    /// Get human-readable summary
    ///
    /// **Public** - for logging and debugging
    pub fn summary(&self) -> String {
        let engines: Vec<String> = self
            .ticks_by_engine
            .iter()
            .map(|(engine, ticks)| format!("{}={}", engine, ticks))
            .collect();
        format!(
            "Nodes: {} | Leaves: {} | Max depth: {} | Ticks by engine: [{}]",
            self.node_count,
            self.leaf_count,
            self.max_depth,
            engines.join(", ")
        )
    }
}
