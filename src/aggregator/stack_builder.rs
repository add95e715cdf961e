//! Build collapsed stack format from a finished call tree.
//!
//! Collapsed stacks are the input format for flamegraph generation.
//! Format: "parent;child;grandchild weight"
//!
//! Example: "main@0;run@1f;compute@4 12"
//! This means: main called run which called compute, and 12 ticks were
//! sampled with exactly that call path.

use super::call_tree::{CallTreeNode, EngineTag};
use log::debug;

/// A single collapsed stack entry
///
/// **Public** - used by flamegraph generator and metrics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollapsedStack {
    /// Stack trace as semicolon-separated string
    pub stack: String,

    /// Weight (self ticks of the node this path ends at)
    pub weight: u64,

    /// Engine of the path's last frame
    pub engine: EngineTag,
}

impl CollapsedStack {
    /// Create a new collapsed stack
    ///
    /// **Public** - constructor
    pub fn new(stack: String, weight: u64, engine: EngineTag) -> Self {
        Self {
            stack,
            weight,
            engine,
        }
    }

    /// Render as one line of folded-stack text
    pub fn to_line(&self) -> String {
        format!("{} {}", self.stack, self.weight)
    }
}

/// Build collapsed stacks from a call tree
///
/// **Public** - main entry point for stack building
///
/// # Arguments
/// * `tree` - Root of the aggregated call tree
///
/// # Returns
/// One collapsed stack per node with self ticks, heaviest first
///
/// # Algorithm
/// 1. Walk the tree in pre-order
/// 2. Keep the labels of the current path, cut back to the node's depth
/// 3. Emit the joined path for every node that has self ticks
/// 4. Sort by weight (stable, so equal weights keep tree order)
pub fn build_collapsed_stacks(tree: &CallTreeNode) -> Vec<CollapsedStack> {
    let mut path: Vec<String> = Vec::new();
    let mut stacks = Vec::new();

    for (depth, node) in tree.walk() {
        if depth == 0 {
            // The root is not a frame
            continue;
        }
        path.truncate(depth - 1);
        path.push(node.frame_label());

        if node.self_count() > 0 {
            stacks.push(CollapsedStack::new(
                path.join(";"),
                node.self_count(),
                node.engine().clone(),
            ));
        }
    }

    stacks.sort_by(|a, b| b.weight.cmp(&a.weight));

    debug!("Built {} collapsed stacks", stacks.len());

    stacks
}
