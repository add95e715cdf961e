//! Output JSON schema definitions for call tree reports.
//!
//! This module defines the structure of JSON files we write to disk.
//! Schema is versioned to allow future evolution.

use crate::aggregator::{calculate_hot_paths, calculate_tree_stats, CallTreeNode, CollapsedStack};
use crate::utils::config::SCHEMA_VERSION;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-level report structure written to JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Schema version for compatibility checking
    pub version: String,

    /// Program name from the dump header
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,

    /// Sampling interval in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sampling_interval: Option<f64>,

    /// Total ticks attributed to the tree
    pub total_ticks: u64,

    /// Shape and cost statistics
    pub stats: TreeStats,

    /// Top hot paths (ranked by self ticks)
    pub hot_paths: Vec<HotPath>,

    /// The aggregated call tree
    pub tree: CallTreeNode,

    /// Timestamp when the report was generated
    pub generated_at: String,
}

/// Summary statistics for a call tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeStats {
    /// Nodes excluding the root
    pub node_count: usize,

    /// Nodes without children
    pub leaf_count: usize,

    /// Depth of the deepest call
    pub max_depth: usize,

    /// Self ticks per engine ("native" for native frames)
    pub ticks_by_engine: BTreeMap<String, u64>,
}

/// A hot path in the call tree (call path with self ticks)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotPath {
    /// Collapsed stack representation (e.g., "main@0;run@1f")
    pub stack: String,

    /// Self ticks of the path's last frame
    pub ticks: u64,

    /// Percentage of total ticks
    pub percentage: f64,
}

impl Report {
    /// Assemble a report from a finished tree
    ///
    /// **Public** - used by commands to create final output
    ///
    /// # Arguments
    /// * `tree` - Finished call tree (moved into the report)
    /// * `stacks` - Collapsed stacks of the same tree, heaviest first
    /// * `top_n` - Number of hot paths to keep
    pub fn from_tree(tree: CallTreeNode, stacks: &[CollapsedStack], top_n: usize) -> Self {
        use chrono::Utc;

        let total_ticks = tree.count();
        Report {
            version: SCHEMA_VERSION.to_string(),
            program: tree.program_name().map(str::to_string),
            sampling_interval: tree.sampling_interval(),
            total_ticks,
            stats: calculate_tree_stats(&tree),
            hot_paths: calculate_hot_paths(stacks, total_ticks, top_n),
            tree,
            generated_at: Utc::now().to_rfc3339(),
        }
    }
}
