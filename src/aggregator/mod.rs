//! Aggregation of trace records into a call tree.
//!
//! This module transforms parsed dump records into:
//! - Intern tables for engines, files and functions
//! - An aggregated call tree with inclusive and self tick counts
//! - A flat, index-linked form of the tree for serialization
//! - Collapsed stacks (for flamegraph generation)
//! - Hot paths and tree statistics

pub mod call_tree;
pub mod flat_tree;
pub mod intern;
pub mod metrics;
pub mod stack_builder;
pub mod tree_builder;

// Re-export main types and functions
pub use call_tree::{CallIdentity, CallTreeNode, EngineTag, ProgramInfo};
pub use flat_tree::{FlatNode, FlatTree};
pub use intern::{FunctionEntry, InternTables};
pub use metrics::{calculate_hot_paths, calculate_tree_stats};
pub use stack_builder::{build_collapsed_stacks, CollapsedStack};
pub use tree_builder::{build_call_tree, build_call_tree_from_str, TreeBuilder};
