//! Immutable call tree produced by the tree builder.
//!
//! Nodes own their children; siblings are kept in first-seen order and
//! never share a call identity. Counts are inclusive: a node's `count`
//! covers its own ticks plus every tick folded beneath it, while
//! `self_count` covers only frames whose path ends at the node.
//!
//! Nothing here recurses per tree level: traversals use an explicit work
//! stack, dropping moves descendants onto a work list, and cloning,
//! comparison, debug output and serde all go through the pre-order walk or
//! the flat form in `flat_tree`. Tree depth is bounded by memory, not by
//! the thread's call stack.

use super::flat_tree::FlatTree;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Identity of a call site: `(file, function-or-address, call offset)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallIdentity {
    pub file: String,
    pub function: String,
    pub offset: String,
}

impl fmt::Display for CallIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.function, self.offset)
    }
}

/// Runtime context a node belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum EngineTag {
    /// Synthetic root of the tree
    Root,
    /// Frame recorded without an engine reference
    Native,
    /// Frame from a named engine, e.g. an interpreter
    NamedEngine(String),
}

/// Program header values carried by the root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramInfo {
    pub name: String,
    pub sampling_interval: f64,
}

/// One node of the aggregated call tree
///
/// Serializes as a `FlatTree`.
pub struct CallTreeNode {
    identity: Option<CallIdentity>,
    engine: EngineTag,
    count: u64,
    self_count: u64,
    program: Option<ProgramInfo>,
    children: Vec<CallTreeNode>,
}

impl CallTreeNode {
    pub(crate) fn new_root(program: Option<ProgramInfo>, count: u64, self_count: u64) -> Self {
        Self {
            identity: None,
            engine: EngineTag::Root,
            count,
            self_count,
            program,
            children: Vec::new(),
        }
    }

    pub(crate) fn new_call(
        identity: CallIdentity,
        engine: EngineTag,
        count: u64,
        self_count: u64,
    ) -> Self {
        Self {
            identity: Some(identity),
            engine,
            count,
            self_count,
            program: None,
            children: Vec::new(),
        }
    }

    pub(crate) fn from_parts(
        identity: Option<CallIdentity>,
        engine: EngineTag,
        count: u64,
        self_count: u64,
        program: Option<ProgramInfo>,
        children: Vec<CallTreeNode>,
    ) -> Self {
        Self {
            identity,
            engine,
            count,
            self_count,
            program,
            children,
        }
    }

    pub(crate) fn with_children(mut self, children: Vec<CallTreeNode>) -> Self {
        self.children = children;
        self
    }

    /// Same frame data, children not compared
    fn same_frame(&self, other: &CallTreeNode) -> bool {
        self.identity == other.identity
            && self.engine == other.engine
            && self.count == other.count
            && self.self_count == other.self_count
            && self.program == other.program
    }

    /// Call identity; `None` only for the root
    pub fn identity(&self) -> Option<&CallIdentity> {
        self.identity.as_ref()
    }

    pub fn engine(&self) -> &EngineTag {
        &self.engine
    }

    pub fn is_root(&self) -> bool {
        self.engine == EngineTag::Root
    }

    /// Inclusive tick count
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Ticks of frames whose path ends at this node
    pub fn self_count(&self) -> u64 {
        self.self_count
    }

    pub fn children(&self) -> &[CallTreeNode] {
        &self.children
    }

    /// Program header values (root only)
    pub fn program(&self) -> Option<&ProgramInfo> {
        self.program.as_ref()
    }

    pub fn program_name(&self) -> Option<&str> {
        self.program.as_ref().map(|p| p.name.as_str())
    }

    pub fn sampling_interval(&self) -> Option<f64> {
        self.program.as_ref().map(|p| p.sampling_interval)
    }

    /// Child with the given identity, if any
    pub fn child(&self, identity: &CallIdentity) -> Option<&CallTreeNode> {
        self.children
            .iter()
            .find(|c| c.identity.as_ref() == Some(identity))
    }

    /// Child whose function name matches
    ///
    /// **Public** - convenience lookup for reports and tests
    pub fn child_named(&self, function: &str) -> Option<&CallTreeNode> {
        self.children
            .iter()
            .find(|c| c.identity.as_ref().is_some_and(|id| id.function == function))
    }

    /// Pre-order walk yielding `(depth, node)`, the root at depth 0
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            pending: vec![(0, self)],
        }
    }

    /// Total number of nodes, root included
    pub fn node_count(&self) -> usize {
        self.walk().count()
    }

    /// Depth of the deepest node (0 for a lone root)
    pub fn max_depth(&self) -> usize {
        self.walk().map(|(depth, _)| depth).max().unwrap_or(0)
    }

    /// Display label for a frame: `function@offset`, or `file:line` for
    /// named-engine frames whose offsets are line numbers
    pub fn frame_label(&self) -> String {
        match (&self.engine, &self.identity) {
            (EngineTag::NamedEngine(_), Some(id)) => {
                format!("{}:{}", id.file, offset_as_line(&id.offset))
            }
            (_, Some(id)) => format!("{}@{}", id.function, id.offset),
            (_, None) => self
                .program_name()
                .map(str::to_string)
                .unwrap_or_else(|| "root".to_string()),
        }
    }
}

/// Decimal line number for a hex offset; falls back to the raw text
pub fn offset_as_line(offset: &str) -> String {
    u64::from_str_radix(offset, 16)
        .map(|line| line.to_string())
        .unwrap_or_else(|_| offset.to_string())
}

impl Drop for CallTreeNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

impl Clone for CallTreeNode {
    fn clone(&self) -> Self {
        FlatTree::from_tree(self).assemble()
    }
}

impl PartialEq for CallTreeNode {
    /// Equal pre-order sequences of `(depth, frame)` mean equal trees
    fn eq(&self, other: &Self) -> bool {
        let mut left = self.walk();
        let mut right = other.walk();
        loop {
            match (left.next(), right.next()) {
                (None, None) => return true,
                (Some((l_depth, l)), Some((r_depth, r)))
                    if l_depth == r_depth && l.same_frame(r) => {}
                _ => return false,
            }
        }
    }
}

impl fmt::Debug for CallTreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&FlatTree::from_tree(self), f)
    }
}

impl Serialize for CallTreeNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        FlatTree::from_tree(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CallTreeNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        FlatTree::deserialize(deserializer)?
            .into_tree()
            .map_err(serde::de::Error::custom)
    }
}

/// Pre-order iterator over a call tree
pub struct Walk<'a> {
    pending: Vec<(usize, &'a CallTreeNode)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (usize, &'a CallTreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.pending.pop()?;
        // Reverse so the first child is visited first
        self.pending
            .extend(node.children.iter().rev().map(|child| (depth + 1, child)));
        Some((depth, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(function: &str, offset: &str) -> CallIdentity {
        CallIdentity {
            file: "a.c".to_string(),
            function: function.to_string(),
            offset: offset.to_string(),
        }
    }

    fn sample_tree() -> CallTreeNode {
        let leaf = CallTreeNode::new_call(identity("leaf", "4"), EngineTag::Native, 2, 2);
        let mid = CallTreeNode::new_call(identity("mid", "2"), EngineTag::Native, 5, 3)
            .with_children(vec![leaf]);
        let other = CallTreeNode::new_call(
            identity("other", "1a"),
            EngineTag::NamedEngine("python".to_string()),
            1,
            1,
        );
        CallTreeNode::new_root(None, 6, 0).with_children(vec![mid, other])
    }

    #[test]
    fn test_walk_is_preorder() {
        let tree = sample_tree();
        let order: Vec<(usize, String)> = tree
            .walk()
            .map(|(depth, node)| (depth, node.frame_label()))
            .collect();
        assert_eq!(
            order,
            vec![
                (0, "root".to_string()),
                (1, "mid@2".to_string()),
                (2, "leaf@4".to_string()),
                (1, "a.c:26".to_string()),
            ]
        );
    }

    #[test]
    fn test_node_count_and_depth() {
        let tree = sample_tree();
        assert_eq!(tree.node_count(), 4);
        assert_eq!(tree.max_depth(), 2);
    }

    #[test]
    fn test_child_lookup() {
        let tree = sample_tree();
        assert_eq!(tree.child(&identity("mid", "2")).map(|n| n.count()), Some(5));
        assert!(tree.child(&identity("mid", "3")).is_none());
        assert_eq!(tree.child_named("other").map(|n| n.count()), Some(1));
    }

    /// Chain of `depth` frames below the root, built bottom-up
    fn chain(depth: u64) -> CallTreeNode {
        let mut node = CallTreeNode::new_call(identity("f", "0"), EngineTag::Native, 1, 1);
        for level in 1..depth {
            node = CallTreeNode::new_call(identity("f", "0"), EngineTag::Native, level + 1, 1)
                .with_children(vec![node]);
        }
        CallTreeNode::new_root(None, depth, 0).with_children(vec![node])
    }

    #[test]
    fn test_clone_and_eq() {
        let tree = sample_tree();
        let copy = tree.clone();
        assert_eq!(copy, tree);
        assert_eq!(copy.node_count(), 4);
        assert_ne!(copy, tree.children()[0].clone());
        assert_ne!(sample_tree(), chain(3));
    }

    #[test]
    fn test_serializes_flat() {
        let json = serde_json::to_value(sample_tree()).unwrap();
        assert_eq!(json["nodes"].as_array().map(Vec::len), Some(4));
        assert_eq!(json["nodes"][0]["children"], serde_json::json!([1, 3]));
        assert_eq!(json["nodes"][2]["parent"], 1);

        let back: CallTreeNode = serde_json::from_value(json).unwrap();
        assert_eq!(back, sample_tree());
        assert!(format!("{:?}", back).starts_with("FlatTree"));
    }

    #[test]
    fn test_inconsistent_flat_tree_rejected_by_serde() {
        let mut json = serde_json::to_value(sample_tree()).unwrap();
        json["nodes"][0]["children"] = serde_json::json!([1]);
        assert!(serde_json::from_value::<CallTreeNode>(json).is_err());
    }

    #[test]
    fn test_deep_tree_does_not_recurse() {
        let depth = 200_000;
        let tree = chain(depth);
        assert_eq!(tree.max_depth(), depth as usize);

        let copy = tree.clone();
        assert!(copy == tree);

        let json = serde_json::to_string(&tree).unwrap();
        let back: CallTreeNode = serde_json::from_str(&json).unwrap();
        assert_eq!(back.node_count(), tree.node_count());

        drop(copy);
        drop(back);
        drop(tree);
    }

    #[test]
    fn test_engine_tag_serialization() {
        let json = serde_json::to_string(&EngineTag::NamedEngine("python".to_string())).unwrap();
        assert_eq!(json, r#"{"kind":"named_engine","name":"python"}"#);
        let json = serde_json::to_string(&EngineTag::Native).unwrap();
        assert_eq!(json, r#"{"kind":"native"}"#);
    }
}
