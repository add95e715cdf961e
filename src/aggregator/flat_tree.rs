//! Flat, index-linked form of a call tree.
//!
//! Nodes are stored in pre-order with the root at index 0; every node names
//! its parent and its children by index. This is the serialized shape of a
//! tree, so a report never nests deeper than one node whatever the depth
//! of the call paths it describes.

use super::call_tree::{CallIdentity, CallTreeNode, EngineTag, ProgramInfo};
use crate::utils::error::FlatTreeError;
use serde::{Deserialize, Serialize};

/// Call tree as a node list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatTree {
    /// Program header values of the root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<ProgramInfo>,

    /// Pre-order nodes, root first
    pub nodes: Vec<FlatNode>,
}

/// One node of a flat tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatNode {
    /// Call identity (absent at the root)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<CallIdentity>,

    pub engine: EngineTag,

    /// Inclusive ticks
    pub count: u64,

    /// Ticks of frames whose path ends here
    pub self_count: u64,

    /// Index of the parent node (absent at the root)
    #[serde(default)]
    pub parent: Option<usize>,

    /// Indices of the child nodes in sibling order
    #[serde(default)]
    pub children: Vec<usize>,
}

impl FlatTree {
    /// Flatten a tree
    ///
    /// **Public** - used for serialization and cloning
    pub fn from_tree(tree: &CallTreeNode) -> Self {
        let mut nodes: Vec<FlatNode> = Vec::new();
        // indices of the nodes on the path to the current one, by depth
        let mut ancestors: Vec<usize> = Vec::new();

        for (depth, node) in tree.walk() {
            ancestors.truncate(depth);
            let index = nodes.len();
            let parent = ancestors.last().copied();
            if let Some(parent) = parent {
                nodes[parent].children.push(index);
            }
            nodes.push(FlatNode {
                identity: node.identity().cloned(),
                engine: node.engine().clone(),
                count: node.count(),
                self_count: node.self_count(),
                parent,
                children: Vec::new(),
            });
            ancestors.push(index);
        }

        FlatTree {
            program: tree.program().cloned(),
            nodes,
        }
    }

    /// Rebuild the nested tree after checking the links
    ///
    /// **Public** - used when reading reports back
    ///
    /// # Errors
    /// * `FlatTreeError` - the list is empty, the root is misplaced, or the
    ///   parent and child links disagree
    pub fn into_tree(self) -> Result<CallTreeNode, FlatTreeError> {
        self.validate()?;
        Ok(self.assemble())
    }

    fn validate(&self) -> Result<(), FlatTreeError> {
        let root = self.nodes.first().ok_or(FlatTreeError::Empty)?;
        if root.parent.is_some() || root.identity.is_some() || root.engine != EngineTag::Root {
            return Err(FlatTreeError::MisplacedRoot(0));
        }

        let mut listed = vec![false; self.nodes.len()];
        for (index, node) in self.nodes.iter().enumerate() {
            if index > 0 {
                if node.identity.is_none() || node.engine == EngineTag::Root {
                    return Err(FlatTreeError::MisplacedRoot(index));
                }
                if !node.parent.is_some_and(|parent| parent < index) {
                    return Err(FlatTreeError::BadParent(index));
                }
            }
            for &child in &node.children {
                let linked = child > index
                    && self
                        .nodes
                        .get(child)
                        .is_some_and(|c| c.parent == Some(index))
                    && !listed[child];
                if !linked {
                    return Err(FlatTreeError::BadChild { node: index, child });
                }
                listed[child] = true;
            }
        }

        match listed.iter().skip(1).position(|seen| !seen) {
            Some(missing) => Err(FlatTreeError::Unlisted(missing + 1)),
            None => Ok(()),
        }
    }

    /// Build nested nodes without recursion
    ///
    /// Children always come after their parent, so walking the list
    /// backwards finishes every child before the parent that adopts it.
    pub(crate) fn assemble(self) -> CallTreeNode {
        let FlatTree { program, nodes } = self;
        let mut program = program;
        let mut finished: Vec<Option<CallTreeNode>> = Vec::new();
        finished.resize_with(nodes.len(), || None);

        for (index, node) in nodes.into_iter().enumerate().rev() {
            let children = node
                .children
                .iter()
                .filter_map(|&child| finished.get_mut(child).and_then(Option::take))
                .collect();
            let program = if index == 0 { program.take() } else { None };
            finished[index] = Some(CallTreeNode::from_parts(
                node.identity,
                node.engine,
                node.count,
                node.self_count,
                program,
                children,
            ));
        }

        finished
            .into_iter()
            .next()
            .flatten()
            .unwrap_or_else(|| CallTreeNode::new_root(None, 0, 0))
    }
}
