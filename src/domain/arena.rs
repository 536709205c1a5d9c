use generational_arena::{Arena, Index};
use std::fmt;
use tracing::instrument;

use crate::domain::entities::{validate_name, NodeKind};
use crate::domain::error::DomainError;

/// Data payload for content tree nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeData {
    /// Name of the node, unique among its siblings
    pub name: String,
    /// Role of the node in the container convention
    pub kind: NodeKind,
}

impl NodeData {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

impl fmt::Display for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Tree node in the arena-based content hierarchy.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub data: NodeData,
    /// Index of parent node in the arena, None for the root
    pub parent: Option<Index>,
    /// Indices of child nodes in insertion order
    pub children: Vec<Index>,
}

/// Arena-based hierarchical content store.
///
/// Indices stay valid across renames, so handles into the tree keep pointing
/// at the same node after its name changes. Sibling names are unique.
#[derive(Debug, Clone)]
pub struct ContentTree {
    arena: Arena<TreeNode>,
    root: Option<Index>,
}

impl Default for ContentTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentTree {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    /// Inserts a node below `parent`, or as root when `parent` is None.
    ///
    /// Fails if the name is invalid, a sibling already uses it, the parent
    /// index is stale, or a second root is requested.
    #[instrument(level = "trace", skip(self))]
    pub fn insert_node(
        &mut self,
        data: NodeData,
        parent: Option<Index>,
    ) -> Result<Index, DomainError> {
        validate_name(&data.name)?;
        match parent {
            Some(parent_idx) => {
                if self.arena.get(parent_idx).is_none() {
                    return Err(DomainError::NodeNotFound(format!("{parent_idx:?}")));
                }
                if self.child_by_name(parent_idx, &data.name).is_some() {
                    return Err(DomainError::NameTaken {
                        scope: self.path(parent_idx),
                        name: data.name,
                    });
                }
            }
            None => {
                if let Some(root) = self.root {
                    return Err(DomainError::InvalidFixture {
                        message: format!(
                            "tree already has root {}, cannot add {}",
                            self.path(root),
                            data.name
                        ),
                    });
                }
            }
        }

        let node_idx = self.arena.insert(TreeNode {
            data,
            parent,
            children: Vec::new(),
        });

        match parent.and_then(|p| self.arena.get_mut(p)) {
            Some(parent) => parent.children.push(node_idx),
            None => self.root = Some(node_idx),
        }

        Ok(node_idx)
    }

    pub fn get_node(&self, idx: Index) -> Option<&TreeNode> {
        self.arena.get(idx)
    }

    pub fn get_node_mut(&mut self, idx: Index) -> Option<&mut TreeNode> {
        self.arena.get_mut(idx)
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn parent(&self, idx: Index) -> Option<Index> {
        self.get_node(idx).and_then(|n| n.parent)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn child_by_name(&self, parent: Index, name: &str) -> Option<Index> {
        self.get_node(parent)?
            .children
            .iter()
            .copied()
            .find(|&c| self.get_node(c).is_some_and(|n| n.data.name == name))
    }

    pub fn has_child(&self, parent: Index, name: &str) -> bool {
        self.child_by_name(parent, name).is_some()
    }

    /// Walks `hops` parent links up from `idx`. Zero hops returns `idx` itself.
    pub fn ancestor(&self, idx: Index, hops: usize) -> Option<Index> {
        let mut current = idx;
        for _ in 0..hops {
            current = self.parent(current)?;
        }
        self.get_node(current).map(|_| current)
    }

    /// Slash-joined names from the root down to `idx`.
    pub fn path(&self, idx: Index) -> String {
        let mut segments = Vec::new();
        let mut current = Some(idx);
        while let Some(i) = current {
            match self.get_node(i) {
                Some(node) => {
                    segments.push(node.data.name.as_str());
                    current = node.parent;
                }
                None => break,
            }
        }
        segments.reverse();
        segments.join("/")
    }

    /// Resolves a slash path starting at the root name.
    #[instrument(level = "trace", skip(self))]
    pub fn find_by_path(&self, path: &str) -> Option<Index> {
        let mut segments = path.split('/').filter(|s| !s.is_empty());
        let root = self.root?;
        if self.get_node(root)?.data.name != segments.next()? {
            return None;
        }
        segments.try_fold(root, |current, segment| {
            self.child_by_name(current, segment)
        })
    }

    /// Renames a node in place. The new name must be free among its siblings.
    #[instrument(level = "debug", skip(self))]
    pub fn rename(&mut self, idx: Index, new_name: &str) -> Result<(), DomainError> {
        validate_name(new_name)?;
        let node = self
            .get_node(idx)
            .ok_or_else(|| DomainError::NodeNotFound(format!("{idx:?}")))?;
        if node.data.name == new_name {
            return Ok(());
        }
        if let Some(parent) = node.parent {
            if self.has_child(parent, new_name) {
                return Err(DomainError::NameTaken {
                    scope: self.path(parent),
                    name: new_name.to_string(),
                });
            }
        }
        if let Some(node) = self.get_node_mut(idx) {
            node.data.name = new_name.to_string();
        }
        Ok(())
    }

    /// All nodes of the given kind in pre-order.
    pub fn nodes_of_kind(&self, kind: NodeKind) -> Vec<Index> {
        self.iter()
            .filter(|(_, node)| node.data.kind == kind)
            .map(|(idx, _)| idx)
            .collect()
    }

    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        if let Some(root) = self.root {
            self.calculate_depth(root)
        } else {
            0
        }
    }

    fn calculate_depth(&self, node_idx: Index) -> usize {
        if let Some(node) = self.get_node(node_idx) {
            1 + node
                .children
                .iter()
                .map(|&child| self.calculate_depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }

    /// Renders the tree for display, children in insertion order.
    pub fn to_termtree(&self) -> Option<termtree::Tree<String>> {
        self.root.map(|root| self.subtree(root))
    }

    fn subtree(&self, idx: Index) -> termtree::Tree<String> {
        let (label, children) = match self.get_node(idx) {
            Some(node) => (
                format!("{} [{}]", node.data.name, node.data.kind),
                node.children.clone(),
            ),
            None => (String::from("?"), Vec::new()),
        };
        termtree::Tree::new(label).with_leaves(children.into_iter().map(|c| self.subtree(c)))
    }
}

/// Pre-order traversal, children left to right.
pub struct TreeIterator<'a> {
    tree: &'a ContentTree,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(tree: &'a ContentTree) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = tree.root() {
            stack.push(root);
        }
        Self { tree, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}
