//! Store boundary traits and the in-memory reference store
//!
//! Rename actions only see these traits, so they run unchanged against
//! any hierarchical store that can provide node handles and a workflow.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use generational_arena::Index;
use parking_lot::RwLock;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::domain::{ContainerConvention, ContentTree, DomainError, NodeKind};

/// Errors reported by store capabilities.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("node not found: {0}")]
    NotFound(String),

    #[error("name already taken under {scope}: {name}")]
    NameTaken { scope: String, name: String },

    #[error("invalid name: {0:?}")]
    InvalidName(String),

    #[error("access denied: {0}")]
    AccessDenied(String),

    #[error("concurrent modification: {0}")]
    Conflict(String),

    #[error("not a document container: {0}")]
    NotADocument(String),
}

impl StoreError {
    /// Short, stable label for reporting.
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::NotFound(_) => "not-found",
            StoreError::NameTaken { .. } => "name-taken",
            StoreError::InvalidName(_) => "invalid-name",
            StoreError::AccessDenied(_) => "access-denied",
            StoreError::Conflict(_) => "conflict",
            StoreError::NotADocument(_) => "not-a-document",
        }
    }
}

impl From<DomainError> for StoreError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NameTaken { scope, name } => StoreError::NameTaken { scope, name },
            DomainError::InvalidName(name) => StoreError::InvalidName(name),
            DomainError::NodeNotFound(node) => StoreError::NotFound(node),
            other => StoreError::Conflict(other.to_string()),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Handle to a node in a hierarchical store.
///
/// Every accessor is a round-trip to the store and may fail.
pub trait ContentNode: Clone + Send + Sync + fmt::Debug {
    fn name(&self) -> StoreResult<String>;

    /// Parent handle, None for the root.
    fn parent(&self) -> StoreResult<Option<Self>>;

    fn has_child(&self, name: &str) -> StoreResult<bool>;

    fn child(&self, name: &str) -> StoreResult<Option<Self>>;

    /// Display path, used for diagnostics only.
    fn path(&self) -> StoreResult<String>;
}

/// Mutating operations available on a node.
pub trait Workflow<N>: Send + Sync {
    /// Renames the document the node belongs to.
    ///
    /// Implementations should reject a name that is already taken with
    /// `StoreError::NameTaken` rather than overwrite.
    fn rename(&self, node: &N, new_name: &str) -> StoreResult<()>;
}

/// Hands out the workflow responsible for a node.
pub trait WorkflowProvider<N>: Send + Sync {
    fn workflow(&self, node: &N) -> StoreResult<Box<dyn Workflow<N> + '_>>;
}

// ============================================================
// IN-MEMORY IMPLEMENTATION
// ============================================================

/// Thread-safe shared content store backed by a `ContentTree`.
///
/// Clones share the same tree.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tree: Arc<RwLock<ContentTree>>,
    locked: Arc<RwLock<HashSet<Index>>>,
}

impl MemoryStore {
    pub fn new(tree: ContentTree) -> Self {
        Self {
            tree: Arc::new(RwLock::new(tree)),
            locked: Arc::default(),
        }
    }

    pub fn root(&self) -> StoreResult<StoreNode> {
        let idx = self
            .tree
            .read()
            .root()
            .ok_or_else(|| StoreError::NotFound("root".to_string()))?;
        Ok(self.handle(idx))
    }

    pub fn node(&self, path: &str) -> StoreResult<StoreNode> {
        let idx = self
            .tree
            .read()
            .find_by_path(path)
            .ok_or_else(|| StoreError::NotFound(path.to_string()))?;
        Ok(self.handle(idx))
    }

    /// Handles to all resource nodes, in tree order.
    pub fn resources(&self) -> Vec<StoreNode> {
        self.tree
            .read()
            .nodes_of_kind(NodeKind::Resource)
            .into_iter()
            .map(|idx| self.handle(idx))
            .collect()
    }

    /// Copy of the current tree.
    pub fn snapshot(&self) -> ContentTree {
        self.tree.read().clone()
    }

    /// Makes renames of the node at `path` fail with `AccessDenied`.
    pub fn lock_node(&self, path: &str) -> StoreResult<()> {
        let node = self.node(path)?;
        self.locked.write().insert(node.idx);
        Ok(())
    }

    /// Renames the single node at `path`, leaving its children untouched.
    pub fn rename_node(&self, path: &str, new_name: &str) -> StoreResult<()> {
        let mut tree = self.tree.write();
        let idx = tree
            .find_by_path(path)
            .ok_or_else(|| StoreError::NotFound(path.to_string()))?;
        tree.rename(idx, new_name)?;
        Ok(())
    }

    fn handle(&self, idx: Index) -> StoreNode {
        StoreNode {
            store: self.clone(),
            idx,
        }
    }

    fn same_store(&self, other: &MemoryStore) -> bool {
        Arc::ptr_eq(&self.tree, &other.tree)
    }
}

/// Node handle into a `MemoryStore`. Stays valid across renames.
#[derive(Clone)]
pub struct StoreNode {
    store: MemoryStore,
    idx: Index,
}

impl StoreNode {
    fn read<T>(&self, f: impl FnOnce(&ContentTree) -> T) -> T {
        f(&self.store.tree.read())
    }

    fn missing(&self) -> StoreError {
        StoreError::NotFound(format!("{:?}", self.idx))
    }
}

impl PartialEq for StoreNode {
    fn eq(&self, other: &Self) -> bool {
        self.idx == other.idx && self.store.same_store(&other.store)
    }
}

impl Eq for StoreNode {}

impl fmt::Debug for StoreNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self.read(|t| t.path(self.idx));
        f.debug_struct("StoreNode")
            .field("idx", &self.idx)
            .field("path", &path)
            .finish()
    }
}

impl ContentNode for StoreNode {
    fn name(&self) -> StoreResult<String> {
        self.read(|t| t.get_node(self.idx).map(|n| n.data.name.clone()))
            .ok_or_else(|| self.missing())
    }

    fn parent(&self) -> StoreResult<Option<Self>> {
        let node_parent = self.read(|t| t.get_node(self.idx).map(|n| n.parent));
        let parent = node_parent.ok_or_else(|| self.missing())?;
        Ok(parent.map(|idx| self.store.handle(idx)))
    }

    fn has_child(&self, name: &str) -> StoreResult<bool> {
        self.child(name).map(|c| c.is_some())
    }

    fn child(&self, name: &str) -> StoreResult<Option<Self>> {
        let (exists, child) = self.read(|t| {
            (
                t.get_node(self.idx).is_some(),
                t.child_by_name(self.idx, name),
            )
        });
        if !exists {
            return Err(self.missing());
        }
        Ok(child.map(|idx| self.store.handle(idx)))
    }

    fn path(&self) -> StoreResult<String> {
        let (exists, path) = self.read(|t| (t.get_node(self.idx).is_some(), t.path(self.idx)));
        if exists {
            Ok(path)
        } else {
            Err(self.missing())
        }
    }
}

/// Document rename workflow over a `MemoryStore`.
///
/// Renaming a node renames its document container (the ancestor one level
/// below the naming scope) together with every direct child that carried
/// the container's old name. The free-name check and all renames run under
/// one write lock.
///
/// The container must be a `NodeKind::Document` carrying the acted-on
/// node's name; anything else fails with `NotADocument` before the tree is
/// touched.
#[derive(Debug, Clone)]
pub struct DocumentWorkflow {
    store: MemoryStore,
    convention: ContainerConvention,
}

impl DocumentWorkflow {
    pub fn new(store: MemoryStore, convention: ContainerConvention) -> Self {
        Self { store, convention }
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    pub fn convention(&self) -> ContainerConvention {
        self.convention
    }
}

impl Workflow<StoreNode> for DocumentWorkflow {
    #[instrument(level = "debug", skip(self, node))]
    fn rename(&self, node: &StoreNode, new_name: &str) -> StoreResult<()> {
        if !self.store.same_store(&node.store) {
            return Err(StoreError::NotFound(format!(
                "{:?} belongs to another store",
                node.idx
            )));
        }
        if self.convention.scope_depth == 0 {
            return Err(StoreError::Conflict(
                "scope depth 0 leaves no container to rename".to_string(),
            ));
        }

        let mut tree = self.store.tree.write();
        let container = tree
            .ancestor(node.idx, self.convention.container_hops())
            .ok_or_else(|| StoreError::NotFound(format!("container of {}", tree.path(node.idx))))?;

        if self.store.locked.read().contains(&container) {
            return Err(StoreError::AccessDenied(tree.path(container)));
        }

        let (old_name, kind) = tree
            .get_node(container)
            .map(|n| (n.data.name.clone(), n.data.kind))
            .ok_or_else(|| StoreError::NotFound(format!("{container:?}")))?;
        let node_name = tree
            .get_node(node.idx)
            .map(|n| n.data.name.clone())
            .ok_or_else(|| StoreError::NotFound(format!("{:?}", node.idx)))?;
        if kind != NodeKind::Document || old_name != node_name {
            return Err(StoreError::NotADocument(format!(
                "{} ({}) does not hold {}",
                tree.path(container),
                kind,
                tree.path(node.idx)
            )));
        }
        let like_named: Vec<Index> = tree
            .get_node(container)
            .map(|n| n.children.clone())
            .unwrap_or_default()
            .into_iter()
            .filter(|&c| tree.get_node(c).is_some_and(|n| n.data.name == old_name))
            .collect();

        if !like_named.is_empty() && old_name != new_name && tree.has_child(container, new_name) {
            return Err(StoreError::NameTaken {
                scope: tree.path(container),
                name: new_name.to_string(),
            });
        }

        tree.rename(container, new_name)?;
        for child in like_named {
            tree.rename(child, new_name)?;
        }
        debug!("renamed {} -> {}", old_name, tree.path(container));
        Ok(())
    }
}

impl WorkflowProvider<StoreNode> for DocumentWorkflow {
    fn workflow(&self, _node: &StoreNode) -> StoreResult<Box<dyn Workflow<StoreNode> + '_>> {
        Ok(Box::new(self.clone()))
    }
}
