//! Tree builder for loading content fixtures into a `ContentTree`.

use std::collections::HashMap;
use std::path::Path;

use generational_arena::Index;
use tracing::{debug, instrument};
use walkdir::WalkDir;

use crate::domain::arena::{ContentTree, NodeData};
use crate::domain::entities::NodeKind;
use crate::domain::error::DomainError;

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, DomainError>;

/// Constructs content trees from listings or directories.
///
/// Listing format: one slash-separated path per line, starting at the root.
/// Blank lines and `#` comments are ignored. A leaf named like its parent
/// becomes a resource and its parent a document; other leaves are documents.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    path_cache: HashMap<String, Index>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a listing file or a directory, depending on what `path` is.
    pub fn build_from_path(&mut self, path: &Path) -> TreeResult<ContentTree> {
        if !path.exists() {
            return Err(DomainError::FixtureNotFound(path.to_path_buf()));
        }
        if path.is_dir() {
            self.build_from_directory(path)
        } else {
            let content =
                std::fs::read_to_string(path).map_err(|e| DomainError::InvalidFixture {
                    message: format!("read {}: {}", path.display(), e),
                })?;
            self.build_from_listing(&content)
        }
    }

    #[instrument(level = "debug", skip(self, listing))]
    pub fn build_from_listing(&mut self, listing: &str) -> TreeResult<ContentTree> {
        self.path_cache.clear();
        let mut tree = ContentTree::new();

        for line in listing.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let segments: Vec<&str> = line.split('/').filter(|s| !s.is_empty()).collect();
            self.insert_segments(&mut tree, &segments)?;
        }

        if tree.is_empty() {
            return Err(DomainError::InvalidFixture {
                message: "listing contains no paths".to_string(),
            });
        }
        classify(&mut tree);
        debug!("built tree with {} nodes", tree.len());
        Ok(tree)
    }

    /// Maps every directory and file below `directory_path` to a node.
    /// The directory itself becomes the root.
    #[instrument(level = "debug", skip(self))]
    pub fn build_from_directory(&mut self, directory_path: &Path) -> TreeResult<ContentTree> {
        if !directory_path.is_dir() {
            return Err(DomainError::FixtureNotFound(directory_path.to_path_buf()));
        }
        self.path_cache.clear();
        let mut tree = ContentTree::new();

        let root_name = directory_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| String::from("root"));

        for entry in WalkDir::new(directory_path).sort_by_file_name() {
            let entry = entry.map_err(|e| DomainError::InvalidFixture {
                message: e.to_string(),
            })?;
            let rel = entry
                .path()
                .strip_prefix(directory_path)
                .map_err(|e| DomainError::InvalidFixture {
                    message: e.to_string(),
                })?;
            let mut segments = vec![root_name.clone()];
            segments.extend(rel.iter().map(|s| s.to_string_lossy().into_owned()));
            let segments: Vec<&str> = segments.iter().map(String::as_str).collect();
            self.insert_segments(&mut tree, &segments)?;
        }

        classify(&mut tree);
        debug!("built tree with {} nodes", tree.len());
        Ok(tree)
    }

    fn insert_segments(&mut self, tree: &mut ContentTree, segments: &[&str]) -> TreeResult<()> {
        let mut parent: Option<Index> = None;
        for depth in 0..segments.len() {
            let key = segments[..=depth].join("/");
            if let Some(&idx) = self.path_cache.get(&key) {
                parent = Some(idx);
                continue;
            }
            if depth == 0 {
                if let Some(root) = tree.root() {
                    return Err(DomainError::InvalidFixture {
                        message: format!(
                            "multiple roots: {} and {}",
                            tree.path(root),
                            segments[0]
                        ),
                    });
                }
            }
            let idx = tree.insert_node(NodeData::new(segments[depth], NodeKind::Folder), parent)?;
            self.path_cache.insert(key, idx);
            parent = Some(idx);
        }
        Ok(())
    }
}

fn classify(tree: &mut ContentTree) {
    let leaves: Vec<(Index, Option<Index>, bool)> = tree
        .iter()
        .filter(|(_, node)| node.children.is_empty())
        .map(|(idx, node)| {
            let like_named = node
                .parent
                .and_then(|p| tree.get_node(p))
                .is_some_and(|p| p.data.name == node.data.name);
            (idx, node.parent, like_named)
        })
        .collect();

    for (idx, parent, like_named) in leaves {
        if like_named {
            if let Some(node) = tree.get_node_mut(idx) {
                node.data.kind = NodeKind::Resource;
            }
            if let Some(parent) = parent.and_then(|p| tree.get_node_mut(p)) {
                parent.data.kind = NodeKind::Document;
            }
        } else if let Some(node) = tree.get_node_mut(idx) {
            node.data.kind = NodeKind::Document;
        }
    }
}
