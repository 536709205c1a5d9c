//! Domain entities: core data structures

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Role of a node in the document/resource container convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    /// Plain structural node
    Folder,
    /// Container holding one or more like-named resources
    Document,
    /// Content node named after its document container
    Resource,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeKind::Folder => "folder",
            NodeKind::Document => "document",
            NodeKind::Resource => "resource",
        };
        f.write_str(s)
    }
}

/// Which node a completed rename resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentLookup {
    /// The renamed container's child carrying the same new name
    LikeNamedChild,
    /// The renamed container itself
    Container,
}

/// Shape of the hierarchy a rename action operates on.
///
/// `scope_depth` is the number of parent hops from the acted-on node to the
/// node whose children must not already carry the candidate name. The
/// renamed container sits one level below the scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConvention {
    pub scope_depth: usize,
    pub content: ContentLookup,
}

impl Default for ContainerConvention {
    fn default() -> Self {
        Self {
            scope_depth: 2,
            content: ContentLookup::LikeNamedChild,
        }
    }
}

impl ContainerConvention {
    /// Hops from the acted-on node to the container that gets renamed.
    /// A scope depth of zero has no container and is rejected at rename time.
    pub fn container_hops(&self) -> usize {
        self.scope_depth.saturating_sub(1)
    }
}

/// Bounds on the candidate search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenamePolicy {
    /// Maximum number of candidates drawn; 0 never gives up
    pub max_attempts: u32,
    /// Grow the suffix by one digit after this many consecutive collisions
    pub widen_after: Option<u32>,
    /// Upper bound on suffix digits when widening
    pub max_width: u32,
}

impl Default for RenamePolicy {
    fn default() -> Self {
        Self {
            max_attempts: 100,
            widen_after: Some(20),
            max_width: 4,
        }
    }
}

impl RenamePolicy {
    /// Single-digit suffixes retried forever.
    ///
    /// Never terminates once all ten `name.N` siblings exist.
    pub fn unbounded() -> Self {
        Self {
            max_attempts: 0,
            widen_after: None,
            max_width: 1,
        }
    }

    /// Single-digit suffixes, giving up after `max_attempts`.
    pub fn single_digit(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            widen_after: None,
            max_width: 1,
        }
    }

    pub fn is_exhausted(&self, attempts: u32) -> bool {
        self.max_attempts != 0 && attempts >= self.max_attempts
    }

    /// Suffix digits to use after `collisions` failed candidates.
    pub fn suffix_width(&self, collisions: u32) -> u32 {
        let max_width = self.max_width.max(1);
        match self.widen_after {
            Some(step) if step > 0 => (collisions / step).saturating_add(1).min(max_width),
            _ => 1,
        }
    }
}

/// Result of a completed rename action.
#[derive(Debug, Clone)]
pub struct RenameOutcome<N> {
    pub original_name: String,
    pub new_name: String,
    /// Candidates drawn, including the successful one
    pub attempts: u32,
    /// Candidates rejected because the name was taken
    pub collisions: u32,
    /// Node the rename resolved to under the container convention
    pub content: N,
}

/// Rejects names that cannot appear as a single path segment.
pub fn validate_name(name: &str) -> Result<(), DomainError> {
    if name.is_empty() || name.contains('/') || name.trim() != name {
        return Err(DomainError::InvalidName(name.to_string()));
    }
    Ok(())
}
