//! Domain-level errors (no external dependencies)

use std::path::PathBuf;
use thiserror::Error;

/// Domain errors represent violated preconditions and postconditions of
/// tree and rename operations. They are independent of any store backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("node {node} has no ancestor {required} level(s) up to use as naming scope")]
    ShallowHierarchy { node: String, required: usize },

    #[error("no free name for {base} after {attempts} attempts")]
    NameSpaceExhausted { base: String, attempts: u32 },

    #[error("renamed node {name} not found under {scope}")]
    RenamedNodeMissing { scope: String, name: String },

    #[error("postcondition violated: {container} has no content child named {name}")]
    MissingContent { container: String, name: String },

    #[error("name already taken under {scope}: {name}")]
    NameTaken { scope: String, name: String },

    #[error("invalid node name: {0:?}")]
    InvalidName(String),

    #[error("node not found: {0}")]
    NodeNotFound(String),

    #[error("fixture not found: {0}")]
    FixtureNotFound(PathBuf),

    #[error("invalid fixture: {message}")]
    InvalidFixture { message: String },

    #[error("store contains no content nodes to rename")]
    NothingToRename,
}
