//! Domain layer: content tree, naming and rename rules
//!
//! This layer is independent of external concerns (no locking, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod entities;
pub mod error;
pub mod naming;

pub use arena::{ContentTree, NodeData, TreeNode};
pub use builder::TreeBuilder;
pub use entities::*;
pub use error::DomainError;
pub use naming::SuffixGenerator;
