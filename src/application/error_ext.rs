//! Error conversion helpers for store round-trips
//!
//! Provides an extension trait for attaching node context to store errors.

use crate::application::{ApplicationError, ApplicationResult};
use crate::infrastructure::traits::{ContentNode, StoreResult};

/// Extension trait for converting `StoreResult` to `ApplicationResult` with context.
pub trait StoreResultExt<T> {
    /// Add node context to a store error.
    ///
    /// # Example
    /// ```ignore
    /// scope.has_child(&candidate)
    ///     .with_node_context("check candidate", &scope)?;
    /// ```
    fn with_node_context<N: ContentNode>(self, action: &str, node: &N) -> ApplicationResult<T>;
}

impl<T> StoreResultExt<T> for StoreResult<T> {
    fn with_node_context<N: ContentNode>(self, action: &str, node: &N) -> ApplicationResult<T> {
        self.map_err(|source| ApplicationError::Store {
            context: format!("{}: {}", action, describe(node)),
            source,
        })
    }
}

/// Path of the node, or its debug form when the store cannot resolve it.
pub fn describe<N: ContentNode>(node: &N) -> String {
    node.path().unwrap_or_else(|_| format!("{node:?}"))
}
