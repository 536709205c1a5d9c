//! Randomized rename actions against hierarchical content stores.
//!
//! The core piece is [`CollisionAvoidingRenamer`]: it renames a node's
//! document to `name.DIGITS`, retrying random suffixes until one is free
//! among the children of the naming scope. It works against any store that
//! implements [`ContentNode`] and [`WorkflowProvider`]; [`MemoryStore`] is
//! the in-memory reference store used by the CLI and the stress runner.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use application::services::{CollisionAvoidingRenamer, StressReport, StressRunner};
pub use application::{ApplicationError, ApplicationResult};
pub use domain::{ContainerConvention, ContentLookup, DomainError, RenameOutcome, RenamePolicy};
pub use infrastructure::traits::{
    ContentNode, DocumentWorkflow, MemoryStore, StoreError, StoreNode, Workflow, WorkflowProvider,
};
