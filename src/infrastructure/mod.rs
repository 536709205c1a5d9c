//! Infrastructure layer: store implementations and DI container
//!
//! This layer implements the store boundary traits and wires up services.

pub mod di;
pub mod error;
pub mod traits;

pub use error::InfraError;
pub use traits::{
    ContentNode, DocumentWorkflow, MemoryStore, StoreError, StoreNode, StoreResult, Workflow,
    WorkflowProvider,
};
