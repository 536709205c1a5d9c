//! Application-level errors (wraps domain and store errors)

use thiserror::Error;

use crate::domain::DomainError;
use crate::infrastructure::traits::StoreError;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("{context}: {source}")]
    Store {
        context: String,
        #[source]
        source: StoreError,
    },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ApplicationError {
    /// Short label used to group failures in reports.
    pub fn kind(&self) -> &'static str {
        match self {
            ApplicationError::Domain(e) => match e {
                DomainError::ShallowHierarchy { .. } => "shallow-hierarchy",
                DomainError::NameSpaceExhausted { .. } => "name-space-exhausted",
                DomainError::RenamedNodeMissing { .. } => "renamed-node-missing",
                DomainError::MissingContent { .. } => "missing-content",
                DomainError::NameTaken { .. } => "name-taken",
                DomainError::InvalidName(_) => "invalid-name",
                DomainError::NodeNotFound(_) => "node-not-found",
                DomainError::FixtureNotFound(_) => "fixture-not-found",
                DomainError::InvalidFixture { .. } => "invalid-fixture",
                DomainError::NothingToRename => "nothing-to-rename",
            },
            ApplicationError::Store { source, .. } => source.kind(),
            ApplicationError::Config { .. } => "config",
            ApplicationError::OperationFailed { .. } => "operation-failed",
        }
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
