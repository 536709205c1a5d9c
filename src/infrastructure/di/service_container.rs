//! Service container for dependency injection
//!
//! Wires the in-memory store and its workflow into the rename services.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::application::services::{CollisionAvoidingRenamer, StressRunner};
use crate::application::ApplicationResult;
use crate::config::Settings;
use crate::domain::{ContentTree, TreeBuilder};
use crate::infrastructure::traits::{DocumentWorkflow, MemoryStore};

/// Container holding settings, the store and the workflow over it.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Shared content store
    pub store: MemoryStore,

    /// Rename workflow bound to `store`
    pub workflows: DocumentWorkflow,
}

impl ServiceContainer {
    /// Create a container over an already built tree.
    pub fn new(settings: Settings, tree: ContentTree) -> Self {
        let store = MemoryStore::new(tree);
        let workflows = DocumentWorkflow::new(store.clone(), settings.convention);
        Self {
            settings: Arc::new(settings),
            store,
            workflows,
        }
    }

    /// Create a container from a fixture listing file or directory.
    pub fn from_fixture(settings: Settings, fixture: &Path) -> ApplicationResult<Self> {
        let tree = TreeBuilder::new().build_from_path(fixture)?;
        debug!("loaded fixture {} ({} nodes)", fixture.display(), tree.len());
        Ok(Self::new(settings, tree))
    }

    pub fn renamer(&self, seed: u64) -> CollisionAvoidingRenamer {
        CollisionAvoidingRenamer::from_settings(&self.settings, seed)
    }

    pub fn stress_runner(&self, seed: u64) -> StressRunner {
        StressRunner::new(self.workflows.clone(), seed)
            .with_policy(self.settings.rename)
    }
}
