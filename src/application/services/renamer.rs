//! Collision-avoiding rename action
//!
//! Renames a node's document to `name.DIGITS`, drawing random suffixes until
//! one is free in the naming scope, then resolves the renamed content node.

use rand::rngs::StdRng;
use rand::Rng;
use tracing::{debug, info, instrument, trace, warn};

use crate::application::{describe, ApplicationError, ApplicationResult, StoreResultExt};
use crate::config::Settings;
use crate::domain::{
    ContainerConvention, ContentLookup, DomainError, RenameOutcome, RenamePolicy, SuffixGenerator,
};
use crate::infrastructure::traits::{ContentNode, StoreError, WorkflowProvider};

/// Performs one randomized rename per call.
///
/// Holds no state between calls besides its pseudo-random source. Each call
/// mutates the store through the workflow and is not idempotent.
///
/// The naming scope is the ancestor `convention.scope_depth` levels above the
/// acted-on node (the grandparent by default). A candidate is rejected if the
/// scope already has a child of that name, or if the workflow reports the name
/// as taken because another actor claimed it in between.
#[derive(Debug)]
pub struct CollisionAvoidingRenamer<R = StdRng> {
    suffixes: SuffixGenerator<R>,
    policy: RenamePolicy,
    convention: ContainerConvention,
}

impl CollisionAvoidingRenamer<StdRng> {
    pub fn new(seed: u64) -> Self {
        Self::with_generator(SuffixGenerator::seeded(seed))
    }

    pub fn from_settings(settings: &Settings, seed: u64) -> Self {
        Self::new(seed)
            .with_policy(settings.rename)
            .with_convention(settings.convention)
    }
}

impl<R: Rng> CollisionAvoidingRenamer<R> {
    pub fn with_generator(suffixes: SuffixGenerator<R>) -> Self {
        Self {
            suffixes,
            policy: RenamePolicy::default(),
            convention: ContainerConvention::default(),
        }
    }

    pub fn with_policy(mut self, policy: RenamePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_convention(mut self, convention: ContainerConvention) -> Self {
        self.convention = convention;
        self
    }

    /// Renames `node` to a free `name.DIGITS` and returns the renamed content.
    ///
    /// # Errors
    /// * `DomainError::ShallowHierarchy` if the naming scope does not exist
    /// * `DomainError::NameSpaceExhausted` if the policy bound is hit
    /// * `DomainError::RenamedNodeMissing` / `MissingContent` if the renamed
    ///   node cannot be resolved afterwards
    /// * `ApplicationError::Store` for any other store or workflow failure.
    ///   A rename the workflow applied before failing is not rolled back.
    #[instrument(level = "debug", skip(self, node, workflows))]
    pub fn rename<N, W>(&mut self, node: &N, workflows: &W) -> ApplicationResult<RenameOutcome<N>>
    where
        N: ContentNode,
        W: WorkflowProvider<N> + ?Sized,
    {
        let base = node.name().with_node_context("read name", node)?;
        let scope = self.naming_scope(node)?;
        debug!("renaming {} within scope {}", describe(node), describe(&scope));

        let mut attempts: u32 = 0;
        let mut collisions: u32 = 0;
        let new_name = loop {
            if self.policy.is_exhausted(attempts) {
                return Err(DomainError::NameSpaceExhausted { base, attempts }.into());
            }
            attempts = attempts.saturating_add(1);

            let width = self.policy.suffix_width(collisions);
            let candidate = self.suffixes.candidate(&base, width);
            if scope
                .has_child(&candidate)
                .with_node_context("check candidate", &scope)?
            {
                trace!("candidate {} taken", candidate);
                collisions = collisions.saturating_add(1);
                continue;
            }

            let workflow = workflows
                .workflow(node)
                .with_node_context("obtain workflow", node)?;
            match workflow.rename(node, &candidate) {
                Ok(()) => break candidate,
                Err(StoreError::NameTaken { .. }) => {
                    warn!("candidate {} claimed concurrently, retrying", candidate);
                    collisions = collisions.saturating_add(1);
                }
                Err(source) => {
                    return Err(ApplicationError::Store {
                        context: format!("rename {} to {}", describe(node), candidate),
                        source,
                    })
                }
            }
        };

        let content = self.resolve_content(&scope, &new_name)?;
        info!(
            "renamed {} -> {} after {} attempt(s)",
            base,
            describe(&content),
            attempts
        );

        Ok(RenameOutcome {
            original_name: base,
            new_name,
            attempts,
            collisions,
            content,
        })
    }

    fn naming_scope<N: ContentNode>(&self, node: &N) -> ApplicationResult<N> {
        let depth = self.convention.scope_depth;
        if depth == 0 {
            return Err(ApplicationError::Config {
                message: "convention.scope_depth must be at least 1".to_string(),
            });
        }

        let mut current = node.clone();
        for _ in 0..depth {
            current = current
                .parent()
                .with_node_context("read parent", &current)?
                .ok_or_else(|| DomainError::ShallowHierarchy {
                    node: describe(node),
                    required: depth,
                })?;
        }
        Ok(current)
    }

    fn resolve_content<N: ContentNode>(&self, scope: &N, name: &str) -> ApplicationResult<N> {
        let renamed = scope
            .child(name)
            .with_node_context("look up renamed node", scope)?
            .ok_or_else(|| DomainError::RenamedNodeMissing {
                scope: describe(scope),
                name: name.to_string(),
            })?;

        match self.convention.content {
            ContentLookup::Container => Ok(renamed),
            ContentLookup::LikeNamedChild => {
                let content = renamed
                    .child(name)
                    .with_node_context("look up content", &renamed)?
                    .ok_or_else(|| DomainError::MissingContent {
                        container: describe(&renamed),
                        name: name.to_string(),
                    })?;
                Ok(content)
            }
        }
    }
}
