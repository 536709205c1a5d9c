//! Tests for CollisionAvoidingRenamer

use std::sync::atomic::{AtomicU32, Ordering};

use rstest::rstest;

use repostress::application::services::CollisionAvoidingRenamer;
use repostress::application::ApplicationError;
use repostress::domain::{ContainerConvention, ContentLookup, DomainError, RenamePolicy};
use repostress::infrastructure::traits::{
    ContentNode, DocumentWorkflow, MemoryStore, StoreError, StoreNode, StoreResult, Workflow,
    WorkflowProvider,
};
use repostress::util::testing::{init_test_setup, store_from_listing};

const ALL_TEN_TAKEN: &str = "\
content/news/asset/asset
content/news/asset.0/asset.0
content/news/asset.1/asset.1
content/news/asset.2/asset.2
content/news/asset.3/asset.3
content/news/asset.4/asset.4
content/news/asset.5/asset.5
content/news/asset.6/asset.6
content/news/asset.7/asset.7
content/news/asset.8/asset.8
content/news/asset.9/asset.9
";

fn single_digit_suffix(name: &str, base: &str) -> Option<u32> {
    let suffix = name.strip_prefix(base)?.strip_prefix('.')?;
    if suffix.len() != 1 {
        return None;
    }
    suffix.parse().ok()
}

/// Reports the first `failures` renames as lost races, then delegates.
struct RacingWorkflows {
    inner: DocumentWorkflow,
    failures: AtomicU32,
}

struct RacingWorkflow<'a> {
    owner: &'a RacingWorkflows,
}

impl Workflow<StoreNode> for RacingWorkflow<'_> {
    fn rename(&self, node: &StoreNode, new_name: &str) -> StoreResult<()> {
        let remaining = self.owner.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.owner.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(StoreError::NameTaken {
                scope: "content/news".to_string(),
                name: new_name.to_string(),
            });
        }
        self.owner.inner.rename(node, new_name)
    }
}

impl WorkflowProvider<StoreNode> for RacingWorkflows {
    fn workflow(&self, _node: &StoreNode) -> StoreResult<Box<dyn Workflow<StoreNode> + '_>> {
        Ok(Box::new(RacingWorkflow { owner: self }))
    }
}

/// Accepts every rename without touching the store.
struct NoopWorkflow;

impl Workflow<StoreNode> for NoopWorkflow {
    fn rename(&self, _node: &StoreNode, _new_name: &str) -> StoreResult<()> {
        Ok(())
    }
}

impl WorkflowProvider<StoreNode> for NoopWorkflow {
    fn workflow(&self, _node: &StoreNode) -> StoreResult<Box<dyn Workflow<StoreNode> + '_>> {
        Ok(Box::new(NoopWorkflow))
    }
}

/// Renames only the document container, leaving its resource behind.
struct ContainerOnlyWorkflow {
    store: MemoryStore,
}

impl Workflow<StoreNode> for ContainerOnlyWorkflow {
    fn rename(&self, node: &StoreNode, new_name: &str) -> StoreResult<()> {
        let container = node
            .parent()?
            .ok_or_else(|| StoreError::NotFound("container".to_string()))?;
        self.store.rename_node(&container.path()?, new_name)
    }
}

impl WorkflowProvider<StoreNode> for ContainerOnlyWorkflow {
    fn workflow(&self, _node: &StoreNode) -> StoreResult<Box<dyn Workflow<StoreNode> + '_>> {
        Ok(Box::new(ContainerOnlyWorkflow {
            store: self.store.clone(),
        }))
    }
}

#[test]
fn given_free_scope_when_renaming_then_returns_like_named_content() {
    // Arrange
    init_test_setup();
    let (store, workflow) = store_from_listing("content/news/asset/asset\n");
    let node = store.node("content/news/asset/asset").unwrap();
    let mut renamer = CollisionAvoidingRenamer::new(3);

    // Act
    let outcome = renamer.rename(&node, &workflow).unwrap();

    // Assert
    assert_eq!(outcome.original_name, "asset");
    assert!(single_digit_suffix(&outcome.new_name, "asset").is_some());
    assert_eq!(outcome.attempts, 1);
    assert_eq!(outcome.collisions, 0);
    let expected = format!("content/news/{0}/{0}", outcome.new_name);
    assert_eq!(outcome.content.path().unwrap(), expected);
    assert_eq!(outcome.content, store.node(&expected).unwrap());
    // The acted-on handle follows the rename
    assert_eq!(node, outcome.content);
}

#[rstest]
fn given_one_taken_suffix_when_renaming_then_never_picks_it(
    #[values(0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11)] seed: u64,
) {
    // Arrange
    let (store, workflow) =
        store_from_listing("content/news/asset/asset\ncontent/news/asset.3/asset.3\n");
    let node = store.node("content/news/asset/asset").unwrap();
    let mut renamer =
        CollisionAvoidingRenamer::new(seed).with_policy(RenamePolicy::single_digit(1000));

    // Act
    let outcome = renamer.rename(&node, &workflow).unwrap();

    // Assert
    let digit = single_digit_suffix(&outcome.new_name, "asset").expect("single digit suffix");
    assert_ne!(digit, 3);
    assert!(store.node("content/news/asset.3/asset.3").is_ok());
    assert!(store.node("content/news/asset").is_err());
}

#[test]
fn given_all_suffixes_taken_when_bounded_then_fails_with_exhaustion() {
    // Arrange
    let (store, workflow) = store_from_listing(ALL_TEN_TAKEN);
    let node = store.node("content/news/asset/asset").unwrap();
    let mut renamer =
        CollisionAvoidingRenamer::new(1).with_policy(RenamePolicy::single_digit(50));

    // Act
    let result = renamer.rename(&node, &workflow);

    // Assert
    match result {
        Err(ApplicationError::Domain(DomainError::NameSpaceExhausted { base, attempts })) => {
            assert_eq!(base, "asset");
            assert_eq!(attempts, 50);
        }
        other => panic!("expected exhaustion, got {other:?}"),
    }
    assert_eq!(node.path().unwrap(), "content/news/asset/asset");
}

#[test]
fn given_all_suffixes_taken_when_widening_then_uses_two_digits() {
    // Arrange
    let (store, workflow) = store_from_listing(ALL_TEN_TAKEN);
    let node = store.node("content/news/asset/asset").unwrap();
    let policy = RenamePolicy {
        max_attempts: 100,
        widen_after: Some(20),
        max_width: 4,
    };
    let mut renamer = CollisionAvoidingRenamer::new(1).with_policy(policy);

    // Act
    let outcome = renamer.rename(&node, &workflow).unwrap();

    // Assert
    let suffix = outcome.new_name.strip_prefix("asset.").unwrap();
    assert_eq!(suffix.len(), 2);
    assert!(suffix.chars().all(|c| c.is_ascii_digit()));
    assert_eq!(outcome.collisions, 20);
    assert_eq!(outcome.attempts, 21);
}

#[rstest]
#[case("content/asset")]
#[case("content")]
fn given_node_without_grandparent_when_renaming_then_shallow_hierarchy(#[case] path: &str) {
    // Arrange
    let (store, workflow) = store_from_listing("content/asset\n");
    let node = store.node(path).unwrap();
    let mut renamer = CollisionAvoidingRenamer::new(1);

    // Act
    let result = renamer.rename(&node, &workflow);

    // Assert
    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::ShallowHierarchy { required: 2, .. }))
    ));
}

#[test]
fn given_container_without_like_named_child_when_renaming_then_missing_content() {
    // Arrange: the workflow renames the container but not its resource
    let (store, _) = store_from_listing("content/news/asset/asset\n");
    let node = store.node("content/news/asset/asset").unwrap();
    let workflow = ContainerOnlyWorkflow {
        store: store.clone(),
    };
    let mut renamer = CollisionAvoidingRenamer::new(5);

    // Act
    let result = renamer.rename(&node, &workflow);

    // Assert
    match result {
        Err(ApplicationError::Domain(DomainError::MissingContent { container, name })) => {
            assert!(name.starts_with("asset."));
            assert_eq!(container, format!("content/news/{name}"));
        }
        other => panic!("expected missing content, got {other:?}"),
    }
    // No rollback: the rename itself stays applied
    assert!(store.node("content/news/asset").is_err());
    assert_eq!(node.name().unwrap(), "asset");
}

#[test]
fn given_document_instead_of_resource_when_renaming_then_folder_untouched() {
    // Arrange
    let (store, workflow) = store_from_listing("content/news/asset/asset\n");
    let node = store.node("content/news/asset").unwrap();
    let mut renamer = CollisionAvoidingRenamer::new(8);

    // Act
    let result = renamer.rename(&node, &workflow);

    // Assert
    match result {
        Err(ApplicationError::Store { source, .. }) => {
            assert!(matches!(source, StoreError::NotADocument(_)));
        }
        other => panic!("expected store error, got {other:?}"),
    }
    assert!(store.node("content/news/asset/asset").is_ok());
}

#[test]
fn given_workflow_that_does_not_rename_when_renaming_then_renamed_node_missing() {
    // Arrange
    let (store, _) = store_from_listing("content/news/asset/asset\n");
    let node = store.node("content/news/asset/asset").unwrap();
    let mut renamer = CollisionAvoidingRenamer::new(5);

    // Act
    let result = renamer.rename(&node, &NoopWorkflow);

    // Assert
    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::RenamedNodeMissing { .. }))
    ));
}

#[test]
fn given_lost_race_when_renaming_then_retries_with_new_candidate() {
    // Arrange
    let (store, workflow) = store_from_listing("content/news/asset/asset\n");
    let node = store.node("content/news/asset/asset").unwrap();
    let workflows = RacingWorkflows {
        inner: workflow,
        failures: AtomicU32::new(2),
    };
    let mut renamer = CollisionAvoidingRenamer::new(9);

    // Act
    let outcome = renamer.rename(&node, &workflows).unwrap();

    // Assert
    assert_eq!(outcome.attempts, 3);
    assert_eq!(outcome.collisions, 2);
    assert!(single_digit_suffix(&outcome.new_name, "asset").is_some());
}

#[test]
fn given_locked_document_when_renaming_then_propagates_store_error() {
    // Arrange
    let (store, workflow) = store_from_listing("content/news/asset/asset\n");
    store.lock_node("content/news/asset").unwrap();
    let node = store.node("content/news/asset/asset").unwrap();
    let mut renamer = CollisionAvoidingRenamer::new(1);

    // Act
    let result = renamer.rename(&node, &workflow);

    // Assert
    match result {
        Err(ApplicationError::Store { source, .. }) => {
            assert!(matches!(source, StoreError::AccessDenied(_)));
        }
        other => panic!("expected store error, got {other:?}"),
    }
    assert_eq!(node.path().unwrap(), "content/news/asset/asset");
}

#[test]
fn given_same_seed_when_renaming_equal_stores_then_same_names() {
    let listing = "content/news/asset/asset\ncontent/news/asset.1/asset.1\n";
    let names: Vec<Vec<String>> = (0..2)
        .map(|_| {
            let (store, workflow) = store_from_listing(listing);
            let node = store.node("content/news/asset/asset").unwrap();
            let mut renamer = CollisionAvoidingRenamer::new(1234);
            (0..5)
                .map(|_| renamer.rename(&node, &workflow).unwrap().new_name)
                .collect()
        })
        .collect();

    assert_eq!(names[0], names[1]);
}

#[test]
fn given_repeated_renames_then_names_differ() {
    let (store, workflow) = store_from_listing("content/news/asset/asset\n");
    let node = store.node("content/news/asset/asset").unwrap();
    let mut renamer = CollisionAvoidingRenamer::new(77);

    let first = renamer.rename(&node, &workflow).unwrap();
    let second = renamer.rename(&node, &workflow).unwrap();

    assert_ne!(first.new_name, second.new_name);
    assert!(second.new_name.starts_with(&format!("{}.", first.new_name)));
}

#[test]
fn given_container_lookup_when_renaming_then_returns_container() {
    // Arrange
    let convention = ContainerConvention {
        scope_depth: 2,
        content: ContentLookup::Container,
    };
    let (store, workflow) = store_from_listing("content/news/asset/asset\n");
    let node = store.node("content/news/asset/asset").unwrap();
    let mut renamer = CollisionAvoidingRenamer::new(2).with_convention(convention);

    // Act
    let outcome = renamer.rename(&node, &workflow).unwrap();

    // Assert
    assert_eq!(
        outcome.content.path().unwrap(),
        format!("content/news/{}", outcome.new_name)
    );
}

#[test]
fn given_parent_scope_convention_when_renaming_then_renames_node_itself() {
    // Arrange
    let convention = ContainerConvention {
        scope_depth: 1,
        content: ContentLookup::Container,
    };
    let store = MemoryStore::new(
        repostress::util::testing::tree_from_listing("content/news/report\n"),
    );
    let workflow = DocumentWorkflow::new(store.clone(), convention);
    let node = store.node("content/news/report").unwrap();
    let mut renamer = CollisionAvoidingRenamer::new(2).with_convention(convention);

    // Act
    let outcome = renamer.rename(&node, &workflow).unwrap();

    // Assert
    assert_eq!(outcome.content, node);
    assert_eq!(
        node.path().unwrap(),
        format!("content/news/{}", outcome.new_name)
    );
}

#[test]
fn given_zero_scope_depth_when_renaming_then_config_error() {
    let convention = ContainerConvention {
        scope_depth: 0,
        content: ContentLookup::Container,
    };
    let (store, workflow) = store_from_listing("content/news/asset/asset\n");
    let node = store.node("content/news/asset/asset").unwrap();
    let mut renamer = CollisionAvoidingRenamer::new(2).with_convention(convention);

    let result = renamer.rename(&node, &workflow);

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}
