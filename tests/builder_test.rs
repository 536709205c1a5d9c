//! Tests for TreeBuilder

use std::path::PathBuf;

use tempfile::TempDir;

use repostress::domain::{DomainError, NodeKind, TreeBuilder};

fn create_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    std::fs::write(&path, content).expect("write fixture file");
    path
}

#[test]
fn given_listing_when_building_then_classifies_documents_and_resources() {
    // Arrange
    let listing = "\
# news documents
content/news/asset/asset

content/news/loose
";

    // Act
    let tree = TreeBuilder::new().build_from_listing(listing).unwrap();

    // Assert
    let kind = |path: &str| tree.get_node(tree.find_by_path(path).unwrap()).unwrap().data.kind;
    assert_eq!(kind("content"), NodeKind::Folder);
    assert_eq!(kind("content/news"), NodeKind::Folder);
    assert_eq!(kind("content/news/asset"), NodeKind::Document);
    assert_eq!(kind("content/news/asset/asset"), NodeKind::Resource);
    assert_eq!(kind("content/news/loose"), NodeKind::Document);
    assert_eq!(tree.len(), 5);
}

#[test]
fn given_duplicate_lines_when_building_then_nodes_created_once() {
    let listing = "content/a/a\ncontent/a/a\n/content/a/a/\n";

    let tree = TreeBuilder::new().build_from_listing(listing).unwrap();

    assert_eq!(tree.len(), 3);
}

#[test]
fn given_two_roots_when_building_then_invalid_fixture() {
    let result = TreeBuilder::new().build_from_listing("content/a\nother/b\n");

    assert!(matches!(result, Err(DomainError::InvalidFixture { .. })));
}

#[test]
fn given_empty_listing_when_building_then_invalid_fixture() {
    let result = TreeBuilder::new().build_from_listing("# nothing here\n\n");

    assert!(matches!(result, Err(DomainError::InvalidFixture { .. })));
}

#[test]
fn given_listing_file_when_building_from_path_then_reads_it() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let fixture = create_file(&temp, "fixture.txt", "content/news/asset/asset\n");

    // Act
    let tree = TreeBuilder::new().build_from_path(&fixture).unwrap();

    // Assert
    assert!(tree.find_by_path("content/news/asset/asset").is_some());
}

#[test]
fn given_directory_when_building_then_mirrors_layout() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("content");
    std::fs::create_dir_all(root.join("news/asset")).unwrap();
    std::fs::write(root.join("news/asset/asset"), "").unwrap();
    std::fs::write(root.join("news/readme"), "").unwrap();

    // Act
    let tree = TreeBuilder::new().build_from_path(&root).unwrap();

    // Assert
    let asset = tree.find_by_path("content/news/asset/asset").unwrap();
    assert_eq!(tree.get_node(asset).unwrap().data.kind, NodeKind::Resource);
    let readme = tree.find_by_path("content/news/readme").unwrap();
    assert_eq!(tree.get_node(readme).unwrap().data.kind, NodeKind::Document);
    assert_eq!(tree.depth(), 4);
}

#[test]
fn given_missing_path_when_building_then_fixture_not_found() {
    let temp = TempDir::new().unwrap();

    let result = TreeBuilder::new().build_from_path(&temp.path().join("missing"));

    assert!(matches!(result, Err(DomainError::FixtureNotFound(_))));
}
