//! Unit tests for workspace discovery.

use std::fs;

use rstest::{fixture, rstest};
use tempfile::TempDir;

use super::*;

#[fixture]
fn tree() -> TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::create_dir_all(dir.path().join("project/src/nested")).expect("create tree");
    dir
}

#[rstest]
#[case::yaml(".sky.yaml")]
#[case::yml(".sky.yml")]
#[case::git(".git")]
fn finds_nearest_marker(tree: TempDir, #[case] marker: &str) {
    let project = tree.path().join("project");
    fs::create_dir_all(project.join(marker)).expect("create marker");
    let start = project.join("src/nested");
    assert_eq!(find_workspace_root_from(&start), project);
}

#[rstest]
fn nearest_ancestor_wins(tree: TempDir) {
    fs::create_dir(tree.path().join(".git")).expect("outer marker");
    let inner = tree.path().join("project/src");
    fs::write(inner.join(".sky.yaml"), "").expect("inner marker");
    let start = inner.join("nested");
    assert_eq!(find_workspace_root_from(&start), inner);
}

#[rstest]
fn start_itself_can_be_the_root(tree: TempDir) {
    let start = tree.path().join("project");
    fs::write(start.join(".sky.yml"), "").expect("marker");
    assert_eq!(find_workspace_root_from(&start), start);
}

#[rstest]
fn falls_back_to_start_without_markers(tree: TempDir) {
    let start = tree.path().join("project/src/nested");
    let root = find_workspace_root_from(&start);
    // The temp directory may live under a checkout with its own markers, so
    // only an unmarked ancestry is guaranteed to resolve to `start`.
    let marked_ancestor = start.ancestors().any(has_marker);
    if !marked_ancestor {
        assert_eq!(root, start);
    } else {
        assert!(start.starts_with(&root));
    }
}

#[rstest]
#[case::nested("src/nested")]
#[case::bare("src")]
#[case::current_dir("")]
fn relative_start_marked_in_current_dir_is_dot(#[case] start: &str) {
    let root = nearest_marked(Path::new(start), |dir| dir.as_os_str().is_empty());
    assert_eq!(root, Path::new("."));
}

#[test]
fn relative_start_keeps_marked_relative_ancestor() {
    let root = nearest_marked(Path::new("project/src/nested"), |dir| dir == Path::new("project"));
    assert_eq!(root, Path::new("project"));
}

#[test]
fn unmarked_relative_start_is_returned_verbatim() {
    let root = nearest_marked(Path::new("project/src"), |_| false);
    assert_eq!(root, Path::new("project/src"));
}
