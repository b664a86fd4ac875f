//! `FileImporter` search order and failures.

use jsonnetc::{FileImporter, ImportCallback};
use pretty_assertions::assert_eq;

use crate::common::{path_arg, source_tree};

#[test]
fn importing_directory_wins_over_library_paths() {
    let tree = source_tree(&[("here/x.libsonnet", "'local'"), ("lib/x.libsonnet", "'library'")]);
    let importer = FileImporter::new(vec![tree.path().join("lib")]);
    let base = format!("{}/", path_arg(&tree.path().join("here")));
    let file = importer.import(&base, "x.libsonnet").unwrap();
    assert_eq!(file.content, "'local'");
    assert_eq!(file.found_here, format!("{base}x.libsonnet"));
}

#[test]
fn library_paths_are_tried_in_order() {
    let tree = source_tree(&[("second/x.libsonnet", "2"), ("third/x.libsonnet", "3")]);
    let importer = FileImporter::new(vec![
        tree.path().join("first"),
        tree.path().join("second"),
        tree.path().join("third"),
    ]);
    let file = importer.import("", "x.libsonnet").unwrap();
    assert_eq!(file.content, "2");
}

#[test]
fn absolute_paths_skip_the_search() {
    let tree = source_tree(&[("abs.jsonnet", "true")]);
    let importer = FileImporter::default();
    let file = importer.import("ignored/", &path_arg(&tree.path().join("abs.jsonnet"))).unwrap();
    assert_eq!(file.content, "true");
}

#[test]
fn missing_everywhere() {
    let tree = source_tree(&[]);
    let importer = FileImporter::new(vec![tree.path().to_owned()]);
    assert_eq!(
        importer.import("", "missing.libsonnet").unwrap_err(),
        "No match locally or in the Jsonnet library paths."
    );
}
