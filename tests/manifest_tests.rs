use std::fs;
use std::path::{Path, PathBuf};

use tempfile::tempdir;
use topogen::manifest::{parse_manifest, select_files, Directive, FileList, ManifestError};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn make_tree(root: &Path, files: &[&str]) {
    for file in files {
        let path = root.join(file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "").unwrap();
    }
}

const TREE: [&str; 16] = [
    "README.rst",
    "setup.py",
    "setup.cfg",
    "fnss/__init__.py",
    "fnss/_version.py",
    "fnss/data.txt",
    "fnss/topologies/simplemodels.py",
    "fnss/topologies/simplemodels.pyc",
    "examples/ex1/run.py",
    "examples/ex1/topo.xml",
    "examples/ex1/notes.md",
    "doc/index.rst",
    "doc/conf.py",
    "doc/conf.pyc",
    "doc/build/html/index.html",
    "test/test_models.py",
];

#[test]
fn test_fixture_manifest_selection() {
    let dir = tempdir().unwrap();
    make_tree(dir.path(), &TREE);

    let files = select_files(&fixture("MANIFEST.in"), dir.path()).unwrap();
    assert_eq!(
        files,
        vec![
            "README.rst",
            "doc/conf.py",
            "doc/index.rst",
            "examples/ex1/run.py",
            "examples/ex1/topo.xml",
            "fnss/__init__.py",
            "fnss/topologies/simplemodels.py",
            "setup.py",
        ]
    );
}

#[test]
fn test_directive_order_matters() {
    let dir = tempdir().unwrap();
    make_tree(dir.path(), &TREE);
    let mut list = FileList::from_dir(dir.path()).unwrap();

    // excluding before including has no effect on later includes
    let directives = parse_manifest("global-exclude *.pyc\ngraft doc\n").unwrap();
    list.apply_all(&directives).unwrap();
    assert!(list.files().contains(&"doc/conf.pyc"));

    list.apply(&Directive::GlobalExclude(vec!["*.pyc".to_string()])).unwrap();
    assert!(!list.files().contains(&"doc/conf.pyc"));
}

#[test]
fn test_unmatched_directive_is_not_an_error() {
    let dir = tempdir().unwrap();
    make_tree(dir.path(), &TREE);
    let manifest = dir.path().join("MANIFEST.in");
    fs::write(&manifest, "include CHANGELOG\nprune build\n").unwrap();

    // the manifest itself is part of the tree but was not selected
    assert!(select_files(&manifest, dir.path()).unwrap().is_empty());
}

#[test]
fn test_syntax_error_reports_line() {
    match parse_manifest("include README.rst\n\n# comment\nrecursive-include fnss\n") {
        Err(ManifestError::Syntax { line, .. }) => assert_eq!(line, 4),
        other => panic!("expected a syntax error, got {:?}", other),
    }
    assert!(matches!(
        parse_manifest("graft"),
        Err(ManifestError::Syntax { line: 1, .. })
    ));
    assert!(matches!(
        parse_manifest("copy a b"),
        Err(ManifestError::Syntax { .. })
    ));
}

#[test]
fn test_missing_root_directory() {
    assert!(matches!(
        select_files(&fixture("MANIFEST.in"), Path::new("/nonexistent/tree")),
        Err(ManifestError::Io { .. })
    ));
}
