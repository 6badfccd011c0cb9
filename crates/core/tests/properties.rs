mod common;

use common::{service, write_archive, write_tree};
use std::fs;
use std::path::Path;
use sxres_core::{
    DirectoryWalker, Manifest, ManifestStore, ResourceError, ResourceOrigin, TreeWalker,
};

fn sample_tree(root: &Path) {
    write_tree(
        root,
        &[
            ("res/top.txt", "top"),
            ("res/one/a.txt", "a"),
            ("res/one/two/b.txt", "b"),
            ("res/one/c.txt", "c"),
            ("res/three/d.bin", "d"),
        ],
    );
}

#[test]
fn test_save_then_load_keeps_flattened_listing() {
    let temp = tempfile::tempdir().unwrap();
    sample_tree(temp.path());
    let origin = ResourceOrigin::Directory(temp.path().join("res"));
    let walked = DirectoryWalker::default().walk(&origin, None).unwrap();

    let store = ManifestStore::new();
    let saved_in = temp.path().join("saved");
    store.save_to(&walked, &saved_in).unwrap();
    let loaded = store.load_from_dir(&saved_in).unwrap().unwrap();

    assert_eq!(loaded.flatten(), walked.flatten());
    assert_eq!(
        walked.paths(),
        vec!["top.txt", "one/a.txt", "one/c.txt", "one/two/b.txt", "three/d.bin"]
    );
}

#[test]
fn test_extraction_is_complete_and_byte_identical() {
    let temp = tempfile::tempdir().unwrap();
    let jar = temp.path().join("bundle.jar");
    let names = [
        "sxres_bundle/top.txt",
        "sxres_bundle/one/two/b.txt",
        "sxres_bundle/one/a.txt",
        "sxres_bundle/three/d.bin",
    ];
    write_archive(&jar, &names);
    let svc = service(temp.path(), &[]);

    let target = temp.path().join("out");
    let origin = svc.resolve_from("/sxres_bundle", &jar).unwrap();
    let report = svc.extract_origin(&origin, &target, None).unwrap();

    assert_eq!(report.copied.len(), names.len());
    for name in names {
        let relative = name.strip_prefix("sxres_bundle/").unwrap();
        let extracted = target.join(relative);
        assert_eq!(fs::read(&extracted).unwrap(), name.as_bytes(), "{}", relative);
    }
}

#[test]
fn test_repeated_extraction_copies_the_same_files() {
    let temp = tempfile::tempdir().unwrap();
    sample_tree(temp.path());
    let svc = service(temp.path(), &[]);

    let first = svc.extract("/res", &temp.path().join("first"), None).unwrap();
    let again = svc.extract("/res", &temp.path().join("first"), None).unwrap();
    let second = svc.extract("/res", &temp.path().join("second"), None).unwrap();

    assert_eq!(first.copied.len(), 5);
    assert_eq!(again.copied.len(), first.copied.len());
    assert_eq!(second.copied.len(), first.copied.len());
}

#[test]
fn test_load_rejects_broken_scoping() {
    let temp = tempfile::tempdir().unwrap();
    let store = ManifestStore::new();
    let cases = [
        "a.txt\n/\n",
        "/\nsub/b.txt\n",
        "/\n../escape/\nx\n",
        "sub/\nb.txt\n",
    ];
    for content in cases {
        fs::write(temp.path().join("sikulixcontent"), content).unwrap();
        let err = store.load_from_dir(temp.path()).unwrap_err();
        assert!(
            matches!(err, ResourceError::CorruptManifest { .. }),
            "accepted {:?}",
            content
        );
    }
}

#[test]
fn test_archive_manifest_is_loaded_from_prefix() {
    let temp = tempfile::tempdir().unwrap();
    let jar = temp.path().join("bundle.jar");
    let file = fs::File::create(&jar).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();
    zip.start_file("sxres_bundle/sikulixcontent", options).unwrap();
    std::io::Write::write_all(&mut zip, b"/\nlisted.txt\n").unwrap();
    zip.start_file("sxres_bundle/unlisted.txt", options).unwrap();
    zip.finish().unwrap();

    let svc = service(temp.path(), &[]);
    let origin = svc.resolve_from("/sxres_bundle", &jar).unwrap();
    assert!(matches!(origin, ResourceOrigin::ArchiveFile { .. }));

    // The persisted manifest wins over a physical scan
    let manifest = svc.manifest_of(&origin, None).unwrap();
    assert_eq!(manifest.paths(), vec!["listed.txt"]);
}

#[test]
fn test_fresh_directory_manifest_skips_walk() {
    let temp = tempfile::tempdir().unwrap();
    write_tree(temp.path(), &[("res/real.txt", "r")]);
    fs::write(
        temp.path().join("res").join("sikulixcontent"),
        "/\nreal.txt\nghost.txt\n",
    )
    .unwrap();

    let svc = service(temp.path(), &[]);
    assert_eq!(
        svc.list_paths("/res", None).unwrap(),
        vec!["real.txt", "ghost.txt"]
    );
}

#[test]
fn test_manifest_serializes_to_json() {
    let manifest = Manifest::parse("/\na.txt\nsub/\nb.txt\n");
    let json = serde_json::to_value(&manifest).unwrap();
    assert_eq!(
        json,
        serde_json::json!([
            {"kind": "directory", "value": ""},
            {"kind": "file", "value": "a.txt"},
            {"kind": "directory", "value": "sub"},
            {"kind": "file", "value": "b.txt"},
        ])
    );
}

#[cfg(unix)]
#[test]
fn test_names_with_edge_whitespace_survive_save_and_load() {
    let temp = tempfile::tempdir().unwrap();
    write_tree(
        temp.path(),
        &[("res/ a.txt", "a"), ("res/b.txt ", "b"), ("res/ sub /c.txt", "c")],
    );
    let origin = ResourceOrigin::Directory(temp.path().join("res"));
    let walked = DirectoryWalker::default().walk(&origin, None).unwrap();

    let store = ManifestStore::new();
    let saved_in = temp.path().join("saved");
    store.save_to(&walked, &saved_in).unwrap();
    let loaded = store.load_from_dir(&saved_in).unwrap().unwrap();

    assert_eq!(loaded.flatten(), walked.flatten());
    let mut paths = loaded.paths();
    paths.sort();
    assert_eq!(paths, vec![" a.txt", " sub /c.txt", "b.txt "]);
}
