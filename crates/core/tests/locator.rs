mod common;

use common::{builder, service, write_archive, write_tree};
use std::fs;
use std::sync::Arc;
use sxres_core::host::FixedHost;
use sxres_core::{MatchPolicy, OsFamily, ResourceConfig, ResourceError, ResourceOrigin};

#[test]
fn test_directory_under_work_dir() {
    let temp = tempfile::tempdir().unwrap();
    write_tree(temp.path(), &[("images/logo.png", "png")]);

    let origin = service(temp.path(), &[]).resolve("/images").unwrap();
    assert_eq!(origin, ResourceOrigin::Directory(temp.path().join("images")));
}

#[test]
fn test_absolute_directory_with_app_data_placeholder() {
    let temp = tempfile::tempdir().unwrap();
    write_tree(temp.path(), &[("appdata/Lib/sikuli/init.py", "")]);
    let work = tempfile::tempdir().unwrap();

    let svc = builder(work.path(), &[])
        .with_host(Arc::new(FixedHost::new(temp.path().join("appdata"))))
        .build();
    let origin = svc.resolve("<appdata>/Lib").unwrap();
    assert_eq!(
        origin,
        ResourceOrigin::Directory(temp.path().join("appdata").join("Lib"))
    );
}

#[test]
fn test_reference_directory() {
    let temp = tempfile::tempdir().unwrap();
    write_tree(temp.path(), &[("classes/sxres_icons/a.png", "a")]);
    let svc = service(temp.path(), &[]);

    let origin = svc
        .resolve_from("/sxres_icons", &temp.path().join("classes"))
        .unwrap();
    assert_eq!(
        origin,
        ResourceOrigin::Directory(temp.path().join("classes").join("sxres_icons"))
    );
}

#[test]
fn test_reference_archive_from_config() {
    let temp = tempfile::tempdir().unwrap();
    let jar = temp.path().join("app.jar");
    write_archive(&jar, &["sxres_icons/a.png", "other/b.png"]);

    let svc = builder(temp.path(), &[])
        .with_config(
            ResourceConfig::default()
                .with_work_dir(temp.path())
                .with_reference(&jar),
        )
        .build();
    let origin = svc.resolve("/sxres_icons/").unwrap();
    assert_eq!(
        origin,
        ResourceOrigin::ArchiveFile {
            archive: jar,
            prefix: "sxres_icons".to_string(),
        }
    );
    assert_eq!(svc.list_paths("/sxres_icons", None).unwrap(), vec!["a.png"]);
}

#[test]
fn test_classpath_content_scan() {
    let temp = tempfile::tempdir().unwrap();
    fs::create_dir(temp.path().join("lib")).unwrap();
    let first = temp.path().join("lib").join("first.jar");
    let second = temp.path().join("lib").join("second.jar");
    write_archive(&first, &["unrelated/x.txt"]);
    write_archive(&second, &["sxres_data/eng.txt", "sxres_data/deu.txt"]);
    let work = tempfile::tempdir().unwrap();

    let svc = service(work.path(), &[first.as_path(), second.as_path()]);
    match svc.resolve("/sxres_data").unwrap() {
        ResourceOrigin::NestedArchive { entry, prefix } => {
            assert_eq!(entry.path, second);
            assert_eq!(prefix, "sxres_data");
        }
        other => panic!("unexpected origin {}", other),
    }

    let target = work.path().join("out");
    let report = svc.extract("/sxres_data", &target, None).unwrap();
    assert_eq!(report.copied.len(), 2);
    assert_eq!(fs::read_to_string(target.join("eng.txt")).unwrap(), "sxres_data/eng.txt");
}

#[test]
fn test_classpath_directory_entry() {
    let temp = tempfile::tempdir().unwrap();
    write_tree(temp.path(), &[("target/classes/sxres_scripts/run.py", "")]);
    let classes = temp.path().join("target").join("classes");
    let work = tempfile::tempdir().unwrap();

    let origin = service(work.path(), &[classes.as_path()]).resolve("/sxres_scripts").unwrap();
    assert_eq!(origin, ResourceOrigin::Directory(classes.join("sxres_scripts")));
}

#[test]
fn test_qualified_root_picks_archive_by_name() {
    let temp = tempfile::tempdir().unwrap();
    let extra = temp.path().join("sikulixapi-extra.jar");
    let api = temp.path().join("sikulixapi.jar");
    write_archive(&extra, &["Lib/sikuli/extra.py"]);
    write_archive(&api, &["Lib/sikuli/__init__.py", "Lib/sikuli/Sikuli.py"]);
    let work = tempfile::tempdir().unwrap();

    let first_match = service(work.path(), &[extra.as_path(), api.as_path()]);
    let origin = first_match.resolve("sikulixapi!/Lib/sikuli").unwrap();
    assert_eq!(origin.path(), extra.as_path());

    let exact = builder(work.path(), &[extra.as_path(), api.as_path()])
        .with_config(
            ResourceConfig::default()
                .with_work_dir(work.path())
                .with_match_policy(MatchPolicy::ExactFirst),
        )
        .build();
    let origin = exact.resolve("sikulixapi!/Lib/sikuli").unwrap();
    assert_eq!(origin.archive_location(), Some((api.as_path(), "Lib/sikuli")));
    assert_eq!(
        exact.list_paths("sikulixapi!/Lib/sikuli", None).unwrap(),
        vec!["__init__.py", "Sikuli.py"]
    );
}

#[test]
fn test_classpath_name_match_honours_policy() {
    let temp = tempfile::tempdir().unwrap();
    fs::create_dir(temp.path().join("lib")).unwrap();
    let extra = temp.path().join("lib").join("sxres_pack-extra.jar");
    let pack = temp.path().join("lib").join("sxres_pack.jar");
    write_archive(&extra, &["x.txt"]);
    write_archive(&pack, &["y.txt"]);
    let classpath = [extra.as_path(), pack.as_path()];

    let first = service(temp.path(), &classpath).resolve("/sxres_pack").unwrap();
    assert_eq!(first.archive_location(), Some((extra.as_path(), "")));

    let exact = builder(temp.path(), &classpath)
        .with_config(
            ResourceConfig::default()
                .with_work_dir(temp.path())
                .with_match_policy(MatchPolicy::ExactFirst),
        )
        .build();
    let origin = exact.resolve("/sxres_pack").unwrap();
    assert_eq!(origin.archive_location(), Some((pack.as_path(), "")));
    assert_eq!(exact.list_paths("/sxres_pack", None).unwrap(), vec!["y.txt"]);
}

#[test]
fn test_unknown_root_is_not_found() {
    let temp = tempfile::tempdir().unwrap();
    let jar = temp.path().join("app.jar");
    write_archive(&jar, &["other/a.txt"]);

    let svc = service(temp.path(), &[jar.as_path()]);
    let err = svc.resolve("/sxres_nowhere").unwrap_err();
    assert!(matches!(err, ResourceError::NotFound(_)));
    assert!(err.is_recoverable());

    let err = svc.resolve("missing!/x").unwrap_err();
    assert!(matches!(err, ResourceError::NotFound(_)));
}

#[test]
fn test_read_and_export_single_files() {
    let temp = tempfile::tempdir().unwrap();
    let jar = temp.path().join("app.jar");
    write_archive(&jar, &["sxres_text/sub/hello.txt"]);
    let svc = service(temp.path(), &[jar.as_path()]);

    assert_eq!(
        svc.read_to_string("/sxres_text", "sub/hello.txt").unwrap(),
        "sxres_text/sub/hello.txt"
    );

    let out = temp.path().join("out");
    let written = svc
        .extract_file("/sxres_text", "sub/hello.txt", &out, Some("renamed.txt"))
        .unwrap();
    assert_eq!(written, out.join("renamed.txt"));
    assert!(written.is_file());

    let err = svc
        .extract_file("/sxres_text", "sub/absent.txt", &out, None)
        .unwrap_err();
    assert!(matches!(err, ResourceError::NotFound(_)));
    assert!(!out.join("absent.txt").exists());
}

#[test]
fn test_export_native_libs_for_host_os() {
    let temp = tempfile::tempdir().unwrap();
    write_tree(
        temp.path(),
        &[
            ("sikulixlibs/linux/libs64/libopencv_java.so", "so"),
            ("sikulixlibs/windows/libs64/opencv_java.dll", "dll"),
        ],
    );
    let host = FixedHost {
        app_data: temp.path().join("appdata"),
        os: OsFamily::Linux,
    };
    let svc = builder(temp.path(), &[]).with_host(Arc::new(host)).build();

    let target = temp.path().join("libs");
    let report = svc.export_native_libs(&target).unwrap();
    assert_eq!(report.copied, vec![target.join("libopencv_java.so")]);
}

#[test]
fn test_export_pattern_data_from_classpath_archive() {
    let temp = tempfile::tempdir().unwrap();
    let jar = temp.path().join("api.jar");
    write_archive(&jar, &["sikulixtessdata/eng.traineddata", "other/x.txt"]);
    let work = tempfile::tempdir().unwrap();
    let svc = service(work.path(), &[jar.as_path()]);

    let target = work.path().join("tessdata");
    let report = svc.export_pattern_data(&target).unwrap();
    assert_eq!(report.copied, vec![target.join("eng.traineddata")]);
    assert!(target.join("sikulixcontent").is_file());
}
