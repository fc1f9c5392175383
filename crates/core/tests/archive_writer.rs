mod common;

use std::fs;
use std::io::Read;
use std::path::PathBuf;

use symcollect_core::archive::{
    module_dir_entry, symbol_file_entry, CollectLayout, EntryKind, LayoutError, SymbolArchive,
};
use tempfile::tempdir;

#[test]
fn layout_strips_zip_suffix_for_work_dir() {
    let layout = CollectLayout::from_archive("/tmp/out/app-1.2.zip").expect("layout");
    assert_eq!(layout.work_dir, PathBuf::from("/tmp/out/app-1.2"));
    assert_eq!(layout.archive_path, PathBuf::from("/tmp/out/app-1.2.zip"));
    assert_eq!(layout.staging_path, PathBuf::from("/tmp/out/app-1.2.zip.partial"));
}

#[test]
fn layout_rejects_wrong_or_bare_suffix() {
    for bad in ["out.tar", "out.ZIP", "out.zip.bak"] {
        assert!(
            matches!(CollectLayout::from_archive(bad), Err(LayoutError::MissingSuffix(_))),
            "{bad} accepted"
        );
    }
    for bad in [".zip", "dir/.zip", "..zip", "...zip", "x/..zip", "x/...zip", "x\\..zip"] {
        assert!(
            matches!(CollectLayout::from_archive(bad), Err(LayoutError::NoStem(_))),
            "{bad} accepted"
        );
    }
}

#[test]
fn layout_accepts_dotted_stems_that_name_a_directory() {
    let layout = CollectLayout::from_archive("x/.hidden.zip").expect("layout");
    assert_eq!(layout.work_dir, PathBuf::from("x/.hidden"));
    let layout = CollectLayout::from_archive("a..b.zip").expect("layout");
    assert_eq!(layout.work_dir, PathBuf::from("a..b"));
}

#[cfg(unix)]
#[test]
fn layout_reports_non_utf8_path_separately() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let path = std::path::Path::new(OsStr::from_bytes(b"out\xff.zip"));
    let err = CollectLayout::from_archive(path).unwrap_err();
    assert!(matches!(err, LayoutError::NotUnicode(_)));
    assert!(err.to_string().contains("not valid UTF-8"), "unexpected message: {err}");
}

#[test]
fn entry_paths_follow_symbol_store_layout() {
    assert_eq!(module_dir_entry("libfoo.so", "ABC0"), "symbols/libfoo.so/ABC0");
    assert_eq!(symbol_file_entry("libfoo.so", "ABC0"), "symbols/libfoo.so/ABC0/libfoo.so.sym");
    // Empty identity is degenerate but still produces a path.
    assert_eq!(symbol_file_entry("libfoo.so", ""), "symbols/libfoo.so//libfoo.so.sym");
}

#[test]
fn writes_directory_then_file_entries_readable_by_zip() {
    let tmp = tempdir().expect("tempdir");
    let sym = tmp.path().join("libfoo.so.sym");
    fs::write(&sym, "MODULE Linux x86_64 ABC0 libfoo.so\n").unwrap();
    let zip_path = tmp.path().join("out.zip");

    let mut archive = SymbolArchive::create(&zip_path).expect("create");
    archive.add_directory("symbols/libfoo.so/ABC0").unwrap();
    assert!(archive.add_file("symbols/libfoo.so/ABC0/libfoo.so.sym", &sym).unwrap());
    archive.finish().unwrap();

    assert_eq!(
        archive.entries(),
        &[
            (EntryKind::Directory, "symbols/libfoo.so/ABC0".to_string()),
            (EntryKind::File, "symbols/libfoo.so/ABC0/libfoo.so.sym".to_string()),
        ]
    );
    assert_eq!(
        common::zip_entries(&zip_path),
        vec!["symbols/libfoo.so/ABC0/", "symbols/libfoo.so/ABC0/libfoo.so.sym"]
    );

    let mut zip = zip::ZipArchive::new(fs::File::open(&zip_path).unwrap()).unwrap();
    let mut body = String::new();
    zip.by_name("symbols/libfoo.so/ABC0/libfoo.so.sym")
        .unwrap()
        .read_to_string(&mut body)
        .unwrap();
    assert_eq!(body, "MODULE Linux x86_64 ABC0 libfoo.so\n");
}

#[test]
fn directories_are_idempotent_and_files_never_overwritten() {
    let tmp = tempdir().expect("tempdir");
    let first = tmp.path().join("first.sym");
    let second = tmp.path().join("second.sym");
    fs::write(&first, "first").unwrap();
    fs::write(&second, "second").unwrap();
    let zip_path = tmp.path().join("dup.zip");

    let mut archive = SymbolArchive::create(&zip_path).expect("create");
    archive.add_directory("symbols/a/1").unwrap();
    archive.add_directory("symbols/a/1/").unwrap();
    assert!(archive.add_file("symbols/a/1/a.sym", &first).unwrap());
    assert!(!archive.add_file("symbols/a/1/a.sym", &second).unwrap());
    archive.finish().unwrap();
    archive.finish().unwrap();

    assert_eq!(common::zip_entries(&zip_path), vec!["symbols/a/1/", "symbols/a/1/a.sym"]);
    let mut zip = zip::ZipArchive::new(fs::File::open(&zip_path).unwrap()).unwrap();
    let mut body = String::new();
    zip.by_name("symbols/a/1/a.sym").unwrap().read_to_string(&mut body).unwrap();
    assert_eq!(body, "first");
}

#[test]
fn adding_a_missing_source_file_errors() {
    let tmp = tempdir().expect("tempdir");
    let mut archive = SymbolArchive::create(tmp.path().join("x.zip")).expect("create");
    let err = archive.add_file("symbols/x/1/x.sym", &tmp.path().join("missing.sym")).unwrap_err();
    assert!(err.to_string().contains("failed to open"), "unexpected error: {err}");
}

#[test]
fn creating_archive_in_missing_directory_errors() {
    let tmp = tempdir().expect("tempdir");
    let result = SymbolArchive::create(tmp.path().join("no/such/dir/out.zip"));
    assert!(result.is_err());
}
