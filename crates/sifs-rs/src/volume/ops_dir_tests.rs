use super::*;
use crate::layout::MAX_ENTRIES;
use crate::test_utils::fresh_volume;

#[test]
fn mkdir_links_child_into_parent() {
    let (_dir, mut volume) = fresh_volume(16);
    volume.mkdir("parent").expect("mkdir parent");
    volume.mkdir("parent/child").expect("mkdir child");

    assert_eq!(volume.dirinfo("parent").expect("dirinfo").names, vec!["child"]);
    assert_eq!(volume.dirinfo("").expect("root").names, vec!["parent"]);
    assert_eq!(volume.dirinfo("./parent/child").expect("child").nentries(), 0);

    volume.rmdir("parent/child").expect("rmdir");
    assert!(volume.dirinfo("parent").expect("dirinfo").names.is_empty());
}

#[test]
fn extra_separators_are_ignored() {
    let (_dir, mut volume) = fresh_volume(16);
    volume.mkdir("//a//").expect("mkdir");
    volume.mkdir("./a///b").expect("mkdir nested");
    assert_eq!(volume.dirinfo("/a/").expect("dirinfo").names, vec!["b"]);
}

#[test]
fn mkdir_validates_leaf_name() {
    let (_dir, mut volume) = fresh_volume(16);
    let too_long = "x".repeat(32);
    for bad in ["", ".", "/", too_long.as_str()] {
        let err = volume.mkdir(bad).expect_err("must fail");
        assert!(matches!(err, SifsError::InvalidArgument(_)), "{bad:?}");
    }
    volume.mkdir(&"x".repeat(31)).expect("longest name fits");
}

#[test]
fn mkdir_reports_parent_problems() {
    let (_dir, mut volume) = fresh_volume(16);
    volume.writefile("file", b"data").expect("writefile");

    assert!(matches!(
        volume.mkdir("missing/child"),
        Err(SifsError::NoSuchEntry)
    ));
    assert!(matches!(
        volume.mkdir("file/child"),
        Err(SifsError::NotADirectory)
    ));
}

#[test]
fn mkdir_refuses_taken_names_of_either_kind() {
    let (_dir, mut volume) = fresh_volume(16);
    volume.mkdir("dir").expect("mkdir");
    volume.writefile("file", b"data").expect("writefile");
    let before = volume.usage().expect("usage");

    assert!(matches!(volume.mkdir("dir"), Err(SifsError::AlreadyExists)));
    assert!(matches!(volume.mkdir("file"), Err(SifsError::AlreadyExists)));
    assert_eq!(volume.usage().expect("usage"), before);
}

#[test]
fn full_directory_reports_too_many_entries() {
    let (_dir, mut volume) = fresh_volume(64);
    for i in 0..MAX_ENTRIES {
        volume.mkdir(&format!("d{i}")).expect("mkdir");
    }
    let before = volume.usage().expect("usage");

    assert!(matches!(
        volume.mkdir("overflow"),
        Err(SifsError::TooManyEntries)
    ));
    assert!(matches!(
        volume.writefile("overflow", b"x"),
        Err(SifsError::TooManyEntries)
    ));
    assert_eq!(volume.usage().expect("usage"), before);
}

#[test]
fn mkdir_without_free_blocks_is_out_of_space() {
    let (_dir, mut volume) = fresh_volume(3);
    volume.mkdir("a").expect("mkdir");
    volume.mkdir("b").expect("mkdir");

    assert!(matches!(volume.mkdir("c"), Err(SifsError::OutOfSpace)));
    assert_eq!(volume.dirinfo("").expect("root").names, vec!["a", "b"]);
}

#[test]
fn rmdir_frees_the_block_and_keeps_sibling_order() {
    let (_dir, mut volume) = fresh_volume(16);
    for name in ["a", "b", "c"] {
        volume.mkdir(name).expect("mkdir");
    }
    let dirs_before = volume.usage().expect("usage").dirs;

    volume.rmdir("b").expect("rmdir");
    assert_eq!(volume.dirinfo("").expect("root").names, vec!["a", "c"]);
    assert_eq!(volume.usage().expect("usage").dirs, dirs_before - 1);
}

#[test]
fn rmdir_refuses_non_empty_directories() {
    let (_dir, mut volume) = fresh_volume(16);
    volume.mkdir("outer").expect("mkdir");
    volume.mkdir("outer/inner").expect("mkdir");

    assert!(matches!(
        volume.rmdir("outer"),
        Err(SifsError::DirectoryNotEmpty)
    ));
    volume.rmdir("outer/inner").expect("rmdir inner");
    volume.rmdir("outer").expect("rmdir outer");
    assert_eq!(volume.usage().expect("usage").dirs, 1);
}

#[test]
fn rmdir_rejects_root_files_and_missing_names() {
    let (_dir, mut volume) = fresh_volume(16);
    volume.writefile("file", b"data").expect("writefile");

    assert!(matches!(volume.rmdir(""), Err(SifsError::InvalidArgument(_))));
    assert!(matches!(volume.rmdir("."), Err(SifsError::InvalidArgument(_))));
    assert!(matches!(volume.rmdir("file"), Err(SifsError::NotADirectory)));
    assert!(matches!(volume.rmdir("ghost"), Err(SifsError::NoSuchEntry)));
}

#[test]
fn dirinfo_of_a_file_is_not_a_directory() {
    let (_dir, mut volume) = fresh_volume(16);
    volume.writefile("file", b"data").expect("writefile");
    assert!(matches!(
        volume.dirinfo("file"),
        Err(SifsError::NotADirectory)
    ));
    assert!(matches!(volume.dirinfo("nope"), Err(SifsError::NoSuchEntry)));
}

const STALE: i64 = 5;

#[test]
fn mkdir_updates_parent_modtime() {
    let (_dir, mut volume) = fresh_volume(16);
    volume.mkdir("p").expect("mkdir");
    volume.backdate_dir("p", STALE);

    volume.mkdir("p/q").expect("mkdir");
    assert!(volume.dirinfo("p").expect("dirinfo").modtime > STALE);
    assert!(volume.dirinfo("p/q").expect("dirinfo").modtime > STALE);
}

#[test]
fn rmdir_updates_parent_modtime() {
    let (_dir, mut volume) = fresh_volume(16);
    volume.mkdir("p").expect("mkdir");
    volume.mkdir("p/q").expect("mkdir");
    volume.backdate_dir("p", STALE);

    volume.rmdir("p/q").expect("rmdir");
    assert!(volume.dirinfo("p").expect("dirinfo").modtime > STALE);
}

#[test]
fn failed_mkdir_leaves_parent_modtime_alone() {
    let (_dir, mut volume) = fresh_volume(16);
    volume.mkdir("p").expect("mkdir");
    volume.mkdir("p/q").expect("mkdir");
    volume.backdate_dir("p", STALE);

    assert!(matches!(volume.mkdir("p/q"), Err(SifsError::AlreadyExists)));
    assert_eq!(volume.dirinfo("p").expect("dirinfo").modtime, STALE);
}

#[test]
fn list_tags_each_kind() {
    let (_dir, mut volume) = fresh_volume(16);
    volume.mkdir("sub").expect("mkdir");
    volume.writefile("note", b"n").expect("writefile");

    let listing = volume.list("").expect("list");
    assert_eq!(
        listing,
        vec![
            ListEntry {
                kind: EntryKind::Dir,
                name: "sub".to_string()
            },
            ListEntry {
                kind: EntryKind::File,
                name: "note".to_string()
            },
        ]
    );
}
