use kept_core::error::Error;
use kept_core::scan::scan_tree;
use std::fs;

#[test]
fn finds_files_at_every_depth() {
    let td = tempfile::tempdir().unwrap();
    let root = td.path();
    fs::create_dir_all(root.join("a/b/c")).unwrap();
    fs::create_dir_all(root.join("empty")).unwrap();
    fs::write(root.join("top.txt"), b"1").unwrap();
    fs::write(root.join("a/mid.txt"), b"2").unwrap();
    fs::write(root.join("a/b/c/deep.txt"), b"3").unwrap();

    let files = scan_tree(root).unwrap();
    assert_eq!(files.len(), 3);
    assert!(files.contains(&root.join("top.txt")));
    assert!(files.contains(&root.join("a/mid.txt")));
    assert!(files.contains(&root.join("a/b/c/deep.txt")));
}

#[cfg(target_family = "unix")]
#[test]
fn symlinks_are_not_followed_or_listed() {
    let td = tempfile::tempdir().unwrap();
    let root = td.path().join("root");
    let outside = td.path().join("outside");
    fs::create_dir_all(&root).unwrap();
    fs::create_dir_all(&outside).unwrap();
    fs::write(root.join("real.txt"), b"r").unwrap();
    fs::write(outside.join("o.txt"), b"o").unwrap();
    std::os::unix::fs::symlink(&outside, root.join("dirlink")).unwrap();
    std::os::unix::fs::symlink(root.join("real.txt"), root.join("filelink")).unwrap();

    let files = scan_tree(&root).unwrap();
    assert_eq!(files.into_iter().collect::<Vec<_>>(), vec![root.join("real.txt")]);
}

#[test]
fn missing_root_is_a_traversal_error() {
    let td = tempfile::tempdir().unwrap();
    let fail = scan_tree(&td.path().join("nope")).unwrap_err();
    assert!(fail.partial.is_empty());
    assert!(matches!(fail.error, Error::Traversal { .. }));
}

#[test]
fn file_root_is_a_traversal_error() {
    let td = tempfile::tempdir().unwrap();
    let f = td.path().join("plain.txt");
    fs::write(&f, b"x").unwrap();
    let fail = scan_tree(&f).unwrap_err();
    assert!(matches!(fail.error, Error::Traversal { ref path, .. } if path == &f));
}

#[cfg(target_family = "unix")]
#[test]
fn unreadable_directory_stops_walk_with_partial_result() {
    use std::os::unix::fs::PermissionsExt;

    let td = tempfile::tempdir().unwrap();
    let root = td.path();
    fs::write(root.join("a.txt"), b"a").unwrap();
    let locked = root.join("b-locked");
    fs::create_dir_all(&locked).unwrap();
    fs::write(locked.join("hidden.txt"), b"h").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Permission bits do not bind a privileged user.
    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let result = scan_tree(root);
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    let failure = result.unwrap_err();
    assert!(failure.partial.contains(&root.join("a.txt")));
    assert!(!failure.partial.contains(&locked.join("hidden.txt")));
    match failure.error {
        Error::Traversal { path, .. } => assert_eq!(path, locked),
        other => panic!("unexpected error: {other}"),
    }
}
