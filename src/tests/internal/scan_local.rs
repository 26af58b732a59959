use crate::lister::{ResourceKind, scan_local_tree};

#[tokio::test]
async fn scans_nested_directories() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    std::fs::create_dir_all(root.join("a/b")).unwrap();
    std::fs::write(root.join("a/f.txt"), b"hello").unwrap();
    std::fs::write(root.join("a/b/g.bin"), b"12345678").unwrap();

    let tree = scan_local_tree(root, 64).await.unwrap();

    assert!(tree.is_complete());
    // 根自身 + a + a/b + 两个文件
    assert_eq!(tree.entries.len(), 5);
    assert_eq!(tree.entries[""].kind, ResourceKind::Collection);
    assert_eq!(tree.entries["a/f.txt"].size, Some(5));
    assert_eq!(tree.entries["a/b/g.bin"].size, Some(8));
    assert!(tree.entries["a/f.txt"].modified.is_some());
}

#[tokio::test]
async fn missing_root_yields_empty_tree() {
    let tmp = tempfile::tempdir().unwrap();
    let tree = scan_local_tree(&tmp.path().join("not-here"), 64)
        .await
        .unwrap();
    assert!(tree.entries.is_empty());
    assert!(tree.is_complete());
}

#[tokio::test]
async fn single_file_root_is_one_entry() {
    let tmp = tempfile::tempdir().unwrap();
    let file = tmp.path().join("solo.txt");
    std::fs::write(&file, b"abc").unwrap();

    let tree = scan_local_tree(&file, 64).await.unwrap();
    assert_eq!(tree.entries.len(), 1);
    assert_eq!(tree.entries[""].kind, ResourceKind::File);
    assert_eq!(tree.entries[""].size, Some(3));
}

#[tokio::test]
async fn depth_bound_rejects_pathological_nesting() {
    let tmp = tempfile::tempdir().unwrap();
    let mut deep = tmp.path().to_path_buf();
    for i in 0..5 {
        deep = deep.join(format!("d{i}"));
    }
    std::fs::create_dir_all(&deep).unwrap();

    let err = scan_local_tree(tmp.path(), 3).await.unwrap_err();
    assert!(matches!(err, crate::DavError::Traversal { .. }));
}
