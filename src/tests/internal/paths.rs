use crate::DavError;
use crate::paths::{decode_path, join_path, normalize_path, relative_to};

#[test]
fn normalize_collapses_separators_and_dots() {
    assert_eq!(normalize_path("/a//b/./c/"), "a/b/c");
    assert_eq!(normalize_path(""), "");
    assert_eq!(normalize_path("///"), "");
    assert_eq!(normalize_path("a"), "a");
}

#[test]
fn join_resolves_dot_segments() {
    assert_eq!(join_path("base", &["sub/child"]).unwrap(), "base/sub/child");
    assert_eq!(join_path("base", &["a/../b"]).unwrap(), "base/b");
    assert_eq!(join_path("", &["a", "b"]).unwrap(), "a/b");
    assert_eq!(join_path("base", &["."]).unwrap(), "base");
}

#[test]
fn join_decodes_percent_escapes() {
    assert_eq!(join_path("", &["a%20b.txt"]).unwrap(), "a b.txt");
    assert_eq!(
        join_path("docs", &["%E6%96%87%E6%A1%A3.md"]).unwrap(),
        "docs/文档.md"
    );
}

#[test]
fn join_rejects_escape_above_root() {
    let err = join_path("root", &["../outside"]).unwrap_err();
    assert!(matches!(err, DavError::Path { .. }));

    // 编码过的 .. 同样拦截
    let err = join_path("root", &["%2e%2e/outside"]).unwrap_err();
    assert!(matches!(err, DavError::Path { .. }));
}

#[test]
fn relative_to_strips_root_prefix() {
    assert_eq!(relative_to("root", "root/a/b").unwrap(), "a/b");
    assert_eq!(relative_to("root", "root").unwrap(), "");
    assert_eq!(relative_to("", "a/b").unwrap(), "a/b");
}

#[test]
fn relative_to_rejects_outside_paths() {
    assert!(matches!(
        relative_to("root", "other/a").unwrap_err(),
        DavError::Path { .. }
    ));
    // 前缀相似但不是路径边界
    assert!(matches!(
        relative_to("root", "rootx/a").unwrap_err(),
        DavError::Path { .. }
    ));
}

#[test]
fn join_relative_round_trip() {
    let root = "remote/mount";
    for p in [
        "remote/mount",
        "remote/mount/a",
        "remote/mount/a/b c.txt",
        "remote/mount/深层/目录/文件.bin",
    ] {
        let rel = relative_to(root, p).unwrap();
        assert_eq!(join_path(root, &[&rel]).unwrap(), p);
    }
}

#[test]
fn decode_path_is_lossy_on_bad_utf8() {
    assert_eq!(decode_path("a%20b"), "a b");
    // 非法序列不触发 panic
    let _ = decode_path("%ff%fe");
}
