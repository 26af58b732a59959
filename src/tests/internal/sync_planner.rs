use chrono::DateTime;

use crate::DavError;
use crate::lister::{ResourceInfo, ResourceKind, ResourceTree};
use crate::sync::{SyncAction, SyncMode, SyncPlanner, SyncSide};

const T: i64 = 1_737_100_000; // 基准时刻（秒）

fn file(rel: &str, size: u64, mtime: i64) -> (String, ResourceInfo) {
    (
        rel.to_string(),
        ResourceInfo {
            path: rel.to_string(),
            href: String::new(),
            name: rel.rsplit('/').next().unwrap_or("").to_string(),
            kind: ResourceKind::File,
            size: Some(size),
            modified: DateTime::from_timestamp(mtime, 0).map(|t| t.fixed_offset()),
            created: None,
            etag: None,
            content_type: None,
        },
    )
}

fn dir(rel: &str) -> (String, ResourceInfo) {
    (
        rel.to_string(),
        ResourceInfo {
            path: rel.to_string(),
            href: String::new(),
            name: rel.rsplit('/').next().unwrap_or("").to_string(),
            kind: ResourceKind::Collection,
            size: None,
            modified: None,
            created: None,
            etag: None,
            content_type: None,
        },
    )
}

fn tree(root: &str, entries: Vec<(String, ResourceInfo)>) -> ResourceTree {
    let mut tree = ResourceTree::new(root);
    tree.entries.extend(entries);
    tree
}

#[test]
fn identical_trees_yield_empty_plan() {
    let src = tree("", vec![dir("a"), file("a/f.txt", 10, T)]);
    let dest = tree("", vec![dir("a"), file("a/f.txt", 10, T)]);

    let plan = SyncPlanner::new(SyncMode::Push).plan(&src, &dest).unwrap();
    assert!(plan.is_empty());
    assert_eq!(plan.effective_len(), 0);
    // 全部是带原因的 Skip
    assert!(plan.actions.iter().all(|a| matches!(a, SyncAction::Skip { .. })));
}

#[test]
fn missing_subtree_creates_dir_before_file() {
    let src = tree("", vec![dir("a"), file("a/f.txt", 10, T)]);
    let dest = tree("", vec![]);

    let plan = SyncPlanner::new(SyncMode::Push).plan(&src, &dest).unwrap();
    assert_eq!(
        plan.actions,
        vec![
            SyncAction::MakeDirectory {
                path: "a".to_string(),
                side: SyncSide::Remote,
            },
            SyncAction::Upload {
                src: "a/f.txt".into(),
                dest: "a/f.txt".to_string(),
            },
        ]
    );
}

#[test]
fn newer_source_overwrites() {
    let src = tree("", vec![file("a/f.txt", 10, T + 10)]);
    let dest = tree("", vec![file("a/f.txt", 10, T)]);

    let plan = SyncPlanner::new(SyncMode::Push).plan(&src, &dest).unwrap();
    assert_eq!(plan.actions.len(), 1);
    assert!(matches!(plan.actions[0], SyncAction::Upload { .. }));
}

#[test]
fn unchanged_within_tolerance_skips() {
    // 粒度差 1 秒，容差内视为未变化
    let src = tree("", vec![file("a/f.txt", 10, T + 1)]);
    let dest = tree("", vec![file("a/f.txt", 10, T)]);

    let plan = SyncPlanner::new(SyncMode::Push).plan(&src, &dest).unwrap();
    assert_eq!(
        plan.actions,
        vec![SyncAction::Skip {
            path: "a/f.txt".to_string(),
            reason: "未变化".to_string(),
        }]
    );
}

#[test]
fn size_drift_overwrites_even_when_source_older() {
    // 尺寸不同但源时间戳更旧：尺寸差异本身就是漂移证据，仍然覆盖
    let src = tree("", vec![file("a/f.txt", 11, T - 100)]);
    let dest = tree("", vec![file("a/f.txt", 10, T)]);

    let plan = SyncPlanner::new(SyncMode::Push).plan(&src, &dest).unwrap();
    assert!(matches!(plan.actions[0], SyncAction::Upload { .. }));
}

#[test]
fn no_deletes_by_default() {
    let src = tree("", vec![]);
    let dest = tree("", vec![dir("old"), file("old/x.txt", 5, T)]);

    let plan = SyncPlanner::new(SyncMode::Push).plan(&src, &dest).unwrap();
    assert!(plan.is_empty());
}

#[test]
fn delete_extraneous_orders_files_before_parent_dirs() {
    let src = tree("", vec![file("keep.txt", 3, T)]);
    let dest = tree(
        "",
        vec![file("keep.txt", 3, T), dir("old"), file("old/x.txt", 5, T)],
    );

    let plan = SyncPlanner::new(SyncMode::Push)
        .with_delete_extraneous(true)
        .plan(&src, &dest)
        .unwrap();

    let deletes: Vec<&SyncAction> = plan
        .actions
        .iter()
        .filter(|a| matches!(a, SyncAction::Delete { .. }))
        .collect();
    assert_eq!(
        deletes,
        vec![
            &SyncAction::Delete {
                path: "old/x.txt".to_string(),
                side: SyncSide::Remote,
            },
            &SyncAction::Delete {
                path: "old".to_string(),
                side: SyncSide::Remote,
            },
        ]
    );

    // 删除排在其余动作之后
    let first_delete = plan
        .actions
        .iter()
        .position(|a| matches!(a, SyncAction::Delete { .. }))
        .unwrap();
    assert!(plan.actions[..first_delete]
        .iter()
        .all(|a| !matches!(a, SyncAction::Delete { .. })));
}

#[test]
fn kind_mismatch_fails_plan() {
    let src = tree("", vec![file("x", 1, T)]);
    let dest = tree("", vec![dir("x")]);

    let err = SyncPlanner::new(SyncMode::Push)
        .plan(&src, &dest)
        .unwrap_err();
    assert!(matches!(err, DavError::Conflict { .. }));
}

#[test]
fn pull_mode_emits_downloads_into_local_root() {
    let src = tree("photos", vec![file("cat.jpg", 9, T)]);
    let dest = tree("/backup", vec![]);

    let plan = SyncPlanner::new(SyncMode::Pull).plan(&src, &dest).unwrap();
    assert_eq!(
        plan.actions,
        vec![SyncAction::Download {
            src: "photos/cat.jpg".to_string(),
            dest: "/backup/cat.jpg".into(),
        }]
    );
}

#[test]
fn remote_to_remote_emits_server_side_copies() {
    let src = tree("a", vec![file("f.bin", 7, T)]);
    let dest = tree("b", vec![]);

    let plan = SyncPlanner::new(SyncMode::RemoteToRemote)
        .plan(&src, &dest)
        .unwrap();
    assert_eq!(
        plan.actions,
        vec![SyncAction::CopyRemote {
            src: "a/f.bin".to_string(),
            dest: "b/f.bin".to_string(),
        }]
    );
}

#[test]
fn plans_are_deterministic() {
    let src = tree(
        "",
        vec![
            dir("a"),
            file("a/1.txt", 1, T),
            file("a/2.txt", 2, T),
            dir("b"),
            file("b/3.txt", 3, T),
        ],
    );
    let dest = tree("", vec![dir("a"), file("a/1.txt", 1, T)]);

    let planner = SyncPlanner::new(SyncMode::Push);
    let first = planner.plan(&src, &dest).unwrap();
    let second = planner.plan(&src, &dest).unwrap();
    assert_eq!(first, second);
}

#[test]
fn missing_timestamps_are_conservative() {
    // 任一侧缺时间戳且大小一致：没有覆盖依据，跳过
    let (k, mut no_mtime) = file("f", 4, T);
    no_mtime.modified = None;
    let src = tree("", vec![(k, no_mtime)]);
    let dest = tree("", vec![file("f", 4, T)]);

    let plan = SyncPlanner::new(SyncMode::Push).plan(&src, &dest).unwrap();
    assert!(plan.is_empty());
}
