//! 打真实服务器的集成测试：配置了 `src/tests/env/test.env` 才会执行，
//! 否则直接跳过。会在服务端建立并清理一个独立的测试目录。

use rand::Rng;

use crate::client::{CancelFlag, WebdavClient};
use crate::lister::{ListDepth, ResourceLister, scan_local_tree};
use crate::sync::{SyncExecutor, SyncMode, SyncPlanner};
use crate::tests::load_account_optional;

fn live_client() -> Option<WebdavClient> {
    let auth = load_account_optional()?.to_webdav_auth().ok()?;
    WebdavClient::with_default_config(auth).ok()
}

/// 每次跑出一个独立的远端工作目录，互不干扰
fn scratch_dir() -> String {
    let n: u32 = rand::thread_rng().r#gen();
    format!("webdav_sync_test_{n:08x}")
}

#[tokio::test]
async fn roundtrip_mkdir_upload_ls_download_delete() {
    let Some(client) = live_client() else {
        println!("未配置测试账号，跳过");
        return;
    };

    let scratch = scratch_dir();
    client.mkdirs(&format!("{scratch}/sub")).await.unwrap();

    let tmp = tempfile::tempdir().unwrap();
    let local = tmp.path().join("hello.txt");
    std::fs::write(&local, b"hello webdav").unwrap();

    let remote = format!("{scratch}/sub/hello.txt");
    let cancel = CancelFlag::new();
    client
        .upload_file(&local, &remote, true, &cancel)
        .await
        .unwrap();

    assert!(client.exists(&remote).await.unwrap());
    let info = client.stat(&remote).await.unwrap();
    assert_eq!(info.size, Some(12));

    let children = client.ls(&format!("{scratch}/sub")).await.unwrap();
    assert!(children.iter().any(|c| c.path.ends_with("hello.txt")));
    // depth-1 列举不含目录自身
    assert!(children.iter().all(|c| !c.path.ends_with("/sub")));

    let back = tmp.path().join("back.txt");
    client.download_file(&remote, &back, &cancel).await.unwrap();
    assert_eq!(std::fs::read(&back).unwrap(), b"hello webdav");

    client.delete(&scratch).await.unwrap();
    assert!(!client.exists(&scratch).await.unwrap());
}

#[tokio::test]
async fn full_listing_walks_subtree() {
    let Some(client) = live_client() else {
        println!("未配置测试账号，跳过");
        return;
    };

    let scratch = scratch_dir();
    client.mkdirs(&format!("{scratch}/a/b")).await.unwrap();

    let tmp = tempfile::tempdir().unwrap();
    let local = tmp.path().join("f.bin");
    std::fs::write(&local, vec![0u8; 1024]).unwrap();
    client
        .upload_file(&local, &format!("{scratch}/a/b/f.bin"), true, &CancelFlag::new())
        .await
        .unwrap();

    let tree = ResourceLister::new(&client)
        .list(&scratch, ListDepth::Full)
        .await
        .unwrap();

    assert!(tree.is_complete());
    assert!(tree.entries.contains_key("a"));
    assert!(tree.entries.contains_key("a/b"));
    assert_eq!(tree.entries["a/b/f.bin"].size, Some(1024));

    client.delete(&scratch).await.unwrap();
}

#[tokio::test]
async fn push_sync_then_replan_is_empty() {
    let Some(client) = live_client() else {
        println!("未配置测试账号，跳过");
        return;
    };

    let scratch = scratch_dir();
    client.mkdirs(&scratch).await.unwrap();

    // 本地源树
    let tmp = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(tmp.path().join("docs")).unwrap();
    std::fs::write(tmp.path().join("docs/a.txt"), b"aaa").unwrap();
    std::fs::write(tmp.path().join("top.txt"), b"top").unwrap();

    let lister = ResourceLister::new(&client);
    let planner = SyncPlanner::new(SyncMode::Push);

    let src = scan_local_tree(tmp.path(), 64).await.unwrap();
    let dest = lister.list(&scratch, ListDepth::Full).await.unwrap();
    let plan = planner.plan(&src, &dest).unwrap();
    assert!(!plan.is_empty());

    let report = SyncExecutor::new(&client).execute(plan).await;
    assert!(report.is_success());

    // 幂等性：对产生的目标树重跑一遍计划应当为空
    let src = scan_local_tree(tmp.path(), 64).await.unwrap();
    let dest = lister.list(&scratch, ListDepth::Full).await.unwrap();
    let replan = planner.plan(&src, &dest).unwrap();
    assert!(replan.is_empty(), "重跑计划应为空: {replan:?}");

    client.delete(&scratch).await.unwrap();
}
