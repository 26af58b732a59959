//! 本地目录树扫描：与远程列举同构的显式队列推进，产出同一种
//! [`ResourceTree`] 快照，供同步计划在同一相对路径空间里做差。

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tokio::fs;
use tracing::warn;

use crate::internal::error::{DavError, DavResult};
use crate::internal::lister::structs::resource_info::{ResourceInfo, ResourceKind};
use crate::internal::lister::structs::resource_tree::{ListError, ResourceTree};

/// 扫描本地目录为树快照
///
/// 根不存在时返回空树（同步场景里"目标还没建出来"是正常状态）；
/// 单个子目录读取失败记录在树上，兄弟目录继续。
pub async fn scan_local_tree(root: &Path, max_depth: usize) -> DavResult<ResourceTree> {
    let mut tree = ResourceTree::new(root.display().to_string());

    let metadata = match fs::metadata(root).await {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(tree),
        Err(e) => {
            return Err(DavError::Io {
                op: "scan",
                path: root.display().to_string(),
                source: e,
            });
        }
    };

    if metadata.is_file() {
        tree.entries
            .insert(String::new(), file_info(root, &metadata, String::new()));
        return Ok(tree);
    }

    tree.entries
        .insert(String::new(), dir_info(root, String::new()));

    // (相对路径, 层级) 的显式队列，避免递归也便于限深
    let mut queue: Vec<(String, usize)> = vec![(String::new(), 1)];

    while let Some((rel, level)) = queue.pop() {
        if level > max_depth {
            return Err(DavError::Traversal {
                path: rel,
                max_depth,
            });
        }

        let dir_path = join_local(root, &rel);
        let mut entries = match fs::read_dir(&dir_path).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %dir_path.display(), error = %e, "本地目录读取失败，跳过继续");
                tree.errors.push(ListError {
                    path: rel,
                    error: DavError::Io {
                        op: "scan",
                        path: dir_path.display().to_string(),
                        source: e,
                    },
                });
                continue;
            }
        };

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    tree.errors.push(ListError {
                        path: rel.clone(),
                        error: DavError::Io {
                            op: "scan",
                            path: dir_path.display().to_string(),
                            source: e,
                        },
                    });
                    break;
                }
            };

            let name = entry.file_name().to_string_lossy().to_string();
            let key = if rel.is_empty() {
                name.clone()
            } else {
                format!("{rel}/{name}")
            };

            match entry.metadata().await {
                Ok(meta) if meta.is_dir() => {
                    tree.entries.insert(key.clone(), dir_info(&entry.path(), key.clone()));
                    queue.push((key, level + 1));
                }
                Ok(meta) => {
                    tree.entries
                        .insert(key.clone(), file_info(&entry.path(), &meta, key));
                }
                Err(e) => {
                    tree.errors.push(ListError {
                        path: key,
                        error: DavError::Io {
                            op: "scan",
                            path: entry.path().display().to_string(),
                            source: e,
                        },
                    });
                }
            }
        }
    }

    Ok(tree)
}

fn join_local(root: &Path, rel: &str) -> PathBuf {
    if rel.is_empty() {
        root.to_path_buf()
    } else {
        root.join(rel)
    }
}

fn file_info(path: &Path, metadata: &std::fs::Metadata, rel: String) -> ResourceInfo {
    ResourceInfo {
        path: rel,
        href: String::new(),
        name: base_name(path),
        kind: ResourceKind::File,
        size: Some(metadata.len()),
        modified: metadata
            .modified()
            .ok()
            .map(|t| DateTime::<Utc>::from(t).fixed_offset()),
        created: None,
        etag: None,
        content_type: None,
    }
}

fn dir_info(path: &Path, rel: String) -> ResourceInfo {
    ResourceInfo {
        path: rel,
        href: String::new(),
        name: base_name(path),
        kind: ResourceKind::Collection,
        size: None,
        modified: None,
        created: None,
        etag: None,
        content_type: None,
    }
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}
