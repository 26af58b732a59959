//! 递归/限深列举：显式遍历队列 + 兄弟子树并发下探。
//!
//! 全量列举不依赖服务端支持 `Depth: infinity`（很多实现拒绝或限制），
//! 而是用 depth-1 请求逐层推进；队列里同层目录并发拉取，单个子树
//! 失败记录在树上，兄弟子树继续。

use std::collections::HashSet;

use futures_util::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::internal::client::structs::webdav_client::WebdavClient;
use crate::internal::error::{DavError, DavResult};
use crate::internal::lister::structs::resource_info::ResourceInfo;
use crate::internal::lister::structs::resource_tree::{ListError, ResourceTree};
use crate::internal::paths;
use crate::internal::webdav::enums::Depth;
use crate::internal::webdav::raw_xml::impl_multi_status::ToResourceInfos;

/// 列举深度
pub enum ListDepth {
    /// 仅 `path` 自身的元数据
    Zero,
    /// 直接子项
    One,
    /// 整棵子树（逐层 depth-1 推进）
    Full,
}

/// 远程树列举器
pub struct ResourceLister<'a> {
    client: &'a WebdavClient,
}

impl<'a> ResourceLister<'a> {
    pub fn new(client: &'a WebdavClient) -> Self {
        Self { client }
    }

    /// 列举 `path` 下的资源快照
    pub async fn list(&self, path: &str, depth: ListDepth) -> DavResult<ResourceTree> {
        let root = paths::join_path("", &[path])?;
        match depth {
            ListDepth::Zero => self.list_zero(&root).await,
            ListDepth::One => self.list_one(&root).await,
            ListDepth::Full => self.list_full(&root).await,
        }
    }

    async fn list_zero(&self, root: &str) -> DavResult<ResourceTree> {
        let info = self.client.stat(root).await?;
        let mut tree = ResourceTree::new(root);
        tree.entries.insert(String::new(), info);
        Ok(tree)
    }

    async fn list_one(&self, root: &str) -> DavResult<ResourceTree> {
        let mut tree = ResourceTree::new(root);
        let infos = self.list_level(root).await?;
        insert_level(&mut tree, root, infos);
        Ok(tree)
    }

    async fn list_full(&self, root: &str) -> DavResult<ResourceTree> {
        let max_depth = self.client.max_traversal_depth();
        let mut tree = ResourceTree::new(root);
        let mut visited: HashSet<String> = HashSet::new();

        // 根的列举失败没有"部分成功"可言，直接整体失败
        let root_infos = self.list_level(root).await?;
        let mut queue: Vec<(String, usize)> = Vec::new();
        enqueue_children(
            &mut tree,
            &mut queue,
            &mut visited,
            root,
            root_infos,
            1,
        );

        while !queue.is_empty() {
            // 超出深度上限视为病态（环状）结构，不再继续
            if let Some((deep, _)) = queue.iter().find(|(_, lvl)| *lvl > max_depth) {
                return Err(DavError::Traversal {
                    path: deep.clone(),
                    max_depth,
                });
            }

            // 一波并发拉取当前队列里的所有目录
            let batch: Vec<(String, usize)> = std::mem::take(&mut queue);
            let results = stream::iter(batch.into_iter().map(|(rel, lvl)| async move {
                let abs = paths::join_path(root, &[&rel]);
                let listed = match abs {
                    Ok(abs) => self.list_level(&abs).await,
                    Err(e) => Err(e),
                };
                (rel, lvl, listed)
            }))
            .buffer_unordered(self.client.concurrency())
            .collect::<Vec<_>>()
            .await;

            for (rel, lvl, listed) in results {
                match listed {
                    Ok(infos) => {
                        enqueue_children(&mut tree, &mut queue, &mut visited, root, infos, lvl + 1)
                    }
                    Err(error) => {
                        // 单个子树失败不拖垮整次列举
                        warn!(path = %rel, error = %error, "子树列举失败，跳过继续");
                        tree.errors.push(ListError { path: rel, error });
                    }
                }
            }
        }

        debug!(
            root,
            entries = tree.entries.len(),
            errors = tree.errors.len(),
            "全量列举完成"
        );
        Ok(tree)
    }

    /// 对一个目录做 depth-1 属性查询，返回含自身的全部记录
    async fn list_level(&self, dir: &str) -> DavResult<Vec<ResourceInfo>> {
        let multi_status = self.client.propfind(dir, Depth::One).await?;
        multi_status.to_resource_infos(self.client.base_url())
    }
}

/// 把一层的记录写进树里，并把其中的子目录排进队列
fn enqueue_children(
    tree: &mut ResourceTree,
    queue: &mut Vec<(String, usize)>,
    visited: &mut HashSet<String>,
    root: &str,
    infos: Vec<ResourceInfo>,
    child_level: usize,
) {
    for info in infos {
        let key = match paths::relative_to(root, &info.path) {
            Ok(key) => key,
            Err(error) => {
                // 越界 href 当作该条目的失败记录，不影响其余条目
                tree.errors.push(ListError {
                    path: info.path.clone(),
                    error,
                });
                continue;
            }
        };

        let is_new = !tree.entries.contains_key(&key);
        let is_collection = info.is_collection();
        if is_new {
            tree.entries.insert(key.clone(), info);
        }

        // 目录排队下探；visited 防住服务端把同一目录报多次
        if is_collection && !key.is_empty() && is_new && visited.insert(key.clone()) {
            queue.push((key, child_level));
        }
    }
}

/// depth-1 的结果写入树（不含下探）
fn insert_level(tree: &mut ResourceTree, root: &str, infos: Vec<ResourceInfo>) {
    for info in infos {
        match paths::relative_to(root, &info.path) {
            Ok(key) => {
                tree.entries.insert(key, info);
            }
            Err(error) => tree.errors.push(ListError {
                path: info.path.clone(),
                error,
            }),
        }
    }
}
