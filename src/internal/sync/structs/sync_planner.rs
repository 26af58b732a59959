//! 树差分 → 有序动作计划。
//!
//! 默认只增不删：目标侧多出来的东西一概不碰，防止一次配置失误静默
//! 清空数据；delete_extraneous 是产生删除动作的唯一途径。

use std::path::PathBuf;

use chrono::Duration;

use crate::internal::error::{DavError, DavResult};
use crate::internal::lister::structs::resource_info::ResourceInfo;
use crate::internal::lister::structs::resource_tree::ResourceTree;
use crate::internal::sync::structs::sync_action::{SyncAction, SyncMode, SyncPlan, SyncSide};

/// 同步计划器
pub struct SyncPlanner {
    mode: SyncMode,
    delete_extraneous: bool,
    /// 本地文件系统与协议时间戳粒度不一致（FAT 2 秒、HTTP-date 1 秒），
    /// 比较修改时间时放这个容差
    mtime_tolerance: Duration,
}

impl SyncPlanner {
    pub fn new(mode: SyncMode) -> Self {
        Self {
            mode,
            delete_extraneous: false,
            mtime_tolerance: Duration::seconds(2),
        }
    }

    /// 开启"删除目标侧多余资源"；默认关闭
    pub fn with_delete_extraneous(mut self, on: bool) -> Self {
        self.delete_extraneous = on;
        self
    }

    pub fn with_mtime_tolerance(mut self, seconds: i64) -> Self {
        self.mtime_tolerance = Duration::seconds(seconds);
        self
    }

    /// 对两棵同一相对路径空间下的树做差，产出有序计划
    ///
    /// BTreeMap 的字典序迭代保证：父目录键恒是子孙键的前缀，先于子孙
    /// 出现，目录创建动作天然排在其内容之前；同样保证计划可复现。
    pub fn plan(&self, source: &ResourceTree, dest: &ResourceTree) -> DavResult<SyncPlan> {
        let mut actions = Vec::new();

        for (rel, src_info) in &source.entries {
            match dest.entries.get(rel) {
                None => actions.push(self.create_action(source, dest, rel, src_info)),
                Some(dest_info) => {
                    if src_info.kind != dest_info.kind {
                        // 同一路径一侧是文件另一侧是目录，没有合理的自动决策
                        return Err(DavError::Conflict {
                            op: "sync",
                            path: rel.clone(),
                            reason: "源与目标的资源类型不一致（文件/目录）".to_string(),
                        });
                    }
                    if src_info.is_collection() {
                        actions.push(SyncAction::Skip {
                            path: rel.clone(),
                            reason: "目录已存在".to_string(),
                        });
                    } else if self.changed(src_info, dest_info) {
                        actions.push(self.transfer_action(source, dest, rel));
                    } else {
                        actions.push(SyncAction::Skip {
                            path: rel.clone(),
                            reason: "未变化".to_string(),
                        });
                    }
                }
            }
        }

        if self.delete_extraneous {
            // 逆字典序 = 深者在前，文件先于其父目录被删
            for rel in dest.entries.keys().rev() {
                if !source.entries.contains_key(rel) {
                    actions.push(SyncAction::Delete {
                        path: resolve(&dest.root, rel),
                        side: self.dest_side(),
                    });
                }
            }
        }

        Ok(SyncPlan { actions })
    }

    /// 源侧有、目标侧没有 → 创建
    fn create_action(
        &self,
        source: &ResourceTree,
        dest: &ResourceTree,
        rel: &str,
        src_info: &ResourceInfo,
    ) -> SyncAction {
        if src_info.is_collection() {
            SyncAction::MakeDirectory {
                path: resolve(&dest.root, rel),
                side: self.dest_side(),
            }
        } else {
            self.transfer_action(source, dest, rel)
        }
    }

    fn transfer_action(&self, source: &ResourceTree, dest: &ResourceTree, rel: &str) -> SyncAction {
        match self.mode {
            SyncMode::Push => SyncAction::Upload {
                src: resolve_local(&source.root, rel),
                dest: resolve(&dest.root, rel),
            },
            SyncMode::Pull => SyncAction::Download {
                src: resolve(&source.root, rel),
                dest: resolve_local(&dest.root, rel),
            },
            SyncMode::RemoteToRemote => SyncAction::CopyRemote {
                src: resolve(&source.root, rel),
                dest: resolve(&dest.root, rel),
            },
        }
    }

    /// 文件是否需要覆盖
    ///
    /// 大小不同即认定漂移（哪怕源的时间戳更旧，尺寸差异本身就是证据）；
    /// 大小相同时仅当源在容差之外严格更新才覆盖。
    fn changed(&self, src: &ResourceInfo, dest: &ResourceInfo) -> bool {
        if src.size != dest.size {
            return true;
        }
        match (src.modified, dest.modified) {
            (Some(s), Some(d)) => s > d + self.mtime_tolerance,
            // 任一侧缺时间戳时没有覆盖依据，保守跳过
            _ => false,
        }
    }

    fn dest_side(&self) -> SyncSide {
        match self.mode {
            SyncMode::Pull => SyncSide::Local,
            SyncMode::Push | SyncMode::RemoteToRemote => SyncSide::Remote,
        }
    }
}

/// 把相对键解析成远端路径（树根 + 相对键）
fn resolve(root: &str, rel: &str) -> String {
    match (root.is_empty(), rel.is_empty()) {
        (true, _) => rel.to_string(),
        (false, true) => root.to_string(),
        (false, false) => format!("{root}/{rel}"),
    }
}

/// 把相对键解析成本地路径
fn resolve_local(root: &str, rel: &str) -> PathBuf {
    if rel.is_empty() {
        PathBuf::from(root)
    } else {
        PathBuf::from(root).join(rel)
    }
}
