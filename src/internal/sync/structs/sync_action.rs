use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// 动作落在哪一侧
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncSide {
    Local,
    Remote,
}

/// 同步方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncMode {
    /// 本地 → 远端
    Push,
    /// 远端 → 本地
    Pull,
    /// 远端 → 远端（服务端内部 COPY，不经过本地）
    RemoteToRemote,
}

/// 同步计划中的单个动作
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncAction {
    /// 本地文件上传到远端
    Upload { src: PathBuf, dest: String },
    /// 远端文件下载到本地
    Download { src: String, dest: PathBuf },
    /// 远端内部复制
    CopyRemote { src: String, dest: String },
    /// 在目标侧建目录
    MakeDirectory { path: String, side: SyncSide },
    /// 删除目标侧多余资源（仅 delete_extraneous 模式会出现）
    Delete { path: String, side: SyncSide },
    /// 无需动作（记录原因，便于日志与审计）
    Skip { path: String, reason: String },
}

impl SyncAction {
    /// Skip 之外的动作才是"实际要做事"的
    pub fn is_effective(&self) -> bool {
        !matches!(self, SyncAction::Skip { .. })
    }

    /// 动作涉及的目标路径（日志用）
    pub fn target(&self) -> String {
        match self {
            SyncAction::Upload { dest, .. } => dest.clone(),
            SyncAction::Download { dest, .. } => dest.display().to_string(),
            SyncAction::CopyRemote { dest, .. } => dest.clone(),
            SyncAction::MakeDirectory { path, .. } => path.clone(),
            SyncAction::Delete { path, .. } => path.clone(),
            SyncAction::Skip { path, .. } => path.clone(),
        }
    }
}

/// 有序的同步计划
///
/// 顺序不变量：目录创建动作先于一切落在其子孙路径上的动作；删除动作
/// 排在所有还把该路径当读取源的动作之后（排在计划末尾、深者在前）。
/// 相同的输入树与模式恒产出相同的计划，方便测试与日志对拍。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncPlan {
    pub actions: Vec<SyncAction>,
}

impl SyncPlan {
    /// 是否没有任何实际动作（全是 Skip 也算空）
    pub fn is_empty(&self) -> bool {
        !self.actions.iter().any(SyncAction::is_effective)
    }

    /// 实际动作数
    pub fn effective_len(&self) -> usize {
        self.actions.iter().filter(|a| a.is_effective()).count()
    }
}
