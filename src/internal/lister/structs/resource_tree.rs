use std::collections::BTreeMap;

use crate::internal::error::DavError;
use crate::internal::lister::structs::resource_info::ResourceInfo;

/// 一次列举中某个子路径的失败记录
#[derive(Debug)]
pub struct ListError {
    pub path: String,
    pub error: DavError,
}

/// 一次列举得到的树快照：相对路径 → 资源信息
///
/// 快照构造完成后不再修改；列举期间下探失败的子树记录在 `errors` 里，
/// 不影响其余条目的有效性。每次列举都是一次全新的网络往返，核心不做
/// 跨调用缓存，陈旧快照会让同步做出错误决策。
#[derive(Debug, Default)]
pub struct ResourceTree {
    /// 列举的根（相对客户端根目录；本地树为本地根路径）
    pub root: String,
    /// 相对 `root` 的路径 → 快照；根自身的键为 ""
    pub entries: BTreeMap<String, ResourceInfo>,
    /// 下探失败的子路径及原因
    pub errors: Vec<ListError>,
}

impl ResourceTree {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            entries: BTreeMap::new(),
            errors: Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}
