use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// 资源类别：文件或集合（目录）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    File,
    Collection,
}

/// 远程（或本地）资源的一次性快照，构造后不再变化
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceInfo {
    /// 相对客户端根目录的规范化路径
    pub path: String,
    /// 服务端返回的原始 href（本地扫描时为空）
    pub href: String,
    /// 友好化的文件或目录名
    pub name: String,
    pub kind: ResourceKind,
    /// 文件大小（字节），目录恒为 None
    pub size: Option<u64>,
    /// 最后修改时间
    pub modified: Option<DateTime<FixedOffset>>,
    /// 创建时间
    pub created: Option<DateTime<FixedOffset>>,
    /// 清理过引号的 ETag
    pub etag: Option<String>,
    /// MIME 类型
    pub content_type: Option<String>,
}

impl ResourceInfo {
    pub fn is_collection(&self) -> bool {
        self.kind == ResourceKind::Collection
    }
}
