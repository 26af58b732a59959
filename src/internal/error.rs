//! 核心错误类型：覆盖路径、认证、传输、解析、遍历等全部失败场景。
//!
//! 约定：致命错误必须带上操作名与涉及路径，传输类错误还要带 HTTP 状态码，
//! 让使用者不抓包也能定位问题。

use thiserror::Error;

pub type DavResult<T> = Result<T, DavError>;

#[derive(Debug, Error)]
pub enum DavError {
    #[error("HTTP 请求失败: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{op} 遇到非法路径 {path}: {reason}")]
    Path {
        op: &'static str,
        path: String,
        reason: String,
    },

    #[error("{op} 认证被拒绝 ({status}): {path}")]
    Auth {
        op: &'static str,
        path: String,
        status: u16,
    },

    #[error("{op} 目标不存在: {path}")]
    NotFound { op: &'static str, path: String },

    #[error("{op} 发生冲突: {path}: {reason}")]
    Conflict {
        op: &'static str,
        path: String,
        reason: String,
    },

    #[error("{op} 服务端错误 ({status}): {path}")]
    Server {
        op: &'static str,
        path: String,
        status: u16,
    },

    #[error("解析多状态响应失败: {0}")]
    Parse(String),

    #[error("遍历 {path} 超过最大深度 {max_depth}")]
    Traversal { path: String, max_depth: usize },

    #[error("{op} 传输中断: {path}: {reason}")]
    Transfer {
        op: &'static str,
        path: String,
        reason: String,
    },

    #[error("{op} 本地 IO 失败: {path}: {source}")]
    Io {
        op: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{op} 收到意外状态码 ({status}): {path}")]
    Unexpected {
        op: &'static str,
        path: String,
        status: u16,
    },

    #[error("{op} 被取消: {path}")]
    Cancelled { op: &'static str, path: String },
}

impl DavError {
    /// 是否属于可在传输层重试的瞬时失败（仅对只读动词生效）
    pub fn is_retryable(&self) -> bool {
        match self {
            DavError::Server { .. } => true,
            // 连接/超时类错误视为瞬时，状态码错误不重试
            DavError::Request(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }
}
