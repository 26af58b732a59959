use reqwest::Method;

use crate::internal::error::{DavError, DavResult};

/// WebDAV 动词；`is_read` 决定传输层是否允许自动重试
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebDavMethod {
    Propfind,
    Mkcol,
    Put,
    Get,
    Delete,
    Copy,
    Move,
    Head,
    Options,
}

impl WebDavMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            WebDavMethod::Propfind => "PROPFIND",
            WebDavMethod::Mkcol => "MKCOL",
            WebDavMethod::Put => "PUT",
            WebDavMethod::Get => "GET",
            WebDavMethod::Delete => "DELETE",
            WebDavMethod::Copy => "COPY",
            WebDavMethod::Move => "MOVE",
            WebDavMethod::Head => "HEAD",
            WebDavMethod::Options => "OPTIONS",
        }
    }

    pub fn to_http_method(&self) -> DavResult<Method> {
        match self {
            WebDavMethod::Put => Ok(Method::PUT),
            WebDavMethod::Get => Ok(Method::GET),
            WebDavMethod::Delete => Ok(Method::DELETE),
            WebDavMethod::Head => Ok(Method::HEAD),
            WebDavMethod::Options => Ok(Method::OPTIONS),
            // 扩展动词不在 reqwest 预置集合里，手动构造
            other => {
                Method::from_bytes(other.as_str().as_bytes()).map_err(|e| DavError::Path {
                    op: "method",
                    path: other.as_str().to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }

    /// 只读动词（失败可以安全重试）；写动词可能已部分生效，盲目重试不安全
    pub fn is_read(&self) -> bool {
        matches!(
            self,
            WebDavMethod::Propfind
                | WebDavMethod::Get
                | WebDavMethod::Head
                | WebDavMethod::Options
        )
    }
}

pub enum Depth {
    /// 仅返回当前资源
    Zero,
    /// 返回当前资源及直接子资源
    One,
    /// 返回当前资源及所有子资源（很多服务端会拒绝，谨慎使用）
    Infinity,
}

impl Depth {
    pub fn as_str(&self) -> &'static str {
        match self {
            Depth::Zero => "0",
            Depth::One => "1",
            Depth::Infinity => "infinity",
        }
    }
}
