//! 路径工具：统一使用「无首尾斜杠的相对路径」，根目录为空字符串 ""。
//!
//! 服务端 href 是 URL 编码的，拼接前先解码；`..` 越过根目录视为攻击或
//! 服务端返回异常，直接报错而不是静默截断。

use percent_encoding::percent_decode_str;

use crate::internal::error::{DavError, DavResult};

/// 解码 href 中的百分号转义（非法 UTF-8 按替换字符处理）
pub fn decode_path(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().to_string()
}

/// 规范化路径：折叠重复分隔符、去掉首尾斜杠与 `.` 段
pub fn normalize_path(path: &str) -> String {
    path.split('/')
        .filter(|seg| !seg.is_empty() && *seg != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// 在 `base` 下拼接若干段路径，解码转义并解析 `.`/`..`
///
/// `..` 向上回溯不允许越过 `base`，越界返回 [`DavError::Path`]，
/// 防御服务端返回的畸形 href 把操作引出配置的子树。
pub fn join_path(base: &str, parts: &[&str]) -> DavResult<String> {
    let mut segs: Vec<String> = normalize_path(base)
        .split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    let floor = segs.len();

    for part in parts {
        let decoded = decode_path(part);
        for seg in decoded.split('/') {
            match seg {
                "" | "." => {}
                ".." => {
                    if segs.len() <= floor {
                        return Err(DavError::Path {
                            op: "join",
                            path: decoded.clone(),
                            reason: format!("`..` 越过根目录 {base:?}"),
                        });
                    }
                    segs.pop();
                }
                other => segs.push(other.to_string()),
            }
        }
    }

    Ok(segs.join("/"))
}

/// 把 `path` 表示成相对 `root` 的路径；`path` 等于 `root` 时返回 ""
///
/// `path` 不在 `root` 之下返回 [`DavError::Path`]。
pub fn relative_to(root: &str, path: &str) -> DavResult<String> {
    let root = normalize_path(root);
    let path = normalize_path(path);

    if root.is_empty() {
        return Ok(path);
    }
    if path == root {
        return Ok(String::new());
    }
    if let Some(rest) = path.strip_prefix(&format!("{root}/")) {
        return Ok(rest.to_string());
    }

    Err(DavError::Path {
        op: "relative_to",
        path,
        reason: format!("不在根目录 {root:?} 之下"),
    })
}
